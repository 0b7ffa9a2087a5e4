//! Layered configuration: TOML file defaults, overridable by CLI flags

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EnumError, Result};

pub const DEFAULT_RESOLVERS: &[&str] = &[
    "8.8.8.8:53",
    "1.1.1.1:53",
    "9.9.9.9:53",
];

pub const DEFAULT_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_DNS_WINDOW: usize = 1000;
pub const DEFAULT_HTTP_WINDOW: usize = 100;
pub const DEFAULT_RSC_RATIO: f64 = 0.8;
pub const DEFAULT_MULTI_RECORD_DEPTH: u32 = 4;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

fn default_resolvers() -> Vec<String> {
    DEFAULT_RESOLVERS.iter().map(|s| s.to_string()).collect()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_dns_window() -> usize {
    DEFAULT_DNS_WINDOW
}

fn default_http_window() -> usize {
    DEFAULT_HTTP_WINDOW
}

fn default_rsc_ratio() -> f64 {
    DEFAULT_RSC_RATIO
}

fn default_multi_record_depth() -> u32 {
    DEFAULT_MULTI_RECORD_DEPTH
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_output_dir() -> String {
    "tmp".to_string()
}

/// Resolver-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_resolvers")]
    pub resolvers: Vec<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            resolvers: default_resolvers(),
            timeout_secs: default_timeout(),
            retries: default_retries(),
        }
    }
}

/// Concurrency/window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_dns_window")]
    pub dns_window: usize,
    #[serde(default = "default_http_window")]
    pub http_window: usize,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            dns_window: default_dns_window(),
            http_window: default_http_window(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

/// RSC validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RscConfig {
    #[serde(default = "default_rsc_ratio")]
    pub ratio_threshold: f64,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub response_filter: Vec<String>,
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for RscConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: default_rsc_ratio(),
            skip: false,
            response_filter: Vec::new(),
            proxy: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            json: false,
        }
    }
}

/// Top-level enumeration options, the async-facing counterpart of `Config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumOptions {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub rsc: RscConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub multi_resolve: bool,
    #[serde(default = "default_multi_record_depth")]
    pub multi_record_depth: u32,
    #[serde(default)]
    pub split: Option<(u32, u32)>,
}

impl Default for EnumOptions {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            performance: PerformanceConfig::default(),
            rsc: RscConfig::default(),
            output: OutputConfig::default(),
            multi_resolve: false,
            multi_record_depth: default_multi_record_depth(),
            split: None,
        }
    }
}

/// TOML-file-backed configuration wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(flatten)]
    pub options: EnumOptions,
}

impl Config {
    /// Load configuration strictly from a file, erroring if absent or malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EnumError::configuration(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| EnumError::configuration(format!("cannot parse {}: {e}", path.display())))
    }

    /// Load from `path` if given and present; fall back to defaults otherwise.
    pub fn load_with_fallback(path: Option<impl AsRef<Path>>) -> Result<Self> {
        match path {
            Some(p) if p.as_ref().exists() => Self::from_file(p),
            Some(p) => Err(EnumError::configuration(format!(
                "config file not found: {}",
                p.as_ref().display()
            ))),
            None => Ok(Self::default()),
        }
    }

    /// Render an example configuration file, used by `--config` bootstrapping.
    pub fn create_example_config() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Parses a `K/N` split specification, 1-indexed, K <= N.
pub fn parse_split(spec: &str) -> Result<(u32, u32)> {
    let (k, n) = spec
        .split_once('/')
        .ok_or_else(|| EnumError::configuration(format!("invalid split spec: {spec}")))?;
    let k: u32 = k
        .parse()
        .map_err(|_| EnumError::configuration(format!("invalid split numerator: {k}")))?;
    let n: u32 = n
        .parse()
        .map_err(|_| EnumError::configuration(format!("invalid split denominator: {n}")))?;
    if n == 0 || k == 0 || k > n {
        return Err(EnumError::configuration(format!(
            "split {spec} must satisfy 1 <= K <= N"
        )));
    }
    Ok((k, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let opts = EnumOptions::default();
        assert_eq!(opts.resolver.timeout_secs, 3);
        assert_eq!(opts.resolver.retries, 3);
        assert_eq!(opts.performance.dns_window, 1000);
        assert_eq!(opts.performance.http_window, 100);
        assert_eq!(opts.rsc.ratio_threshold, 0.8);
    }

    #[test]
    fn parse_split_accepts_valid_spec() {
        assert_eq!(parse_split("2/3").unwrap(), (2, 3));
    }

    #[test]
    fn parse_split_rejects_k_greater_than_n() {
        assert!(parse_split("4/3").is_err());
    }

    #[test]
    fn parse_split_rejects_malformed_spec() {
        assert!(parse_split("abc").is_err());
        assert!(parse_split("3").is_err());
        assert!(parse_split("0/3").is_err());
    }
}
