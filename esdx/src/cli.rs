use std::path::PathBuf;

use clap::Parser;
use esdx_core::config::{parse_split, Config};
use tracing::{error, info, warn};

use crate::output_writer::write_apex_outputs;

const BUNDLED_DICTIONARY: &str = include_str!("../../dictionaries/default.txt");
const DEBUG_DICTIONARY: &str = include_str!("../../dictionaries/debug.txt");

#[derive(Parser, Debug)]
#[command(name = "esdx", about = "Concurrent subdomain enumeration with wildcard-aware validation")]
pub struct Cli {
    /// Comma-separated apex domain names
    #[arg(short = 'd', long = "domain")]
    pub domain: Option<String>,

    /// Path to a newline-delimited file of apex domain names
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Comma-separated response-filter substrings; any match rejects the candidate
    #[arg(short = 'F', long = "filter")]
    pub filter: Option<String>,

    /// Disable the Response-Similarity-Comparison pipeline
    #[arg(short = 's', long = "skip-rsc")]
    pub skip_rsc: bool,

    /// Dictionary shard spec `K/N`, 1-indexed
    #[arg(short = 'S', long = "split")]
    pub split: Option<String>,

    /// SOCKS5 proxy endpoint used for outbound HTTP
    #[arg(short = 'p', long = "proxy")]
    pub proxy: Option<String>,

    /// Enable multi-record (SOA/AAAA/TXT/MX) mining
    #[arg(short = 'm', long = "multi-resolve")]
    pub multi_resolve: bool,

    /// Path to a custom dictionary file
    #[arg(long = "dict")]
    pub dictionary: Option<PathBuf>,

    /// Custom resolver list, comma-separated `ip:port`
    #[arg(short = 'r', long = "resolvers")]
    pub resolvers: Option<String>,

    /// Output directory override (default: tmp/)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Also emit a JSON rendering of the admit set
    #[arg(long = "json")]
    pub json: bool,

    /// Path to a TOML configuration file
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn run(self, debug_mode: bool) -> anyhow::Result<()> {
        let mut config = Config::load_with_fallback(self.config.as_ref())?;
        self.apply_overrides(&mut config)?;

        let apexes = self.collect_apexes()?;
        if apexes.is_empty() {
            anyhow::bail!("no apex domains given; use -d or -f");
        }

        let dictionary_path = self.resolve_dictionary(debug_mode)?;

        for apex_name in apexes {
            match esdx_core::engine::run(&apex_name, &dictionary_path, &config.options).await {
                Ok(result) => {
                    info!(
                        "{}: {} subdomains admitted, {} dns query errors",
                        result.apex,
                        result.admitted.len(),
                        result.dns_query_errors
                    );
                    write_apex_outputs(&result, &config.options.output)?;
                }
                Err(e) => error!("enumeration failed for {apex_name}: {e}"),
            }
        }

        Ok(())
    }

    fn apply_overrides(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(filter) = &self.filter {
            config.options.rsc.response_filter =
                filter.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if self.skip_rsc {
            config.options.rsc.skip = true;
        }
        if let Some(split) = &self.split {
            config.options.split = Some(parse_split(split)?);
        }
        if let Some(proxy) = &self.proxy {
            config.options.rsc.proxy = Some(proxy.clone());
        }
        if self.multi_resolve {
            config.options.multi_resolve = true;
        }
        if let Some(resolvers) = &self.resolvers {
            config.options.resolver.resolvers =
                resolvers.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Some(output) = &self.output {
            config.options.output.directory = output.to_string_lossy().to_string();
        }
        if self.json {
            config.options.output.json = true;
        }
        Ok(())
    }

    fn collect_apexes(&self) -> anyhow::Result<Vec<String>> {
        let mut apexes = Vec::new();
        if let Some(domain) = &self.domain {
            apexes.extend(domain.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
        }
        if let Some(file) = &self.file {
            let contents = std::fs::read_to_string(file)?;
            apexes.extend(
                contents
                    .lines()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty() && !l.starts_with('#')),
            );
        }
        Ok(apexes
            .into_iter()
            .filter(|apex| {
                let ok = esdx_core::utils::is_valid_domain(apex);
                if !ok {
                    warn!("skipping malformed apex domain: {apex}");
                }
                ok
            })
            .collect())
    }

    fn resolve_dictionary(&self, debug_mode: bool) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.dictionary {
            return Ok(path.clone());
        }
        let contents = if debug_mode {
            warn!("esd debug mode: using bundled test dictionary");
            DEBUG_DICTIONARY
        } else {
            BUNDLED_DICTIONARY
        };
        let tmp = std::env::temp_dir().join("esdx-bundled-dictionary.txt");
        std::fs::write(&tmp, contents)?;
        Ok(tmp)
    }
}
