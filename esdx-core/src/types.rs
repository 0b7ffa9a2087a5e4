//! Core data model: Apex, Candidate, ResolvedName, WildcardState

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// The DNS name under enumeration, immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Apex(pub String);

impl Apex {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim_end_matches('.').to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Apex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label to be tested under an apex. `@` denotes the apex itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate(pub String);

impl Candidate {
    pub const APEX_SENTINEL: &'static str = "@";

    pub fn apex() -> Self {
        Self(Self::APEX_SENTINEL.to_string())
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn is_apex(&self) -> bool {
        self.0 == Self::APEX_SENTINEL
    }

    /// Render the fully qualified name under `apex`.
    pub fn fqdn(&self, apex: &Apex) -> String {
        if self.is_apex() {
            apex.as_str().to_string()
        } else {
            format!("{}.{}", self.0, apex.as_str())
        }
    }
}

/// A resolved fqdn and its sorted, deduplicated IP set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedName {
    pub fqdn: String,
    pub ips: Vec<IpAddr>,
}

impl ResolvedName {
    pub fn new(fqdn: impl Into<String>, mut ips: Vec<IpAddr>) -> Self {
        ips.sort();
        ips.dedup();
        Self { fqdn: fqdn.into(), ips }
    }

    /// True iff `self.ips` equals or is a subset of `wildcard_ips`.
    pub fn is_wildcard_hit(&self, wildcard_ips: &[IpAddr]) -> bool {
        if self.ips.is_empty() {
            return false;
        }
        self.ips.iter().all(|ip| wildcard_ips.contains(ip))
    }
}

/// Wildcard detection state for an apex, populated once per run.
#[derive(Debug, Clone, Default)]
pub struct WildcardState {
    pub is_wildcard: bool,
    pub random_resolve: bool,
    pub wildcard_ips: Vec<IpAddr>,
    pub baseline_html_2: String,
    pub baseline_html_3: String,
    pub baseline_len_2: usize,
    pub baseline_len_3: usize,
    pub rsc_available: bool,
}

impl WildcardState {
    pub fn baseline_for(&self, candidate: &Candidate) -> (&str, usize) {
        if candidate.0.contains('.') {
            (&self.baseline_html_3, self.baseline_len_3)
        } else {
            (&self.baseline_html_2, self.baseline_len_2)
        }
    }
}
