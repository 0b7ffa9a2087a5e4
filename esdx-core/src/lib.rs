//! esdx-core - concurrent subdomain enumeration and wildcard-aware validation
//!
//! This library discovers live subdomains of a DNS apex by combining
//! candidate-source aggregation (dictionary expansion, zone transfer,
//! certificate SAN mining, multi-record mining) with two validation
//! pipelines: direct DNS resolution, and a Response-Similarity-Comparison
//! oracle that copes with wildcard zones by scoring HTTP bodies against a
//! synthesized baseline.

pub mod candidate_sources;
pub mod cert_mining;
pub mod config;
pub mod dictionary;
pub mod discovery;
pub mod dns_probe;
pub mod engine;
pub mod error;
pub mod heartbeat;
pub mod multi_record;
pub mod normalize;
pub mod output;
pub mod resolution_pipeline;
pub mod resolver_pool;
pub mod rsc;
pub mod scheduler;
pub mod types;
pub mod utils;
pub mod wildcard;
pub mod zone_transfer;

pub use config::{Config, EnumOptions, DEFAULT_RESOLVERS};
pub use engine::ApexResult;
pub use error::{EnumError, Result};
pub use resolver_pool::ResolverPool;
pub use types::{Apex, Candidate, ResolvedName, WildcardState};

#[cfg(test)]
mod tests;
