//! Error taxonomy for the enumeration engine

use std::io;

use thiserror::Error;

/// Errors produced by the enumeration engine and its collaborators
#[derive(Error, Debug)]
pub enum EnumError {
    /// A resolver query could not be completed after the retry budget was exhausted
    #[error("resolver error: {0}")]
    Resolve(String),

    /// A query exceeded its configured timeout
    #[error("query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A zone transfer was refused or otherwise failed; callers treat this as an empty source
    #[error("zone transfer refused: {0}")]
    ZoneTransferRefused(String),

    /// The TLS handshake or certificate parse failed during SAN mining
    #[error("tls error: {0}")]
    Tls(String),

    /// An HTTP fetch failed during RSC validation
    #[error("http fetch error: {0}")]
    HttpFetch(String),

    /// The wildcard baseline body could not be fetched; RSC is disabled for the run
    #[error("wildcard baseline unavailable: {0}")]
    BaselineUnavailable(String),

    /// Malformed CLI input or configuration; fatal before the engine starts
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed dictionary content
    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

impl EnumError {
    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    pub fn zone_transfer_refused(msg: impl Into<String>) -> Self {
        Self::ZoneTransferRefused(msg.into())
    }

    pub fn tls(msg: impl Into<String>) -> Self {
        Self::Tls(msg.into())
    }

    pub fn http_fetch(msg: impl Into<String>) -> Self {
        Self::HttpFetch(msg.into())
    }

    pub fn baseline_unavailable(msg: impl Into<String>) -> Self {
        Self::BaselineUnavailable(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_dictionary(msg: impl Into<String>) -> Self {
        Self::InvalidDictionary(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EnumError>;
