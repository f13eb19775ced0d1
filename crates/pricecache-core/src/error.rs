//! Error types for the historical price cache.

use thiserror::Error;

/// Top-level cache error.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Stable machine-readable kind string.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::InvalidRange(_) => "invalid_range",
            CacheError::Upstream(_) => "upstream_error",
            CacheError::Store(_) => "store_error",
            CacheError::Config(_) => "config_error",
        }
    }

    /// HTTP status reported by the upstream, if this error carries one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CacheError::Upstream(e) => e.status_code(),
            _ => None,
        }
    }
}

/// Upstream market-data API errors.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl UpstreamError {
    /// HTTP status code, when the upstream answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Record store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
