//! Error types for configuration loading.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors. These are fatal for the process, unlike
/// data-quality problems which surface as skipped terms.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown term name: {0:?}")]
    UnknownTerm(String),

    #[error("invalid term {term}: {reason}")]
    InvalidTerm { term: String, reason: String },

    #[error("invalid window settings: {0}")]
    InvalidWindow(String),
}
