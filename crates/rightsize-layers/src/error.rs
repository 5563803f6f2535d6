//! Error types for the layer registry.

use thiserror::Error;

/// Result type alias for registry operations.
pub type LayerResult<T> = Result<T, LayerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayerError {
    #[error("layer name must not be blank")]
    BlankName,

    #[error("unknown layer: {0}")]
    Unknown(String),
}
