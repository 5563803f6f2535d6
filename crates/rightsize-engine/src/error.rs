//! Error types for the recommendation engine.

use rightsize_core::ConfigError;
use rightsize_layers::LayerError;
use rightsize_tunables::TunableError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures that abort an evaluation. Insufficient data is not one of
/// them; it is reported as a skipped term.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("tunable resolution failed: {0}")]
    Tunable(#[from] TunableError),

    #[error("layer error: {0}")]
    Layer(#[from] LayerError),
}
