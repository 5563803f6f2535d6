//! Error types for tunable resolution.

use thiserror::Error;

use crate::spec::TunableSpec;

/// Result type alias for tunable operations.
pub type TunableResult<T> = Result<T, TunableError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TunableError {
    #[error("tunable {field} must not be blank")]
    BlankField { field: &'static str },

    #[error("dependency cycle among tunables: {}", format_specs(.unresolved))]
    Cycle { unresolved: Vec<TunableSpec> },
}

fn format_specs(specs: &[TunableSpec]) -> String {
    specs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
