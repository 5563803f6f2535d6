//! rightsize-core — shared data model for the recommendation pipeline.
//!
//! Holds the types every other crate speaks: per-interval metric results
//! as produced by the metrics-collection subsystem, the named analysis
//! terms loaded from configuration, and the percentile plot points handed
//! to the visualization API.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    DependencyConfig, EngineConfig, LayerConfig, RightsizeConfig, TunableConfig, TunableRef,
    WindowConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
