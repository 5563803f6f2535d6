//! The per-layer decision handler contract.

use rightsize_core::{AggregatedMetrics, LayerConfig};

use crate::env::EnvFragment;
use crate::value::{ResolvedValues, TunableValue};

/// A configuration layer: container resources, a JVM, or a framework.
///
/// Handlers are pure. `recommend` returns `None` for tunables the layer
/// has no opinion on; `format` renders a decided value into environment
/// fragments and renders nothing for an absent value.
pub trait Layer: Send + Sync {
    /// Registry key and routing identifier.
    fn layer_name(&self) -> &str;

    /// Built-in tunable metadata and dependency declarations.
    fn metadata(&self) -> LayerConfig;

    fn recommend(
        &self,
        tunable: &str,
        resolved: &ResolvedValues,
        metrics: &AggregatedMetrics,
    ) -> Option<TunableValue>;

    fn format(
        &self,
        tunable: &str,
        value: Option<&TunableValue>,
        resolved: &ResolvedValues,
    ) -> Vec<EnvFragment>;
}
