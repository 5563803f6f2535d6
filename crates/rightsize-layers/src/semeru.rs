//! Semeru (OpenJ9) JVM layer.

use rightsize_core::{AggregatedMetrics, LayerConfig};
use tracing::debug;

use crate::env::{EnvFragment, java_options_var};
use crate::jvm::{
    self, DEFAULT_MAX_RAM_PERCENTAGE, GC_POLICY, MAX_RAM_PERCENTAGE, SemeruGc, semeru_gc_policy,
};
use crate::layer::Layer;
use crate::value::{ResolvedValues, TunableValue};

pub const SEMERU: &str = "semeru";

#[derive(Debug, Default)]
pub struct SemeruLayer;

impl Layer for SemeruLayer {
    fn layer_name(&self) -> &str {
        SEMERU
    }

    fn metadata(&self) -> LayerConfig {
        jvm::jvm_metadata(
            SEMERU,
            &[SemeruGc::Gencon, SemeruGc::Balanced].map(|gc| gc.as_str().to_string()),
        )
    }

    fn recommend(
        &self,
        tunable: &str,
        resolved: &ResolvedValues,
        _metrics: &AggregatedMetrics,
    ) -> Option<TunableValue> {
        match tunable {
            MAX_RAM_PERCENTAGE => {
                crate::container::memory_limit_bytes(resolved)?;
                Some(TunableValue::Number(DEFAULT_MAX_RAM_PERCENTAGE))
            }
            GC_POLICY => {
                let (heap_mb, cores) = jvm::gc_inputs(resolved, SEMERU)?;
                let gc = semeru_gc_policy(heap_mb, cores);
                debug!(heap_mb, cores, gc = %gc, "semeru GC policy decided");
                Some(TunableValue::Text(gc.as_str().to_string()))
            }
            _ => None,
        }
    }

    fn format(
        &self,
        tunable: &str,
        value: Option<&TunableValue>,
        resolved: &ResolvedValues,
    ) -> Vec<EnvFragment> {
        let Some(value) = value else {
            return Vec::new();
        };
        let fragment = match tunable {
            MAX_RAM_PERCENTAGE => jvm::max_ram_flag(value),
            GC_POLICY => value.as_str().and_then(SemeruGc::from_name).map(|gc| gc.flag()),
            _ => None,
        };
        let var = java_options_var(resolved.context());
        fragment
            .map(|f| vec![EnvFragment::new(var, f)])
            .unwrap_or_default()
    }
}
