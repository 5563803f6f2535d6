//! Hotspot JVM layer.

use rightsize_core::{AggregatedMetrics, LayerConfig};
use tracing::debug;

use crate::env::{EnvFragment, java_options_var};
use crate::jvm::{
    self, DEFAULT_MAX_RAM_PERCENTAGE, GC_POLICY, HotspotGc, MAX_RAM_PERCENTAGE, hotspot_gc_policy,
    parse_major_version,
};
use crate::layer::Layer;
use crate::value::{ResolvedValues, TunableValue};

pub const HOTSPOT: &str = "hotspot";

#[derive(Debug, Default)]
pub struct HotspotLayer;

impl Layer for HotspotLayer {
    fn layer_name(&self) -> &str {
        HOTSPOT
    }

    fn metadata(&self) -> LayerConfig {
        jvm::jvm_metadata(
            HOTSPOT,
            &[
                HotspotGc::Serial,
                HotspotGc::Parallel,
                HotspotGc::G1,
                HotspotGc::Z,
                HotspotGc::Shenandoah,
            ]
            .map(|gc| gc.as_str().to_string()),
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
                let (heap_mb, cores) = jvm::gc_inputs(resolved, HOTSPOT)?;
                let jdk = parse_major_version(resolved.context().jdk_version.as_deref());
                let gc = hotspot_gc_policy(heap_mb, cores, jdk);
                debug!(heap_mb, cores, jdk, gc = %gc, "hotspot GC policy decided");
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
        let var = java_options_var(resolved.context());
        let fragment = match tunable {
            MAX_RAM_PERCENTAGE => jvm::max_ram_flag(value),
            GC_POLICY => value
                .as_str()
                .and_then(HotspotGc::from_name)
                .map(|gc| gc.flag().to_string()),
            _ => None,
        };
        fragment
            .map(|f| vec![EnvFragment::new(var, f)])
            .unwrap_or_default()
    }
}
