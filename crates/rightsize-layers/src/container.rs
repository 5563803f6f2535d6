//! Container resources layer.
//!
//! CPU request and limit follow the 98th percentile of CPU usage over the
//! term; memory request and limit follow peak memory usage plus 20%
//! headroom. These values are reported as tunable values and not rendered
//! into environment variables.

use rightsize_core::{AggregatedMetrics, LayerConfig, TunableConfig};

use crate::env::EnvFragment;
use crate::layer::Layer;
use crate::value::{ResolvedValues, TunableValue};

pub const CONTAINER: &str = "container";

pub const CPU_REQUEST: &str = "cpuRequest";
pub const CPU_LIMIT: &str = "cpuLimit";
pub const MEMORY_REQUEST: &str = "memoryRequest";
pub const MEMORY_LIMIT: &str = "memoryLimit";

const MEMORY_HEADROOM: f64 = 1.2;
const MIN_CPU_CORES: f64 = 0.001;

/// Memory limit decided in this evaluation, else the container's current one.
pub fn memory_limit_bytes(resolved: &ResolvedValues) -> Option<f64> {
    resolved
        .get_f64(CONTAINER, MEMORY_LIMIT)
        .or(resolved.context().memory_limit_bytes)
}

/// CPU limit decided in this evaluation, else the container's current one.
pub fn cpu_limit_cores(resolved: &ResolvedValues) -> Option<f64> {
    resolved
        .get_f64(CONTAINER, CPU_LIMIT)
        .or(resolved.context().cpu_limit_cores)
}

#[derive(Debug, Default)]
pub struct ContainerLayer;

impl Layer for ContainerLayer {
    fn layer_name(&self) -> &str {
        CONTAINER
    }

    fn metadata(&self) -> LayerConfig {
        let bounded = |name: &str, upper: f64, step: f64| TunableConfig {
            name: name.to_string(),
            value_type: "double".to_string(),
            lower_bound: Some(0.0),
            upper_bound: Some(upper),
            step: Some(step),
            choices: Vec::new(),
        };
        LayerConfig {
            name: CONTAINER.to_string(),
            tunables: vec![
                bounded(CPU_REQUEST, 64.0, MIN_CPU_CORES),
                bounded(CPU_LIMIT, 64.0, MIN_CPU_CORES),
                bounded(MEMORY_REQUEST, 256.0 * 1024.0 * 1024.0 * 1024.0, 1.0),
                bounded(MEMORY_LIMIT, 256.0 * 1024.0 * 1024.0 * 1024.0, 1.0),
            ],
            dependencies: Vec::new(),
        }
    }

    fn recommend(
        &self,
        tunable: &str,
        _resolved: &ResolvedValues,
        metrics: &AggregatedMetrics,
    ) -> Option<TunableValue> {
        match tunable {
            CPU_REQUEST | CPU_LIMIT => {
                let p98 = metrics.cpu_usage.as_ref()?.p98;
                let cores = ((p98 * 1000.0).round() / 1000.0).max(MIN_CPU_CORES);
                Some(TunableValue::Number(cores))
            }
            MEMORY_REQUEST | MEMORY_LIMIT => {
                let peak = metrics.memory_usage.as_ref()?.max;
                Some(TunableValue::Number((peak * MEMORY_HEADROOM).ceil()))
            }
            _ => None,
        }
    }

    fn format(
        &self,
        _tunable: &str,
        _value: Option<&TunableValue>,
        _resolved: &ResolvedValues,
    ) -> Vec<EnvFragment> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{metrics, summary};
    use crate::value::ContainerContext;
    use rightsize_tunables::TunableSpec;

    #[test]
    fn cpu_follows_p98() {
        let layer = ContainerLayer;
        let m = metrics(Some(summary(1.23456, 2.0)), None);
        let resolved = ResolvedValues::default();
        assert_eq!(
            layer.recommend(CPU_LIMIT, &resolved, &m),
            Some(TunableValue::Number(1.235))
        );
        assert_eq!(
            layer.recommend(CPU_REQUEST, &resolved, &m),
            Some(TunableValue::Number(1.235))
        );
    }

    #[test]
    fn idle_cpu_gets_floor() {
        let m = metrics(Some(summary(0.0, 0.0)), None);
        assert_eq!(
            ContainerLayer.recommend(CPU_LIMIT, &ResolvedValues::default(), &m),
            Some(TunableValue::Number(MIN_CPU_CORES))
        );
    }

    #[test]
    fn memory_adds_headroom() {
        let m = metrics(None, Some(summary(900.0, 1000.0)));
        assert_eq!(
            ContainerLayer.recommend(MEMORY_LIMIT, &ResolvedValues::default(), &m),
            Some(TunableValue::Number(1200.0))
        );
    }

    #[test]
    fn no_opinion_without_data_or_for_foreign_tunables() {
        let m = metrics(None, None);
        let resolved = ResolvedValues::default();
        assert_eq!(ContainerLayer.recommend(CPU_LIMIT, &resolved, &m), None);
        assert_eq!(ContainerLayer.recommend("GCPolicy", &resolved, &m), None);
    }

    #[test]
    fn limits_fall_back_to_context() {
        let mut resolved = ResolvedValues::new(ContainerContext {
            memory_limit_bytes: Some(512.0),
            cpu_limit_cores: Some(2.0),
            ..Default::default()
        });
        assert_eq!(memory_limit_bytes(&resolved), Some(512.0));
        assert_eq!(cpu_limit_cores(&resolved), Some(2.0));

        resolved.insert(
            TunableSpec::new(CONTAINER, CPU_LIMIT).unwrap(),
            TunableValue::Number(0.5),
        );
        assert_eq!(cpu_limit_cores(&resolved), Some(0.5));
    }

    #[test]
    fn metadata_declares_four_tunables() {
        let meta = ContainerLayer.metadata();
        assert_eq!(meta.name, CONTAINER);
        assert_eq!(meta.tunables.len(), 4);
        assert!(meta.dependencies.is_empty());
    }
}
