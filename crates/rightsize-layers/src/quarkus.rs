//! Quarkus framework layer.
//!
//! Sizes the worker thread pool to the container's CPU limit.

use rightsize_core::{AggregatedMetrics, DependencyConfig, LayerConfig, TunableConfig, TunableRef};

use crate::container::{self, CONTAINER, CPU_LIMIT};
use crate::env::{EnvFragment, java_options_var};
use crate::layer::Layer;
use crate::value::{ResolvedValues, TunableValue};

pub const QUARKUS: &str = "quarkus";
pub const CORE_THREADS: &str = "quarkus.thread-pool.core-threads";

#[derive(Debug, Default)]
pub struct QuarkusLayer;

impl Layer for QuarkusLayer {
    fn layer_name(&self) -> &str {
        QUARKUS
    }

    fn metadata(&self) -> LayerConfig {
        LayerConfig {
            name: QUARKUS.to_string(),
            tunables: vec![TunableConfig {
                name: CORE_THREADS.to_string(),
                value_type: "integer".to_string(),
                lower_bound: Some(1.0),
                upper_bound: Some(256.0),
                step: Some(1.0),
                choices: Vec::new(),
            }],
            dependencies: vec![DependencyConfig {
                tunable: CORE_THREADS.to_string(),
                depends_on: vec![TunableRef::new(CONTAINER, CPU_LIMIT)],
            }],
        }
    }

    fn recommend(
        &self,
        tunable: &str,
        resolved: &ResolvedValues,
        _metrics: &AggregatedMetrics,
    ) -> Option<TunableValue> {
        if tunable != CORE_THREADS {
            return None;
        }
        let cores = container::cpu_limit_cores(resolved)?;
        let threads = cores.ceil().max(1.0) as i64;
        Some(TunableValue::Integer(threads))
    }

    fn format(
        &self,
        tunable: &str,
        value: Option<&TunableValue>,
        resolved: &ResolvedValues,
    ) -> Vec<EnvFragment> {
        match value {
            Some(value) if tunable == CORE_THREADS => vec![EnvFragment::new(
                java_options_var(resolved.context()),
                format!("-D{CORE_THREADS}={value}"),
            )],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::JDK_JAVA_OPTIONS;
    use crate::testing::{no_metrics, resolved};
    use rightsize_tunables::TunableSpec;

    #[test]
    fn threads_round_up_cpu_limit() {
        let r = resolved(1024.0, 1.5, None, &[]);
        assert_eq!(
            QuarkusLayer.recommend(CORE_THREADS, &r, &no_metrics()),
            Some(TunableValue::Integer(2))
        );

        let mut r = resolved(1024.0, 4.0, None, &[]);
        r.insert(
            TunableSpec::new(CONTAINER, CPU_LIMIT).unwrap(),
            TunableValue::Number(0.25),
        );
        assert_eq!(
            QuarkusLayer.recommend(CORE_THREADS, &r, &no_metrics()),
            Some(TunableValue::Integer(1))
        );
    }

    #[test]
    fn unknown_cpu_limit_means_no_opinion() {
        assert_eq!(
            QuarkusLayer.recommend(CORE_THREADS, &ResolvedValues::default(), &no_metrics()),
            None
        );
    }

    #[test]
    fn renders_system_property() {
        let r = resolved(1024.0, 2.0, None, &[JDK_JAVA_OPTIONS]);
        assert_eq!(
            QuarkusLayer.format(CORE_THREADS, Some(&TunableValue::Integer(2)), &r),
            vec![EnvFragment::new(
                JDK_JAVA_OPTIONS,
                "-Dquarkus.thread-pool.core-threads=2"
            )]
        );
        assert!(QuarkusLayer.format(CORE_THREADS, None, &r).is_empty());
    }
}
