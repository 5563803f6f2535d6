//! Fixtures shared by the layer tests.

use rightsize_core::{AggregatedMetrics, PlotData, UsageSummary};

use crate::value::{ContainerContext, ResolvedValues};

pub(crate) fn summary(p98: f64, max: f64) -> UsageSummary {
    UsageSummary {
        min: 0.0,
        q1: p98 / 4.0,
        median: p98 / 2.0,
        q3: p98 * 0.75,
        p98,
        max,
        samples: 10,
        format: None,
    }
}

pub(crate) fn metrics(
    cpu: Option<UsageSummary>,
    memory: Option<UsageSummary>,
) -> AggregatedMetrics {
    AggregatedMetrics {
        cpu_usage: cpu,
        memory_usage: memory,
        plots: PlotData {
            datapoints: 0,
            plots_data: Default::default(),
        },
    }
}

pub(crate) fn no_metrics() -> AggregatedMetrics {
    metrics(None, None)
}

/// A container with the given limits, JDK and honoured option variables.
pub(crate) fn resolved(
    memory_mb: f64,
    cores: f64,
    jdk: Option<&str>,
    env_vars: &[&str],
) -> ResolvedValues {
    ResolvedValues::new(ContainerContext {
        memory_limit_bytes: Some(memory_mb * 1024.0 * 1024.0),
        cpu_limit_cores: Some(cores),
        max_heap_mb: None,
        jdk_version: jdk.map(str::to_string),
        env_vars: env_vars.iter().map(|v| v.to_string()).collect(),
    })
}
