//! Usage aggregation — percentile summaries over monitoring sub-windows.
//!
//! ```text
//! monitoring_start ──┬── +delta ──┬── +2·delta ──┬ … ┬── +N·delta
//!                    │  point 1   │   point 2    │   │  point N
//! ```
//!
//! Each sub-window collects the interval results whose end timestamp lies
//! in `(previous edge, edge]` and summarizes one representative value per
//! result.

use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use rightsize_core::{
    AggregatedMetrics, ContainerResults, MetricAggregation, MetricName, PlotData, PlotMetrics,
    PlotPoint, Term, UsageSummary,
};

use crate::percentile::{Summary, summarize};

/// Representative usage for one interval result.
///
/// Usage under one unit (one core for CPU) is taken as `max(max, avg)`.
/// Above that, the aggregate is split across an estimated
/// `ceil(sum / avg)` pods so a single bursty pod does not dominate:
/// `max(sum / pods, max(max, avg))`.
pub fn representative_value(agg: &MetricAggregation) -> Option<f64> {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    let peak = match (finite(agg.max), finite(agg.avg)) {
        (Some(max), Some(avg)) => max.max(avg),
        (Some(max), None) => max,
        (None, Some(avg)) => avg,
        (None, None) => return None,
    };

    match (finite(agg.sum), finite(agg.avg)) {
        (Some(sum), Some(avg)) if sum >= 1.0 && avg > 0.0 => {
            let pods = (sum / avg).ceil().max(1.0);
            Some((sum / pods).max(peak))
        }
        _ => Some(peak),
    }
}

/// Plot points for `term.plots_datapoints` consecutive sub-windows of
/// `term.plots_datapoint_delta_in_days`, starting at `monitoring_start`.
pub fn plot_data(
    results: &ContainerResults,
    term: &Term,
    monitoring_start: DateTime<Utc>,
) -> PlotData {
    let mut plots_data = BTreeMap::new();
    let delta_millis = term.plots_datapoint_delta_in_days * 86_400_000.0;

    let mut previous = monitoring_start;
    for point in 1..=term.plots_datapoints {
        let offset = (delta_millis * f64::from(point)).round();
        let Some(edge) = TimeDelta::try_milliseconds(offset as i64)
            .and_then(|d| monitoring_start.checked_add_signed(d))
        else {
            break;
        };

        let window = collect_window(results, previous, edge);
        plots_data.insert(
            edge,
            PlotMetrics {
                cpu_usage: plot_point(&window.cpu),
                memory_usage: plot_point(&window.memory),
            },
        );
        previous = edge;
    }

    debug!(
        term = %term.name,
        points = plots_data.len(),
        "plot data aggregated"
    );

    PlotData {
        datapoints: term.plots_datapoints,
        plots_data,
    }
}

/// Whole-window summaries over `(monitoring_start, monitoring_end]` plus
/// the term's plot data.
pub fn aggregate(
    results: &ContainerResults,
    term: &Term,
    monitoring_start: DateTime<Utc>,
    monitoring_end: DateTime<Utc>,
) -> AggregatedMetrics {
    let window = collect_window(results, monitoring_start, monitoring_end);
    AggregatedMetrics {
        cpu_usage: usage_summary(&window.cpu),
        memory_usage: usage_summary(&window.memory),
        plots: plot_data(results, term, monitoring_start),
    }
}

/// Representative values of one metric within a window.
#[derive(Default)]
struct MetricSamples {
    values: Vec<f64>,
    format: Option<String>,
}

impl MetricSamples {
    fn push(&mut self, agg: &MetricAggregation) {
        if let Some(value) = representative_value(agg) {
            self.values.push(value);
            if self.format.is_none() {
                self.format = agg.format.clone();
            }
        }
    }
}

#[derive(Default)]
struct WindowSamples {
    cpu: MetricSamples,
    memory: MetricSamples,
}

fn collect_window(
    results: &ContainerResults,
    after: DateTime<Utc>,
    until: DateTime<Utc>,
) -> WindowSamples {
    let mut samples = WindowSamples::default();
    if until <= after {
        return samples;
    }
    for result in results
        .range((Bound::Excluded(after), Bound::Included(until)))
        .map(|(_, r)| r)
    {
        if let Some(cpu) = result.metric(MetricName::CpuUsage) {
            samples.cpu.push(cpu);
        }
        if let Some(memory) = result.metric(MetricName::MemoryUsage) {
            samples.memory.push(memory);
        }
    }
    samples
}

fn plot_point(samples: &MetricSamples) -> Option<PlotPoint> {
    let Summary {
        min,
        q1,
        median,
        q3,
        max,
        ..
    } = summarize(&samples.values)?;
    Some(PlotPoint {
        min: (min != 0.0).then_some(min),
        q1,
        median,
        q3,
        max,
        format: samples.format.clone(),
    })
}

fn usage_summary(samples: &MetricSamples) -> Option<UsageSummary> {
    let s = summarize(&samples.values)?;
    Some(UsageSummary {
        min: s.min,
        q1: s.q1,
        median: s.median,
        q3: s.q3,
        p98: s.p98,
        max: s.max,
        samples: s.count,
        format: samples.format.clone(),
    })
}
