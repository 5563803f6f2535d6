//! Shared types used across rightsize crates.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Interval results ───────────────────────────────────────────────

/// Metrics tracked per container by the collection subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricName {
    CpuRequest,
    CpuLimit,
    CpuUsage,
    CpuThrottle,
    MemoryRequest,
    MemoryLimit,
    MemoryUsage,
    #[serde(rename = "memoryRSS")]
    MemoryRss,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::CpuRequest => "cpuRequest",
            MetricName::CpuLimit => "cpuLimit",
            MetricName::CpuUsage => "cpuUsage",
            MetricName::CpuThrottle => "cpuThrottle",
            MetricName::MemoryRequest => "memoryRequest",
            MetricName::MemoryLimit => "memoryLimit",
            MetricName::MemoryUsage => "memoryUsage",
            MetricName::MemoryRss => "memoryRSS",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation info for one metric over one interval.
///
/// Values are summed across all pods of the container's workload, so
/// `sum / avg` approximates the number of pods that reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregation {
    #[serde(default)]
    pub avg: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub sum: Option<f64>,
    #[serde(default)]
    pub count: Option<u64>,
    /// Display unit, e.g. "cores" or "bytes".
    #[serde(default)]
    pub format: Option<String>,
}

/// One timestamped aggregation of observed metrics for a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalResult {
    #[serde(default)]
    pub interval_start: Option<DateTime<Utc>>,
    pub interval_end: DateTime<Utc>,
    /// Actual length of the sampling interval.
    pub duration_in_minutes: f64,
    #[serde(default)]
    pub metrics: HashMap<MetricName, MetricAggregation>,
}

impl IntervalResult {
    pub fn metric(&self, name: MetricName) -> Option<&MetricAggregation> {
        self.metrics.get(&name)
    }
}

/// Interval results for one container, keyed by interval end.
pub type ContainerResults = BTreeMap<DateTime<Utc>, IntervalResult>;

/// Index a flat list of interval results by their end timestamp.
///
/// A later result with the same end timestamp replaces an earlier one.
pub fn index_results(results: impl IntoIterator<Item = IntervalResult>) -> ContainerResults {
    results
        .into_iter()
        .map(|r| (r.interval_end, r))
        .collect()
}

// ── Terms ──────────────────────────────────────────────────────────

/// The closed set of analysis term names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TermName {
    Short,
    Medium,
    Long,
    Fixed,
}

impl TermName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermName::Short => "short",
            TermName::Medium => "medium",
            TermName::Long => "long",
            TermName::Fixed => "fixed",
        }
    }
}

impl FromStr for TermName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(TermName::Short),
            "medium" => Ok(TermName::Medium),
            "long" => Ok(TermName::Long),
            "fixed" => Ok(TermName::Fixed),
            other => Err(ConfigError::UnknownTerm(other.to_string())),
        }
    }
}

impl TryFrom<String> for TermName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TermName> for String {
    fn from(value: TermName) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TermName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub name: TermName,
    pub duration_in_days: f64,
    /// Minimum data coverage required before recommending.
    pub threshold_in_days: f64,
    /// Number of visualization points.
    pub plots_datapoints: u32,
    /// Width of each visualization sub-window, fractional days allowed.
    pub plots_datapoint_delta_in_days: f64,
}

impl Term {
    pub fn short() -> Self {
        Self {
            name: TermName::Short,
            duration_in_days: 1.0,
            threshold_in_days: 0.5,
            plots_datapoints: 4,
            plots_datapoint_delta_in_days: 0.25,
        }
    }

    pub fn medium() -> Self {
        Self {
            name: TermName::Medium,
            duration_in_days: 7.0,
            threshold_in_days: 2.0,
            plots_datapoints: 7,
            plots_datapoint_delta_in_days: 1.0,
        }
    }

    pub fn long() -> Self {
        Self {
            name: TermName::Long,
            duration_in_days: 15.0,
            threshold_in_days: 8.0,
            plots_datapoints: 15,
            plots_datapoint_delta_in_days: 1.0,
        }
    }

    /// The built-in short/medium/long terms.
    pub fn defaults() -> Vec<Term> {
        vec![Term::short(), Term::medium(), Term::long()]
    }
}

/// Precedence of the resolved tunable order.
///
/// `DependentsFirst` is the order the Kahn walk emits: a tunable nothing
/// else depends on comes before the tunables it depends on.
/// `DependenciesFirst` is the reverse of that emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOrder {
    #[default]
    DependentsFirst,
    DependenciesFirst,
}

impl FromStr for ResolveOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dependents_first" => Ok(ResolveOrder::DependentsFirst),
            "dependencies_first" => Ok(ResolveOrder::DependenciesFirst),
            other => Err(format!("unknown order: {other}")),
        }
    }
}

// ── Aggregated usage ───────────────────────────────────────────────

/// Percentile-summarized usage for one sub-window of a monitoring period.
///
/// `min` is omitted when it is exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Per-metric plot points for one sub-window. A metric with no samples
/// in the sub-window is `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotMetrics {
    pub cpu_usage: Option<PlotPoint>,
    pub memory_usage: Option<PlotPoint>,
}

/// The N-point plot structure consumed by the visualization API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub datapoints: u32,
    pub plots_data: BTreeMap<DateTime<Utc>, PlotMetrics>,
}

/// Whole-window usage summary for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub p98: f64,
    pub max: f64,
    pub samples: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Everything the aggregator hands to layer handlers for one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub cpu_usage: Option<UsageSummary>,
    pub memory_usage: Option<UsageSummary>,
    pub plots: PlotData,
}
