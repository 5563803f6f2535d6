//! Engine inputs and outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rightsize_core::{AggregatedMetrics, IntervalResult, TermName};
use rightsize_layers::{ContainerContext, EnvVar, TunableValue};
use rightsize_tunables::TunableSpec;

/// One container to evaluate: which layers it runs, what it is currently
/// configured with, and its interval results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInput {
    pub container_name: String,
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub context: ContainerContext,
    #[serde(default)]
    pub results: Vec<IntervalResult>,
}

impl ContainerInput {
    /// Latest interval end among this container's results.
    pub fn latest_interval_end(&self) -> Option<DateTime<Utc>> {
        self.results.iter().map(|r| r.interval_end).max()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub code: u32,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub const RECOMMENDATIONS_AVAILABLE: u32 = 111000;
    pub const NOT_ENOUGH_DATA: u32 = 120001;

    pub fn recommendations_available() -> Self {
        Self {
            code: Self::RECOMMENDATIONS_AVAILABLE,
            kind: NotificationKind::Info,
            message: "Recommendations Are Available".to_string(),
        }
    }

    pub fn not_enough_data() -> Self {
        Self {
            code: Self::NOT_ENOUGH_DATA,
            kind: NotificationKind::Info,
            message: "There is not enough data available to generate a recommendation."
                .to_string(),
        }
    }
}

/// A decided value for one tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunableRecommendation {
    pub layer: String,
    pub tunable: String,
    pub value: TunableValue,
}

/// Outcome of one term for one container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecommendation {
    pub term: TermName,
    pub monitoring_start_time: Option<DateTime<Utc>>,
    pub monitoring_end_time: DateTime<Utc>,
    /// Observed hours, capped at the term's maximum. Zero when skipped.
    pub duration_in_hours: f64,
    pub notifications: Vec<Notification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tunables: Vec<TunableRecommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<AggregatedMetrics>,
}

impl TermRecommendation {
    pub(crate) fn skipped(
        term: TermName,
        monitoring_start_time: Option<DateTime<Utc>>,
        monitoring_end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            term,
            monitoring_start_time,
            monitoring_end_time,
            duration_in_hours: 0.0,
            notifications: vec![Notification::not_enough_data()],
            tunables: Vec::new(),
            env: Vec::new(),
            metrics: None,
        }
    }

    /// Whether this term produced values.
    pub fn is_available(&self) -> bool {
        self.notifications
            .iter()
            .any(|n| n.code == Notification::RECOMMENDATIONS_AVAILABLE)
    }

    pub fn tunable(&self, layer: &str, tunable: &str) -> Option<&TunableValue> {
        self.tunables
            .iter()
            .find(|t| t.layer == layer && t.tunable == tunable)
            .map(|t| &t.value)
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }
}

/// Every term's outcome for one container, plus the tunable order used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecommendation {
    pub container_name: String,
    pub monitoring_end_time: DateTime<Utc>,
    pub tunable_order: Vec<TunableSpec>,
    pub terms: Vec<TermRecommendation>,
}

impl ContainerRecommendation {
    pub fn term(&self, name: TermName) -> Option<&TermRecommendation> {
        self.terms.iter().find(|t| t.term == name)
    }
}
