//! rightsize.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::{ResolveOrder, Term};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightsizeConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default = "Term::defaults")]
    pub terms: Vec<Term>,
    /// Layer metadata overrides. Layers not listed here keep their
    /// built-in tunables and dependencies.
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

/// Settings for the data-sufficiency scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Sampling interval of the upstream interval results.
    #[serde(default = "default_measurement_duration")]
    pub measurement_duration_minutes: f64,
    /// How far a sample may sit from its expected timestamp and still count.
    #[serde(default = "default_tolerance")]
    pub tolerance_seconds: i64,
    /// Slack subtracted from a term's threshold.
    #[serde(default = "default_buffer")]
    pub buffer_minutes: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            measurement_duration_minutes: default_measurement_duration(),
            tolerance_seconds: default_tolerance(),
            buffer_minutes: default_buffer(),
        }
    }
}

fn default_measurement_duration() -> f64 {
    15.0
}

fn default_tolerance() -> i64 {
    30
}

fn default_buffer() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Containers evaluated in parallel by batch callers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub order: ResolveOrder,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            order: ResolveOrder::default(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

/// Tunable metadata and dependency declarations for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    #[serde(default)]
    pub tunables: Vec<TunableConfig>,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunableConfig {
    pub name: String,
    /// "double", "integer" or "categorical".
    #[serde(default = "default_value_type")]
    pub value_type: String,
    #[serde(default)]
    pub lower_bound: Option<f64>,
    #[serde(default)]
    pub upper_bound: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub choices: Vec<String>,
}

fn default_value_type() -> String {
    "double".to_string()
}

/// `tunable` (in the declaring layer) requires every entry of `depends_on`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfig {
    pub tunable: String,
    #[serde(default)]
    pub depends_on: Vec<TunableRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunableRef {
    pub layer: String,
    pub tunable: String,
}

impl TunableRef {
    pub fn new(layer: &str, tunable: &str) -> Self {
        Self {
            layer: layer.to_string(),
            tunable: tunable.to_string(),
        }
    }
}

impl Default for RightsizeConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            engine: EngineConfig::default(),
            terms: Term::defaults(),
            layers: Vec::new(),
        }
    }
}

impl RightsizeConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), terms = config.terms.len(), "config loaded");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: RightsizeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !is_positive(self.window.measurement_duration_minutes) {
            return Err(ConfigError::InvalidWindow(
                "measurement_duration_minutes must be positive".to_string(),
            ));
        }
        if self.window.tolerance_seconds < 0 {
            return Err(ConfigError::InvalidWindow(
                "tolerance_seconds must not be negative".to_string(),
            ));
        }
        if self.window.buffer_minutes < 0.0 {
            return Err(ConfigError::InvalidWindow(
                "buffer_minutes must not be negative".to_string(),
            ));
        }

        for term in &self.terms {
            let invalid = |reason: &str| ConfigError::InvalidTerm {
                term: term.name.to_string(),
                reason: reason.to_string(),
            };
            if !is_positive(term.duration_in_days) {
                return Err(invalid("duration_in_days must be positive"));
            }
            if term.threshold_in_days < 0.0 {
                return Err(invalid("threshold_in_days must not be negative"));
            }
            if term.plots_datapoints == 0 {
                return Err(invalid("plots_datapoints must be at least 1"));
            }
            if !is_positive(term.plots_datapoint_delta_in_days) {
                return Err(invalid("plots_datapoint_delta_in_days must be positive"));
            }
        }
        Ok(())
    }

    /// Configured metadata override for a layer, if any.
    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// False for NaN as well as for zero and negatives.
fn is_positive(value: f64) -> bool {
    value > 0.0
}
