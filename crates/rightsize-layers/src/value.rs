//! Tunable values and the per-evaluation lookup table handlers read from.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use rightsize_tunables::TunableSpec;

/// A concrete value decided for a tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TunableValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl TunableValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TunableValue::Integer(v) => Some(*v as f64),
            TunableValue::Number(v) => Some(*v),
            TunableValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TunableValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TunableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunableValue::Integer(v) => write!(f, "{v}"),
            TunableValue::Number(v) => write!(f, "{v}"),
            TunableValue::Text(s) => f.write_str(s),
        }
    }
}

/// What is currently configured on the container, used when a tunable
/// has not been decided earlier in the evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerContext {
    #[serde(default)]
    pub memory_limit_bytes: Option<f64>,
    #[serde(default)]
    pub cpu_limit_cores: Option<f64>,
    /// Heap already configured on the JVM (e.g. via -Xmx), in MB.
    #[serde(default)]
    pub max_heap_mb: Option<f64>,
    #[serde(default)]
    pub jdk_version: Option<String>,
    /// Option variables the container's image honours, e.g.
    /// `JAVA_OPTIONS`, `JDK_JAVA_OPTIONS`.
    #[serde(default)]
    pub env_vars: Vec<String>,
}

impl ContainerContext {
    pub fn has_env_var(&self, name: &str) -> bool {
        self.env_vars.iter().any(|v| v == name)
    }
}

/// Values decided so far in one evaluation, plus the container context.
#[derive(Debug, Clone, Default)]
pub struct ResolvedValues {
    values: HashMap<TunableSpec, TunableValue>,
    context: ContainerContext,
}

impl ResolvedValues {
    pub fn new(context: ContainerContext) -> Self {
        Self {
            values: HashMap::new(),
            context,
        }
    }

    pub fn insert(&mut self, spec: TunableSpec, value: TunableValue) {
        self.values.insert(spec, value);
    }

    pub fn get(&self, layer: &str, tunable: &str) -> Option<&TunableValue> {
        let spec = TunableSpec::new(layer, tunable).ok()?;
        self.values.get(&spec)
    }

    pub fn get_f64(&self, layer: &str, tunable: &str) -> Option<f64> {
        self.get(layer, tunable).and_then(TunableValue::as_f64)
    }

    pub fn context(&self) -> &ContainerContext {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
