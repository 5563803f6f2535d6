//! Environment-variable rendering.
//!
//! Handlers return `(variable, fragment)` pairs instead of appending to
//! shared builders. The engine collects them in dispatch order and merges
//! them once at the end.

use serde::{Deserialize, Serialize};

use crate::value::ContainerContext;

pub const JAVA_OPTIONS: &str = "JAVA_OPTIONS";
pub const JDK_JAVA_OPTIONS: &str = "JDK_JAVA_OPTIONS";

/// One rendered piece of an environment variable's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvFragment {
    pub name: String,
    pub fragment: String,
}

impl EnvFragment {
    pub fn new(name: &str, fragment: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            fragment: fragment.into(),
        }
    }
}

/// A final environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// The variable JVM options should go to: `JDK_JAVA_OPTIONS` when the
/// container honours it, otherwise `JAVA_OPTIONS`.
pub fn java_options_var(context: &ContainerContext) -> &'static str {
    if context.has_env_var(JDK_JAVA_OPTIONS) {
        JDK_JAVA_OPTIONS
    } else {
        JAVA_OPTIONS
    }
}

/// Merge fragments into variables, joining fragments of the same variable
/// with a space. Variables keep their first-appearance order.
pub fn merge_fragments<'a>(fragments: impl IntoIterator<Item = &'a EnvFragment>) -> Vec<EnvVar> {
    let mut vars: Vec<EnvVar> = Vec::new();
    for f in fragments {
        let fragment = f.fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        match vars.iter_mut().find(|v| v.name == f.name) {
            Some(var) => {
                var.value.push(' ');
                var.value.push_str(fragment);
            }
            None => vars.push(EnvVar {
                name: f.name.clone(),
                value: fragment.to_string(),
            }),
        }
    }
    vars
}
