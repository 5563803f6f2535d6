//! Tunable identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use rightsize_core::TunableRef;

use crate::error::{TunableError, TunableResult};

/// Identity of a tunable: the declaring layer plus the tunable's name.
///
/// Both parts are non-blank; equality and hashing use both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "TunableRef", into = "TunableRef")]
pub struct TunableSpec {
    layer_name: String,
    tunable_name: String,
}

impl TunableSpec {
    pub fn new(
        layer_name: impl Into<String>,
        tunable_name: impl Into<String>,
    ) -> TunableResult<Self> {
        let layer_name = layer_name.into();
        let tunable_name = tunable_name.into();
        if layer_name.trim().is_empty() {
            return Err(TunableError::BlankField { field: "layer name" });
        }
        if tunable_name.trim().is_empty() {
            return Err(TunableError::BlankField {
                field: "tunable name",
            });
        }
        Ok(Self {
            layer_name,
            tunable_name,
        })
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn tunable_name(&self) -> &str {
        &self.tunable_name
    }
}

impl TryFrom<TunableRef> for TunableSpec {
    type Error = TunableError;

    fn try_from(value: TunableRef) -> Result<Self, Self::Error> {
        TunableSpec::new(value.layer, value.tunable)
    }
}

impl TryFrom<&TunableRef> for TunableSpec {
    type Error = TunableError;

    fn try_from(value: &TunableRef) -> Result<Self, Self::Error> {
        TunableSpec::new(value.layer.as_str(), value.tunable.as_str())
    }
}

impl From<TunableSpec> for TunableRef {
    fn from(value: TunableSpec) -> Self {
        TunableRef {
            layer: value.layer_name,
            tunable: value.tunable_name,
        }
    }
}

impl fmt::Display for TunableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer_name, self.tunable_name)
    }
}
