//! Layer registry.
//!
//! Built once at startup and passed by reference into every evaluation.
//! Nothing mutates it afterwards, so concurrent evaluations share it
//! without locking.

use std::collections::HashMap;
use std::fmt;

use rightsize_core::{AggregatedMetrics, LayerConfig};
use rightsize_tunables::TunableSpec;
use tracing::{debug, info};

use crate::container::ContainerLayer;
use crate::env::EnvFragment;
use crate::error::{LayerError, LayerResult};
use crate::hotspot::HotspotLayer;
use crate::layer::Layer;
use crate::quarkus::QuarkusLayer;
use crate::semeru::SemeruLayer;
use crate::value::{ResolvedValues, TunableValue};

struct Registered {
    handler: Box<dyn Layer>,
    metadata: LayerConfig,
}

#[derive(Default)]
pub struct LayerRegistry {
    layers: HashMap<String, Registered>,
    /// Registration order, for stable listings.
    names: Vec<String>,
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("layers", &self.names)
            .finish()
    }
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Container, Hotspot, Semeru and Quarkus.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtins: [Box<dyn Layer>; 4] = [
            Box::new(ContainerLayer),
            Box::new(HotspotLayer),
            Box::new(SemeruLayer),
            Box::new(QuarkusLayer),
        ];
        for layer in builtins {
            registry
                .register(layer)
                .expect("built-in layer names are distinct and non-blank");
        }
        registry
    }

    /// Built-in layers with configured metadata laid over them.
    pub fn from_config(overrides: &[LayerConfig]) -> LayerResult<Self> {
        let mut registry = Self::builtin();
        for config in overrides {
            let entry = registry
                .layers
                .get_mut(&config.name)
                .ok_or_else(|| LayerError::Unknown(config.name.clone()))?;
            if !config.tunables.is_empty() {
                entry.metadata.tunables = config.tunables.clone();
            }
            if !config.dependencies.is_empty() {
                entry.metadata.dependencies = config.dependencies.clone();
            }
            debug!(
                layer = %config.name,
                tunables = entry.metadata.tunables.len(),
                dependencies = entry.metadata.dependencies.len(),
                "layer metadata overridden from config"
            );
        }
        Ok(registry)
    }

    /// Register a handler under its own name.
    ///
    /// Returns `Ok(false)` when the name is already taken; the first
    /// registration stays in place.
    pub fn register(&mut self, handler: Box<dyn Layer>) -> LayerResult<bool> {
        let name = handler.layer_name().trim().to_string();
        if name.is_empty() {
            return Err(LayerError::BlankName);
        }
        if self.layers.contains_key(&name) {
            debug!(layer = %name, "layer already registered, keeping the first");
            return Ok(false);
        }
        let metadata = handler.metadata();
        info!(layer = %name, tunables = metadata.tunables.len(), "layer registered");
        self.names.push(name.clone());
        self.layers.insert(name, Registered { handler, metadata });
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Layer> {
        self.layers.get(name).map(|r| r.handler.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    pub fn metadata(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.get(name).map(|r| &r.metadata)
    }

    /// Metadata for each named layer, in the given order.
    pub fn metadata_for<S: AsRef<str>>(&self, names: &[S]) -> LayerResult<Vec<&LayerConfig>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.metadata(name)
                    .ok_or_else(|| LayerError::Unknown(name.to_string()))
            })
            .collect()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Route a tunable to its layer's `recommend`.
    pub fn recommend(
        &self,
        spec: &TunableSpec,
        resolved: &ResolvedValues,
        metrics: &AggregatedMetrics,
    ) -> LayerResult<Option<TunableValue>> {
        let layer = self.handler(spec.layer_name())?;
        Ok(layer.recommend(spec.tunable_name(), resolved, metrics))
    }

    /// Route a tunable to its layer's `format`.
    pub fn format(
        &self,
        spec: &TunableSpec,
        value: Option<&TunableValue>,
        resolved: &ResolvedValues,
    ) -> LayerResult<Vec<EnvFragment>> {
        let layer = self.handler(spec.layer_name())?;
        Ok(layer.format(spec.tunable_name(), value, resolved))
    }

    fn handler(&self, name: &str) -> LayerResult<&dyn Layer> {
        self.get(name)
            .ok_or_else(|| LayerError::Unknown(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{CONTAINER, CPU_LIMIT, MEMORY_LIMIT};
    use crate::jvm::GC_POLICY;
    use crate::testing::{metrics, no_metrics, resolved, summary};
    use rightsize_core::{DependencyConfig, TunableRef};

    struct Named(&'static str);

    impl Layer for Named {
        fn layer_name(&self) -> &str {
            self.0
        }

        fn metadata(&self) -> LayerConfig {
            LayerConfig {
                name: self.0.to_string(),
                tunables: Vec::new(),
                dependencies: Vec::new(),
            }
        }

        fn recommend(
            &self,
            _tunable: &str,
            _resolved: &ResolvedValues,
            _metrics: &AggregatedMetrics,
        ) -> Option<TunableValue> {
            Some(TunableValue::Text("stub".to_string()))
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

    #[test]
    fn builtin_has_four_layers_in_order() {
        let registry = LayerRegistry::builtin();
        assert_eq!(registry.names(), ["container", "hotspot", "semeru", "quarkus"]);
        assert_eq!(registry.len(), 4);
        assert!(registry.contains("quarkus"));
        assert!(registry.get("openliberty").is_none());
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut registry = LayerRegistry::builtin();
        assert_eq!(registry.register(Box::new(Named(CONTAINER))), Ok(false));
        assert_eq!(registry.len(), 4);

        // The original container layer still answers.
        let spec = TunableSpec::new(CONTAINER, MEMORY_LIMIT).unwrap();
        let m = metrics(None, Some(summary(0.0, 1000.0)));
        let value = registry
            .recommend(&spec, &ResolvedValues::default(), &m)
            .unwrap();
        assert_eq!(value, Some(TunableValue::Number(1200.0)));
    }

    #[test]
    fn blank_name_rejected() {
        let mut registry = LayerRegistry::new();
        assert_eq!(registry.register(Box::new(Named("  "))), Err(LayerError::BlankName));
        assert!(registry.is_empty());
    }

    #[test]
    fn custom_layer_registers() {
        let mut registry = LayerRegistry::new();
        assert_eq!(registry.register(Box::new(Named("liberty"))), Ok(true));
        let spec = TunableSpec::new("liberty", "maxThreads").unwrap();
        assert_eq!(
            registry
                .recommend(&spec, &ResolvedValues::default(), &no_metrics())
                .unwrap(),
            Some(TunableValue::Text("stub".to_string()))
        );
    }

    #[test]
    fn unknown_layer_routing_fails() {
        let registry = LayerRegistry::builtin();
        let spec = TunableSpec::new("openliberty", "maxThreads").unwrap();
        assert_eq!(
            registry.recommend(&spec, &ResolvedValues::default(), &no_metrics()),
            Err(LayerError::Unknown("openliberty".to_string()))
        );
        assert!(registry.format(&spec, None, &ResolvedValues::default()).is_err());
        assert!(registry.metadata_for(&["container", "openliberty"][..]).is_err());
    }

    #[test]
    fn routes_format_to_layer() {
        let registry = LayerRegistry::builtin();
        let spec = TunableSpec::new("hotspot", GC_POLICY).unwrap();
        let r = resolved(1024.0, 1.0, None, &[]);
        let fragments = registry
            .format(&spec, Some(&TunableValue::Text("Serial".into())), &r)
            .unwrap();
        assert_eq!(fragments[0].fragment, "-XX:+UseSerialGC");
    }

    #[test]
    fn config_overrides_metadata() {
        let overrides = vec![LayerConfig {
            name: "quarkus".to_string(),
            tunables: Vec::new(),
            dependencies: vec![DependencyConfig {
                tunable: "quarkus.thread-pool.core-threads".to_string(),
                depends_on: vec![
                    TunableRef::new(CONTAINER, CPU_LIMIT),
                    TunableRef::new(CONTAINER, MEMORY_LIMIT),
                ],
            }],
        }];
        let registry = LayerRegistry::from_config(&overrides).unwrap();
        let meta = registry.metadata("quarkus").unwrap();
        assert_eq!(meta.tunables.len(), 1);
        assert_eq!(meta.dependencies[0].depends_on.len(), 2);
    }

    #[test]
    fn config_for_unknown_layer_fails() {
        let overrides = vec![LayerConfig {
            name: "wildfly".to_string(),
            tunables: Vec::new(),
            dependencies: Vec::new(),
        }];
        assert_eq!(
            LayerRegistry::from_config(&overrides).unwrap_err(),
            LayerError::Unknown("wildfly".to_string())
        );
    }
}
