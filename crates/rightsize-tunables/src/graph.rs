//! Cross-layer tunable dependency graph.
//!
//! Nodes are every tunable declared by the participating layers. An edge
//! `source → dependency` exists when `source` declares that it requires
//! `dependency` and both are nodes of this evaluation; declarations that
//! reference an undeclared tunable are dropped.
//!
//! Resolution is Kahn's algorithm over in-degrees counted from the
//! dependency side: a node's in-degree is the number of nodes that list it
//! as a dependency. Nodes nothing depends on are emitted first, then their
//! dependencies as they are released. For `A → B → C` the emitted order is
//! `A, B, C`; [`ResolveOrder::DependenciesFirst`] reverses it.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use rightsize_core::{LayerConfig, ResolveOrder};

use crate::error::{TunableError, TunableResult};
use crate::spec::TunableSpec;

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in declaration order.
    nodes: Vec<TunableSpec>,
    /// source → dependencies, in declaration order.
    edges: HashMap<TunableSpec, Vec<TunableSpec>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for one evaluation from the participating layers'
    /// metadata.
    pub fn from_layers<'a>(
        layers: impl IntoIterator<Item = &'a LayerConfig>,
    ) -> TunableResult<Self> {
        let layers: Vec<&LayerConfig> = layers.into_iter().collect();
        let mut graph = Self::new();

        for layer in &layers {
            for tunable in &layer.tunables {
                graph.add_node(TunableSpec::new(layer.name.as_str(), tunable.name.as_str())?);
            }
        }

        for layer in &layers {
            for dependency in &layer.dependencies {
                let source = TunableSpec::new(layer.name.as_str(), dependency.tunable.as_str())?;
                for target in &dependency.depends_on {
                    graph.add_dependency(&source, TunableSpec::try_from(target)?);
                }
            }
        }

        debug!(
            layers = layers.len(),
            nodes = graph.nodes.len(),
            edges = graph.edge_count(),
            "tunable dependency graph built"
        );
        Ok(graph)
    }

    /// Add a node. Returns false if it was already present.
    pub fn add_node(&mut self, spec: TunableSpec) -> bool {
        if self.contains(&spec) {
            return false;
        }
        self.edges.insert(spec.clone(), Vec::new());
        self.nodes.push(spec);
        true
    }

    /// Record that `source` requires `dependency`.
    ///
    /// Returns false, adding nothing, when either end is not a node of this
    /// graph or the edge already exists.
    pub fn add_dependency(&mut self, source: &TunableSpec, dependency: TunableSpec) -> bool {
        if !self.contains(&dependency) {
            debug!(%source, %dependency, "dropping dependency on undeclared tunable");
            return false;
        }
        let Some(deps) = self.edges.get_mut(source) else {
            debug!(%source, %dependency, "dropping dependency from undeclared tunable");
            return false;
        };
        if deps.contains(&dependency) {
            return false;
        }
        deps.push(dependency);
        true
    }

    pub fn contains(&self, spec: &TunableSpec) -> bool {
        self.edges.contains_key(spec)
    }

    pub fn nodes(&self) -> &[TunableSpec] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Declared dependencies of `spec` that are present in the graph.
    pub fn dependencies(&self, spec: &TunableSpec) -> &[TunableSpec] {
        self.edges.get(spec).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Resolve in the emitted (dependents-first) order.
    pub fn resolve(&self) -> TunableResult<Vec<TunableSpec>> {
        let mut in_degree: HashMap<&TunableSpec, usize> =
            self.nodes.iter().map(|n| (n, 0)).collect();
        for deps in self.edges.values() {
            for dep in deps {
                if let Some(degree) = in_degree.get_mut(dep) {
                    *degree += 1;
                }
            }
        }

        let mut queue: VecDeque<&TunableSpec> = self
            .nodes
            .iter()
            .filter(|n| in_degree.get(n).copied() == Some(0))
            .collect();

        let mut ordered = Vec::with_capacity(self.nodes.len());
        while let Some(node) = queue.pop_front() {
            ordered.push(node.clone());
            for dep in self.dependencies(node) {
                if let Some(degree) = in_degree.get_mut(dep) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dep);
                    }
                }
            }
        }

        if ordered.len() < self.nodes.len() {
            let unresolved: Vec<TunableSpec> = self
                .nodes
                .iter()
                .filter(|n| in_degree.get(n).is_some_and(|d| *d > 0))
                .cloned()
                .collect();
            warn!(
                resolved = ordered.len(),
                total = self.nodes.len(),
                unresolved = unresolved.len(),
                "tunable dependency cycle detected"
            );
            return Err(TunableError::Cycle { unresolved });
        }

        Ok(ordered)
    }

    pub fn resolve_with(&self, order: ResolveOrder) -> TunableResult<Vec<TunableSpec>> {
        let mut ordered = self.resolve()?;
        if order == ResolveOrder::DependenciesFirst {
            ordered.reverse();
        }
        Ok(ordered)
    }
}
