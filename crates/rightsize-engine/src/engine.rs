//! Recommendation engine — evaluates one container across all terms.
//!
//! Per container the tunable order is resolved once. Each configured term
//! is then gated on data coverage, aggregated, and dispatched tunable by
//! tunable to the owning layer. Values decided earlier in the order are
//! visible to later handlers.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use rightsize_core::{AggregatedMetrics, ContainerResults, RightsizeConfig, Term, index_results};
use rightsize_layers::{ContainerContext, EnvVar, LayerRegistry, ResolvedValues, merge_fragments};
use rightsize_metrics::{
    WindowEvaluator, aggregate, capped_observed_duration, monitoring_start_time,
};
use rightsize_tunables::{DependencyGraph, TunableSpec};

use crate::error::EngineResult;
use crate::recommendation::{
    ContainerInput, ContainerRecommendation, Notification, TermRecommendation,
    TunableRecommendation,
};

/// Shared, read-only evaluation pipeline. Safe to use from many threads.
#[derive(Debug)]
pub struct RecommendationEngine {
    config: RightsizeConfig,
    registry: LayerRegistry,
    window: WindowEvaluator,
}

impl RecommendationEngine {
    pub fn new(config: RightsizeConfig, registry: LayerRegistry) -> Self {
        let window = WindowEvaluator::new(config.window.clone());
        Self {
            config,
            registry,
            window,
        }
    }

    /// Engine over the built-in layers with the config's metadata
    /// overrides applied.
    pub fn from_config(config: RightsizeConfig) -> EngineResult<Self> {
        let registry = LayerRegistry::from_config(&config.layers)?;
        Ok(Self::new(config, registry))
    }

    pub fn config(&self) -> &RightsizeConfig {
        &self.config
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Processing order over every tunable of the named layers, in the
    /// configured precedence.
    pub fn tunable_order<S: AsRef<str>>(&self, layers: &[S]) -> EngineResult<Vec<TunableSpec>> {
        let metadata = self.registry.metadata_for(layers)?;
        let graph = DependencyGraph::from_layers(metadata)?;
        let order = graph.resolve_with(self.config.engine.order)?;
        debug!(
            tunables = order.len(),
            edges = graph.edge_count(),
            order = ?self.config.engine.order,
            "tunable order resolved"
        );
        Ok(order)
    }

    /// Evaluate every configured term for one container.
    pub fn evaluate(
        &self,
        input: &ContainerInput,
        monitoring_end_time: DateTime<Utc>,
    ) -> EngineResult<ContainerRecommendation> {
        let order = self.tunable_order(input.layers.as_slice())?;
        let results = index_results(input.results.iter().cloned());

        let mut terms = Vec::with_capacity(self.config.terms.len());
        for term in &self.config.terms {
            let outcome = self.evaluate_term(input, &results, term, monitoring_end_time, &order)?;
            terms.push(outcome);
        }

        let available = terms.iter().filter(|t| t.is_available()).count();
        info!(
            container = %input.container_name,
            terms = terms.len(),
            available,
            "container evaluated"
        );

        Ok(ContainerRecommendation {
            container_name: input.container_name.clone(),
            monitoring_end_time,
            tunable_order: order,
            terms,
        })
    }

    fn evaluate_term(
        &self,
        input: &ContainerInput,
        results: &ContainerResults,
        term: &Term,
        end: DateTime<Utc>,
        order: &[TunableSpec],
    ) -> EngineResult<TermRecommendation> {
        let start = monitoring_start_time(Some(end), term.duration_in_days);
        let measurement = self.config.window.measurement_duration_minutes;

        let start = match start {
            Some(start) if self.window.has_minimum_data(results, term, end, measurement) => start,
            _ => {
                info!(
                    container = %input.container_name,
                    term = %term.name,
                    "not enough data, skipping term"
                );
                return Ok(TermRecommendation::skipped(term.name, start, end));
            }
        };

        let metrics = aggregate(results, term, start, end);
        let duration_in_hours = capped_observed_duration(results, term.name.as_str())?;

        let (tunables, env) = self.dispatch(&input.context, &metrics, order)?;
        debug!(
            container = %input.container_name,
            term = %term.name,
            duration_in_hours,
            tunables = tunables.len(),
            env_vars = env.len(),
            "term recommended"
        );

        Ok(TermRecommendation {
            term: term.name,
            monitoring_start_time: Some(start),
            monitoring_end_time: end,
            duration_in_hours,
            notifications: vec![Notification::recommendations_available()],
            tunables,
            env,
            metrics: Some(metrics),
        })
    }

    /// Run every ordered tunable through its layer. Returns the decided
    /// values and the merged environment variables.
    fn dispatch(
        &self,
        context: &ContainerContext,
        metrics: &AggregatedMetrics,
        order: &[TunableSpec],
    ) -> EngineResult<(Vec<TunableRecommendation>, Vec<EnvVar>)> {
        let mut resolved = ResolvedValues::new(context.clone());
        let mut tunables = Vec::new();
        let mut fragments = Vec::new();

        for spec in order {
            let value = self.registry.recommend(spec, &resolved, metrics)?;
            fragments.extend(self.registry.format(spec, value.as_ref(), &resolved)?);
            match value {
                Some(value) => {
                    tunables.push(TunableRecommendation {
                        layer: spec.layer_name().to_string(),
                        tunable: spec.tunable_name().to_string(),
                        value: value.clone(),
                    });
                    resolved.insert(spec.clone(), value);
                }
                None => debug!(tunable = %spec, "layer has no opinion"),
            }
        }

        Ok((tunables, merge_fragments(&fragments)))
    }
}

/// Latest interval end across all inputs; the default monitoring end.
pub fn latest_interval_end(inputs: &[ContainerInput]) -> Option<DateTime<Utc>> {
    inputs
        .iter()
        .filter_map(ContainerInput::latest_interval_end)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use chrono::TimeDelta;
    use rightsize_core::{
        IntervalResult, MetricAggregation, MetricName, ResolveOrder, TermName, WindowConfig,
    };
    use rightsize_layers::{LayerError, TunableValue};
    use std::collections::HashMap;

    fn end_time() -> DateTime<Utc> {
        "2024-03-10T12:00:00Z".parse().unwrap()
    }

    fn make_result(end: DateTime<Utc>, cpu: f64, memory: f64) -> IntervalResult {
        let agg = |v: f64| MetricAggregation {
            avg: Some(v),
            max: Some(v),
            min: Some(v),
            sum: Some(v),
            count: Some(1),
            format: None,
        };
        IntervalResult {
            interval_start: None,
            interval_end: end,
            duration_in_minutes: 15.0,
            metrics: HashMap::from([
                (MetricName::CpuUsage, agg(cpu)),
                (MetricName::MemoryUsage, agg(memory)),
            ]),
        }
    }

    /// `hours` of 15-minute samples ending at `end_time()`.
    fn test_input(layers: &[&str], hours: i64) -> ContainerInput {
        ContainerInput {
            container_name: "tfb-server".to_string(),
            layers: layers.iter().map(|l| l.to_string()).collect(),
            context: ContainerContext::default(),
            results: (0..hours * 4)
                .map(|i| make_result(end_time() - TimeDelta::minutes(15 * i), 0.5, 1.0e8))
                .collect(),
        }
    }

    fn test_engine() -> RecommendationEngine {
        RecommendationEngine::from_config(RightsizeConfig::default()).unwrap()
    }

    #[test]
    fn short_term_recommended_longer_terms_skipped() {
        let engine = test_engine();
        let rec = engine.evaluate(&test_input(&["container"], 24), end_time()).unwrap();

        let short = rec.term(TermName::Short).unwrap();
        assert!(short.is_available());
        assert_eq!(short.duration_in_hours, 24.0);
        assert_eq!(short.tunable("container", "cpuLimit"), Some(&TunableValue::Number(0.5)));
        assert!(short.env.is_empty());

        for name in [TermName::Medium, TermName::Long] {
            let term = rec.term(name).unwrap();
            assert!(!term.is_available());
            assert_eq!(term.notifications[0].code, Notification::NOT_ENOUGH_DATA);
            assert!(term.tunables.is_empty());
        }
    }

    #[test]
    fn no_results_skips_every_term() {
        let engine = test_engine();
        let rec = engine.evaluate(&test_input(&["container"], 0), end_time()).unwrap();
        assert_eq!(rec.terms.len(), 3);
        assert!(rec.terms.iter().all(|t| !t.is_available()));
    }

    #[test]
    fn unknown_layer_fails() {
        let engine = test_engine();
        let err = engine
            .evaluate(&test_input(&["container", "wildfly"], 1), end_time())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Layer(LayerError::Unknown(ref name)) if name == "wildfly"
        ));
    }

    #[test]
    fn configured_order_is_applied() {
        let mut config = RightsizeConfig::default();
        config.engine.order = ResolveOrder::DependenciesFirst;
        let engine = RecommendationEngine::from_config(config).unwrap();
        let order = engine.tunable_order(&["container", "quarkus"][..]).unwrap();
        let position = |tunable: &str| order.iter().position(|s| s.tunable_name() == tunable);
        assert!(position("cpuLimit") < position("quarkus.thread-pool.core-threads"));

        let order = test_engine().tunable_order(&["container", "quarkus"][..]).unwrap();
        let position = |tunable: &str| order.iter().position(|s| s.tunable_name() == tunable);
        assert!(position("cpuLimit") > position("quarkus.thread-pool.core-threads"));
    }

    #[test]
    fn invalid_measurement_duration_skips_instead_of_failing() {
        let config = RightsizeConfig {
            window: WindowConfig {
                measurement_duration_minutes: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = RecommendationEngine::new(config, LayerRegistry::builtin());
        let rec = engine.evaluate(&test_input(&["container"], 24), end_time()).unwrap();
        assert!(rec.terms.iter().all(|t| !t.is_available()));
    }

    #[test]
    fn latest_end_across_inputs() {
        let a = test_input(&[], 1);
        let mut b = test_input(&[], 1);
        b.results
            .push(make_result(end_time() + TimeDelta::hours(2), 0.1, 1.0));
        assert_eq!(
            latest_interval_end(&[a, b]),
            Some(end_time() + TimeDelta::hours(2))
        );
        assert_eq!(latest_interval_end(&[]), None);
    }

    #[test]
    fn empty_layer_list_yields_no_tunables() {
        let engine = test_engine();
        let rec = engine.evaluate(&test_input(&[], 24), end_time()).unwrap();
        assert!(rec.tunable_order.is_empty());
        let short = rec.term(TermName::Short).unwrap();
        assert!(short.is_available());
        assert!(short.tunables.is_empty());
        assert!(short.metrics.is_some());
    }
}
