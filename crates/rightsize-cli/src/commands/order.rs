use std::path::Path;

use rightsize_core::ResolveOrder;
use rightsize_engine::RecommendationEngine;
use rightsize_tunables::TunableSpec;

pub fn run(
    config: Option<&Path>,
    layers: &[String],
    order: Option<ResolveOrder>,
) -> anyhow::Result<()> {
    for spec in resolve(config, layers, order)? {
        println!("{spec}");
    }
    Ok(())
}

fn resolve(
    config: Option<&Path>,
    layers: &[String],
    order: Option<ResolveOrder>,
) -> anyhow::Result<Vec<TunableSpec>> {
    let mut config = super::load_config(config)?;
    if let Some(order) = order {
        config.engine.order = order;
    }
    let engine = RecommendationEngine::from_config(config)?;
    Ok(engine.tunable_order(layers)?)
}
