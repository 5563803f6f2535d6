use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rightsize_engine::{
    ContainerInput, ContainerRecommendation, RecommendationEngine, latest_interval_end,
};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// Result for one container in a batch. A failed container does not stop
/// the others.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Recommended(ContainerRecommendation),
    Failed {
        container_name: String,
        error: String,
    },
}

pub async fn run(
    config: Option<&Path>,
    input: &Path,
    end_time: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let config = super::load_config(config)?;
    let inputs = load_inputs(input)?;

    let end_time = match end_time.or_else(|| latest_interval_end(&inputs)) {
        Some(end) => end,
        None => anyhow::bail!("no --end-time given and no interval results to infer it from"),
    };

    let concurrency = config.engine.concurrency;
    let engine = Arc::new(RecommendationEngine::from_config(config)?);
    info!(
        containers = inputs.len(),
        end = %end_time,
        concurrency,
        "evaluating containers"
    );

    let outcomes = evaluate_all(engine, inputs, end_time, concurrency).await?;
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}

fn load_inputs(path: &Path) -> anyhow::Result<Vec<ContainerInput>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading input from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing input from {}", path.display()))
}

/// Evaluate containers on the blocking pool, at most `concurrency` at a
/// time. Outcomes keep input order.
pub async fn evaluate_all(
    engine: Arc<RecommendationEngine>,
    inputs: Vec<ContainerInput>,
    end_time: DateTime<Utc>,
    concurrency: usize,
) -> anyhow::Result<Vec<BatchOutcome>> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(inputs.len());

    for input in inputs {
        let permit = semaphore.clone().acquire_owned().await?;
        let engine = engine.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            match engine.evaluate(&input, end_time) {
                Ok(rec) => BatchOutcome::Recommended(rec),
                Err(e) => {
                    error!(container = %input.container_name, error = %e, "evaluation failed");
                    BatchOutcome::Failed {
                        container_name: input.container_name,
                        error: e.to_string(),
                    }
                }
            }
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.context("evaluation task panicked")?);
    }
    Ok(outcomes)
}
