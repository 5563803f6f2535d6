//! rightsize — container and runtime tuning recommendations.
//!
//! # Usage
//!
//! ```text
//! rightsize recommend --config rightsize.toml --input containers.json
//! rightsize order --layers container,hotspot,quarkus --order dependencies_first
//! rightsize terms
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rightsize_core::ResolveOrder;

mod commands;

const DEFAULT_LOG_FILTER: &str = "info,rightsize=debug";

#[derive(Parser)]
#[command(
    name = "rightsize",
    about = "Resource and runtime tuning recommendations for containers",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every container in an input file and print recommendations.
    Recommend {
        /// Configuration file (built-in defaults when omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON array of containers with their interval results.
        #[arg(short, long)]
        input: PathBuf,
        /// Monitoring end time, RFC 3339. Defaults to the latest interval
        /// end across all inputs.
        #[arg(long)]
        end_time: Option<DateTime<Utc>>,
    },
    /// Print the processing order of the given layers' tunables.
    Order {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated layer names.
        #[arg(short, long, value_delimiter = ',', required = true)]
        layers: Vec<String>,
        /// dependents_first or dependencies_first; overrides the config.
        #[arg(long)]
        order: Option<ResolveOrder>,
    },
    /// Print the effective term table.
    Terms {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Recommend {
            config,
            input,
            end_time,
        } => commands::recommend::run(config.as_deref(), &input, end_time).await,
        Commands::Order {
            config,
            layers,
            order,
        } => commands::order::run(config.as_deref(), &layers, order),
        Commands::Terms { config } => commands::terms::run(config.as_deref()),
    }
}
