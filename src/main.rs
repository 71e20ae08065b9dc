//! Harvester - player record ingestion jobs
//!
//! One binary, several jobs; a command-line switch selects which one runs.
//! The harvest job polls the upstream player API and republishes filtered
//! records onto the Kafka `player` topic.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harvester::config::Config;
use harvester::harvest;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "harvester.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    job: Job,
}

#[derive(Subcommand, Debug)]
enum Job {
    /// Run the player ingestion pipeline (upstream API -> Kafka)
    Harvest,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so config env overrides see it
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("starting harvester v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    match args.job {
        Job::Harvest => harvest::pipeline::run(config).await,
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "harvester=debug,info"
    } else {
        "harvester=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration from file with fallback to env-only defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
    } else {
        warn!("config file '{}' not found, using defaults + environment", path);
        Config::with_env_overrides()
    }
}
