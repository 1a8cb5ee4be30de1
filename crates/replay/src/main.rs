//! RUL Replay - Main Entry Point

use anyhow::{bail, Context, Result};
use clap::Parser;
use feature_engine::{FeatureEngine, NullPolicy};
use replay::{unit_requests, HttpTransport, ReplayConfig, ReplayMonitor, ReplayState};
use sensor_frame::load_readings;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rul-replay", version, about = "Replay a test unit against the RUL API")]
struct Cli {
    /// Config file (defaults to ./rul-replay.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Unit to replay
    #[arg(long)]
    unit: Option<u32>,
    /// Seconds between calls
    #[arg(long)]
    interval: Option<f64>,
    /// Prediction endpoint URL
    #[arg(long)]
    api_url: Option<String>,
    /// Raw test file
    #[arg(long)]
    test_data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = ReplayConfig::load(cli.config.as_deref())?;
    if let Some(unit) = cli.unit {
        config.unit_id = unit;
    }
    if let Some(interval) = cli.interval {
        config.interval_secs = interval;
    }
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.test_data {
        config.test_data = path;
    }
    config.validate()?;

    let readings = load_readings(&config.test_data)
        .with_context(|| format!("loading {}", config.test_data.display()))?;
    let table = FeatureEngine::default().engineer(&readings, NullPolicy::serving())?;
    let requests = unit_requests(&table, config.unit_id);

    let transport = HttpTransport::new(config.api_url.clone(), config.request_timeout())?;
    info!("Target endpoint: {}", transport.url());
    let mut monitor = ReplayMonitor::new(transport, config.interval());

    let state = monitor.start(config.unit_id, &requests).await.clone();
    match state {
        ReplayState::Aborted { cycle, reason } => {
            bail!("unit {} aborted at cycle {}: {}", config.unit_id, cycle, reason)
        }
        _ => {
            if let Some(current) = monitor.current() {
                info!(
                    "Final cycle {}: RUL {:.2} ({})",
                    current.cycle, current.rul_estimate, current.status
                );
            }
            Ok(())
        }
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
