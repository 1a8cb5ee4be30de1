//! RUL Prediction API - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServerConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rul-api", version, about = "Serve RUL predictions over HTTP")]
struct Cli {
    /// Config file (defaults to ./rul-api.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, overrides the config file
    #[arg(long)]
    bind: Option<String>,
    /// Trained artifact path, overrides the config file
    #[arg(long)]
    artifact: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref()).context("loading server config")?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(artifact) = cli.artifact {
        config.artifact_path = artifact;
    }

    info!("=== RUL Prediction API v{} ===", env!("CARGO_PKG_VERSION"));
    run_server(config).await
}
