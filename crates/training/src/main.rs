//! RUL Training CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feature_engine::{FeatureEngine, NullPolicy};
use inference_engine::{BoostingParams, GradientBoostedTrees, TrainedArtifact};
use sensor_frame::{load_ground_truth, load_readings, RAW_COLUMN_COUNT};
use std::path::PathBuf;
use tracing::info;
use training::{evaluate_last_cycles, TrainingConfig, TrainingProtocol};

#[derive(Parser, Debug)]
#[command(name = "rul-train", version, about = "Train and score the turbofan RUL model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the model and write the artifact
    Train {
        /// Raw training file
        #[arg(long, default_value = "train_FD001.txt")]
        data: PathBuf,
        /// Artifact output path
        #[arg(long, default_value = "model_v1.bin")]
        output: PathBuf,
        /// Boosting rounds
        #[arg(long, default_value = "500")]
        n_estimators: usize,
        #[arg(long, default_value = "0.05")]
        learning_rate: f64,
        #[arg(long, default_value = "6")]
        max_depth: usize,
    },
    /// Check that the training and ground-truth files parse
    Verify {
        #[arg(long, default_value = "train_FD001.txt")]
        train: PathBuf,
        #[arg(long, default_value = "RUL_FD001.txt")]
        truth: PathBuf,
    },
    /// Score an artifact on the last cycle of every test unit
    Evaluate {
        #[arg(long, default_value = "model_v1.bin")]
        artifact: PathBuf,
        #[arg(long, default_value = "test_FD001.txt")]
        test: PathBuf,
        #[arg(long, default_value = "RUL_FD001.txt")]
        truth: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            data,
            output,
            n_estimators,
            learning_rate,
            max_depth,
        } => {
            info!("=== RUL training v{} ===", env!("CARGO_PKG_VERSION"));
            let readings = load_readings(&data)
                .with_context(|| format!("loading {}", data.display()))?;
            info!("Raw data loaded: {} rows x {} columns", readings.len(), RAW_COLUMN_COUNT);

            let booster = GradientBoostedTrees::new(BoostingParams {
                n_estimators,
                learning_rate,
                max_depth,
                ..Default::default()
            });
            let protocol = TrainingProtocol::with_regressor(TrainingConfig::default(), booster)?;
            let report = protocol.run(&readings)?;

            match report.validation_rmse {
                Some(rmse) => info!("Training finished, validation RMSE {:.2} cycles", rmse),
                None => info!("Training finished without a validation split"),
            }
            report.artifact.save(&output)?;
        }
        Command::Verify { train, truth } => {
            let readings = load_readings(&train)
                .with_context(|| format!("loading {}", train.display()))?;
            let units = readings.last().map(|r| r.unit_id).unwrap_or(0);
            info!(
                "Training file OK: {} rows x {} columns, {} units",
                readings.len(),
                RAW_COLUMN_COUNT,
                units
            );

            let rul = load_ground_truth(&truth)
                .with_context(|| format!("loading {}", truth.display()))?;
            info!(
                "Ground truth OK: {} values, first {:?}",
                rul.len(),
                &rul[..rul.len().min(3)]
            );
        }
        Command::Evaluate {
            artifact,
            test,
            truth,
        } => {
            let artifact: TrainedArtifact = TrainedArtifact::load(&artifact)?;
            let readings = load_readings(&test)
                .with_context(|| format!("loading {}", test.display()))?;
            let rul = load_ground_truth(&truth)
                .with_context(|| format!("loading {}", truth.display()))?;

            let config = TrainingConfig::default();
            let table = FeatureEngine::new(config.features)?.engineer(&readings, NullPolicy::serving())?;
            let report = evaluate_last_cycles(&artifact, &table, &rul, config.max_rul)?;
            match report.rmse {
                Some(rmse) => info!("Scored {} units, RMSE {:.2} cycles", report.units.len(), rmse),
                None => info!("No units to score"),
            }
        }
    }

    Ok(())
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
