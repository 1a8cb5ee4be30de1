//! RUL Training Pipeline
//!
//! Labels engineered rows with clipped remaining useful life, splits them by
//! unit, fits the boosted-tree regressor and scores held-out data.

mod evaluation;
mod labeling;
mod protocol;
mod split;

pub use evaluation::{evaluate_last_cycles, rmse, EvaluationReport};
pub use labeling::{attach_rul_labels, last_cycles, rul_labels, MAX_RUL};
pub use protocol::{feature_matrix, TrainingConfig, TrainingProtocol, TrainingReport};
pub use split::{split_by_unit, UnitSplit, DEFAULT_SPLIT_UNIT};

use feature_engine::FeatureError;
use inference_engine::{ArtifactError, ModelError};
use sensor_frame::FrameError;
use thiserror::Error;

/// Errors during a training or evaluation run
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Failed to read data: {0}")]
    Frame(#[from] FrameError),
    #[error("Feature engineering failed: {0}")]
    Feature(#[from] FeatureError),
    #[error("Training split is empty after feature engineering")]
    EmptyTrainingSet,
    #[error("Model fit failed: {0}")]
    Model(#[from] ModelError),
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Ground truth has {truth} values but unit {unit} was requested")]
    GroundTruthMismatch { unit: u32, truth: usize },
}
