//! RUL Inference Engine
//!
//! Boosted-tree regressor, the trained artifact it ships in and the
//! request/response contract used by serving.

mod artifact;
mod boosting;
mod engine;
mod model;
mod payload;

pub use artifact::{ArtifactError, TrainedArtifact, ARTIFACT_FORMAT_VERSION};
pub use boosting::{BoostedModel, BoostingParams, GradientBoostedTrees, Objective, RegressionTree};
pub use engine::{InferenceEngine, Prediction, SUCCESS_DETAIL};
pub use model::{ModelError, RulModel, RulRegressor};
pub use payload::{PredictRequest, PredictionPayload};

use data_validator::format_feature_set;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// Request row lacks columns the model was trained on
    #[error("Missing features in request: {}", format_feature_set(.0))]
    MissingFeatures(BTreeSet<String>),
    /// Anything else that went wrong after validation
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl InferenceError {
    /// Whether the caller sent a malformed request
    pub fn is_client_error(&self) -> bool {
        matches!(self, InferenceError::MissingFeatures(_))
    }
}
