//! Inference Engine Implementation

use crate::artifact::TrainedArtifact;
use crate::boosting::BoostedModel;
use crate::model::RulModel;
use crate::InferenceError;
use alerting::{RiskClassifier, RiskStatus, RiskThresholds};
use data_validator::{SchemaValidator, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Detail text attached to successful predictions
pub const SUCCESS_DETAIL: &str = "Prediction completed successfully";

/// Prediction result for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Estimated remaining useful life (cycles, clipped scale)
    pub rul_estimate: f64,
    /// Risk band for the estimate
    pub status: RiskStatus,
    pub message: String,
    /// Time spent inside the model (microseconds)
    pub latency_us: u64,
}

/// Serves predictions from an immutable trained artifact.
///
/// Holds no interior mutability, so a shared reference can be used from any
/// number of concurrent handlers.
pub struct InferenceEngine<M = BoostedModel> {
    artifact: TrainedArtifact<M>,
    validator: SchemaValidator,
    classifier: RiskClassifier,
}

impl<M: RulModel> InferenceEngine<M> {
    /// Create an engine with the default risk thresholds
    pub fn new(artifact: TrainedArtifact<M>) -> Self {
        Self::with_thresholds(artifact, RiskThresholds::default())
    }

    pub fn with_thresholds(artifact: TrainedArtifact<M>, thresholds: RiskThresholds) -> Self {
        let validator = SchemaValidator::new(artifact.expected_feature_columns().to_vec());
        Self {
            artifact,
            validator,
            classifier: RiskClassifier::new(thresholds),
        }
    }

    pub fn expected_features(&self) -> &[String] {
        self.validator.expected()
    }

    pub fn artifact(&self) -> &TrainedArtifact<M> {
        &self.artifact
    }

    /// Validate a feature row, run the model and classify the estimate.
    ///
    /// Missing columns are a caller error; anything failing after validation
    /// is reported as [`InferenceError::PredictionFailed`].
    pub fn predict(&self, row: &Map<String, Value>) -> Result<Prediction, InferenceError> {
        let start = std::time::Instant::now();

        let features = self.validator.select(row).map_err(|e| match e {
            ValidationError::MissingFeatures(missing) => InferenceError::MissingFeatures(missing),
            other => InferenceError::PredictionFailed(other.to_string()),
        })?;

        let rul_estimate = self.artifact.model().predict_row(&features).map_err(|e| {
            warn!("Model failed on request row: {}", e);
            InferenceError::PredictionFailed(e.to_string())
        })?;

        let status = self.classifier.classify(rul_estimate);
        let latency_us = start.elapsed().as_micros() as u64;
        debug!(
            "Predicted RUL {:.2} ({:?}) in {}us",
            rul_estimate, status, latency_us
        );

        Ok(Prediction {
            rul_estimate,
            status,
            message: SUCCESS_DETAIL.to_string(),
            latency_us,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use serde_json::json;

    /// Returns the first feature as the estimate
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct EchoModel {
        n_features: usize,
    }

    impl RulModel for EchoModel {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict_row(&self, features: &[f64]) -> Result<f64, ModelError> {
            let v = features[0];
            if v.is_finite() {
                Ok(v)
            } else {
                Err(ModelError::NonFiniteOutput)
            }
        }
    }

    fn engine() -> InferenceEngine<EchoModel> {
        let artifact = TrainedArtifact::new(
            EchoModel { n_features: 2 },
            vec!["s_2".to_string(), "s_9_rolling_5".to_string()],
            vec!["s_2".to_string(), "s_9".to_string()],
        )
        .unwrap();
        InferenceEngine::new(artifact)
    }

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_classification_thresholds() {
        let engine = engine();
        let cases = [
            (19.9, RiskStatus::Danger),
            (20.0, RiskStatus::Alert),
            (49.9, RiskStatus::Alert),
            (50.0, RiskStatus::Normal),
        ];
        for (estimate, expected) in cases {
            let prediction = engine
                .predict(&row(json!({"s_2": estimate, "s_9_rolling_5": 1.0})))
                .unwrap();
            assert_eq!(prediction.rul_estimate, estimate);
            assert_eq!(prediction.status, expected);
            assert_eq!(prediction.message, SUCCESS_DETAIL);
        }
    }

    #[test]
    fn test_missing_feature_named_exactly() {
        let err = engine()
            .predict(&row(json!({"s_2": 80.0, "unit_id": 1})))
            .unwrap_err();
        match err {
            InferenceError::MissingFeatures(missing) => {
                assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["s_9_rolling_5"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_columns_ignored() {
        let prediction = engine()
            .predict(&row(json!({"cycle": 3, "s_9_rolling_5": 2.0, "s_2": 75.0, "s_99": "x"})))
            .unwrap();
        assert_eq!(prediction.rul_estimate, 75.0);
        assert_eq!(prediction.status, RiskStatus::Normal);
    }

    #[test]
    fn test_model_failure_is_prediction_error() {
        let err = engine()
            .predict(&row(json!({"s_2": null, "s_9_rolling_5": 2.0})))
            .unwrap_err();
        assert!(matches!(err, InferenceError::PredictionFailed(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_non_numeric_is_prediction_error() {
        let err = engine()
            .predict(&row(json!({"s_2": "hot", "s_9_rolling_5": 2.0})))
            .unwrap_err();
        assert!(matches!(err, InferenceError::PredictionFailed(_)));
    }
}
