//! Wire Payloads for the Prediction Endpoint

use crate::engine::Prediction;
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// One feature row keyed by column name
    pub data: Map<String, Value>,
}

/// Response body for a handled prediction request.
///
/// Business failures still travel inside a successful HTTP response as the
/// `Failure` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionPayload {
    Success {
        /// Estimate rounded to two decimals
        rul_predito: f64,
        status: String,
        detalhes: String,
    },
    Failure {
        erro: String,
    },
}

impl PredictionPayload {
    pub fn failure(err: &InferenceError) -> Self {
        PredictionPayload::Failure {
            erro: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionPayload::Success { .. })
    }
}

impl From<&Prediction> for PredictionPayload {
    fn from(prediction: &Prediction) -> Self {
        PredictionPayload::Success {
            rul_predito: round2(prediction.rul_estimate),
            status: prediction.status.as_str().to_string(),
            detalhes: prediction.message.clone(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SUCCESS_DETAIL;
    use alerting::RiskStatus;
    use proptest::prelude::*;
    use serde_json::json;

    fn prediction(rul_estimate: f64, status: RiskStatus) -> Prediction {
        Prediction {
            rul_estimate,
            status,
            message: SUCCESS_DETAIL.to_string(),
            latency_us: 12,
        }
    }

    #[test]
    fn test_success_shape() {
        let payload = PredictionPayload::from(&prediction(37.456, RiskStatus::Alert));
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            json!({
                "rul_predito": 37.46,
                "status": "Alert: maintenance approaching",
                "detalhes": "Prediction completed successfully"
            })
        );
    }

    #[test]
    fn test_failure_shape() {
        let payload = PredictionPayload::failure(&InferenceError::PredictionFailed(
            "Model produced a non-finite estimate".into(),
        ));
        assert!(!payload.is_success());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"erro": "Prediction failed: Model produced a non-finite estimate"})
        );
    }

    #[test]
    fn test_untagged_decode() {
        let success: PredictionPayload = serde_json::from_value(json!({
            "rul_predito": 112.0, "status": "Normal", "detalhes": "ok"
        }))
        .unwrap();
        assert!(success.is_success());

        let failure: PredictionPayload =
            serde_json::from_value(json!({"erro": "Prediction failed: x"})).unwrap();
        assert!(matches!(failure, PredictionPayload::Failure { .. }));
    }

    #[test]
    fn test_request_requires_data_key() {
        let request: PredictRequest =
            serde_json::from_value(json!({"data": {"s_2": 642.1, "unit_id": 1}})).unwrap();
        assert_eq!(request.data.len(), 2);

        assert!(serde_json::from_value::<PredictRequest>(json!({"s_2": 642.1})).is_err());
    }

    proptest! {
        #[test]
        fn prop_rounding_within_half_cent(estimate in -10.0f64..200.0) {
            match PredictionPayload::from(&prediction(estimate, RiskStatus::Normal)) {
                PredictionPayload::Success { rul_predito, .. } => {
                    prop_assert!((rul_predito - estimate).abs() <= 0.005 + 1e-9);
                }
                PredictionPayload::Failure { .. } => prop_assert!(false),
            }
        }
    }
}
