//! Prediction Route

use axum::{extract::State, Json};
use inference_engine::{PredictRequest, PredictionPayload};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::{ApiError, AppState};

/// Score one feature row.
///
/// Missing features are rejected with 400. Any other failure is reported in
/// the payload of a 200 response.
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionPayload>, ApiError> {
    match state.engine.predict(&request.data) {
        Ok(prediction) => {
            counter!("rul_predictions_total").increment(1);
            debug!(
                "RUL {:.2} ({}) in {}us",
                prediction.rul_estimate, prediction.status, prediction.latency_us
            );
            Ok(Json(PredictionPayload::from(&prediction)))
        }
        Err(err) if err.is_client_error() => {
            counter!("rul_validation_failures_total").increment(1);
            warn!("Rejected request: {}", err);
            Err(ApiError::from(err))
        }
        Err(err) => {
            counter!("rul_prediction_failures_total").increment(1);
            error!("Prediction error: {}", err);
            Ok(Json(PredictionPayload::failure(&err)))
        }
    }
}
