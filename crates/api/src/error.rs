//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::InferenceError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to the caller as a non-2xx response
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(InferenceError),
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::BadRequest(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::BadRequest(err) = self;
        let missing: Vec<String> = match &err {
            InferenceError::MissingFeatures(names) => names.iter().cloned().collect(),
            InferenceError::PredictionFailed(_) => Vec::new(),
        };
        let body = json!({
            "detail": err.to_string(),
            "missing": missing,
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
