//! Transport to the Prediction Endpoint

use async_trait::async_trait;
use inference_engine::{PredictRequest, PredictionPayload};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Client-side failures reaching the prediction endpoint
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, timeout and other request failures
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unreadable response body: {0}")]
    InvalidBody(String),
}

/// One blocking prediction call per request
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictionPayload, TransportError>;
}

/// JSON over HTTP with a per-call timeout
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PredictionTransport for HttpTransport {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictionPayload, TransportError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response
            .json::<PredictionPayload>()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        debug!("Response from {}: {:?}", self.url, payload);
        Ok(payload)
    }
}
