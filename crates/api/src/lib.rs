//! RUL Prediction API Server
//!
//! Serves one immutable trained artifact over HTTP: a health probe at `/`
//! and single-row predictions at `/predict`.

use axum::{
    routing::{get, post},
    Router,
};
use inference_engine::{ArtifactError, InferenceEngine, TrainedArtifact};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod error;
mod routes;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::health::HealthResponse;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated, so handlers share it through an
/// `Arc` without locking.
pub struct AppState {
    pub engine: InferenceEngine,
    /// Version string reported by the health endpoint
    pub model_version: String,
}

impl AppState {
    pub fn new(engine: InferenceEngine, model_version: impl Into<String>) -> Self {
        Self {
            engine,
            model_version: model_version.into(),
        }
    }

    /// Load the artifact from disk; failure here must stop startup
    pub fn load(artifact_path: &Path, model_version: &str) -> Result<Self, ArtifactError> {
        let artifact: TrainedArtifact = TrainedArtifact::load(artifact_path)?;
        Ok(Self::new(InferenceEngine::new(artifact), model_version))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health::health_handler))
        .route("/predict", post(routes::predict::predict_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Initialize logging
pub fn init_logging() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

/// Load the artifact and serve until the listener fails
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::load(&config.artifact_path, &config.model_version)?;
    info!(
        "Model {} ready with {} features",
        state.model_version,
        state.engine.expected_features().len()
    );
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
