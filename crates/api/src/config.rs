//! Server Configuration

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:8000)
    pub bind_addr: String,
    /// Trained artifact loaded at startup (default: model_v1.bin)
    pub artifact_path: PathBuf,
    /// Version reported by the health endpoint
    pub model_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            artifact_path: PathBuf::from("model_v1.bin"),
            model_version: "v1".to_string(),
        }
    }
}

impl ServerConfig {
    /// Layer defaults, an optional config file and `RUL_*` environment
    /// variables, in that order.
    ///
    /// Without an explicit file, `rul-api.toml` in the working directory is
    /// read when present.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("rul-api").required(false),
        };

        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file_source)
            .add_source(Environment::with_prefix("RUL"))
            .build()?
            .try_deserialize()?;

        info!(
            "Server config: bind {} artifact {}",
            config.bind_addr,
            config.artifact_path.display()
        );
        Ok(config)
    }
}
