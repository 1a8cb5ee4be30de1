//! Replay Client Configuration

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Known unit id range of the test set
pub const UNIT_RANGE: (u32, u32) = (1, 100);

/// Allowed pacing interval (seconds)
pub const INTERVAL_RANGE: (f64, f64) = (0.1, 2.0);

/// Errors while loading or validating replay settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unit {0} outside {min}..={max}", min = UNIT_RANGE.0, max = UNIT_RANGE.1)]
    UnitOutOfRange(u32),
    #[error("Interval {0}s outside {min}..={max}s", min = INTERVAL_RANGE.0, max = INTERVAL_RANGE.1)]
    IntervalOutOfRange(f64),
    #[error("Request timeout must be positive, got {0}s")]
    InvalidTimeout(f64),
    #[error("API URL must be http(s): {0}")]
    InvalidUrl(String),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Replay client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Unit to replay (default: 1)
    pub unit_id: u32,
    /// Pause between calls in seconds (default: 0.2)
    pub interval_secs: f64,
    /// Prediction endpoint; `API_URL` overrides it
    pub api_url: String,
    /// Per-call timeout in seconds (default: 2.0)
    pub request_timeout_secs: f64,
    /// Raw test file (default: test_FD001.txt)
    pub test_data: PathBuf,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            unit_id: 1,
            interval_secs: 0.2,
            api_url: "http://localhost:8000/predict".to_string(),
            request_timeout_secs: 2.0,
            test_data: PathBuf::from("test_FD001.txt"),
        }
    }
}

impl ReplayConfig {
    /// Layer defaults, an optional file (`rul-replay.toml` when none is
    /// given), `REPLAY_*` variables and finally `API_URL`
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("rul-replay").required(false),
        };

        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file_source)
            .add_source(Environment::with_prefix("REPLAY"))
            .set_override_option("api_url", std::env::var("API_URL").ok())?
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Check every bound
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(UNIT_RANGE.0..=UNIT_RANGE.1).contains(&self.unit_id) {
            return Err(ConfigError::UnitOutOfRange(self.unit_id));
        }
        if !(INTERVAL_RANGE.0..=INTERVAL_RANGE.1).contains(&self.interval_secs) {
            return Err(ConfigError::IntervalOutOfRange(self.interval_secs));
        }
        if !(self.request_timeout_secs.is_finite() && self.request_timeout_secs > 0.0) {
            return Err(ConfigError::InvalidTimeout(self.request_timeout_secs));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }
}
