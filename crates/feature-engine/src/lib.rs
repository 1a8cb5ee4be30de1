//! Feature Engineering Engine
//!
//! Derives per-unit rolling means and first differences for the key sensor
//! channels. Training and serving both go through [`FeatureEngine`] so the
//! two paths cannot drift apart; they differ only in the [`NullPolicy`].

mod config;
mod features;
mod policy;
mod statistics;

pub use config::{FeatureConfig, KeySensorSet, DEFAULT_KEY_SENSORS, DEFAULT_WINDOWS};
pub use features::{FeatureEngine, FeatureTable};
pub use policy::NullPolicy;
pub use statistics::{backfill, first_difference, rolling_mean};

use thiserror::Error;

/// Errors during feature derivation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Unknown sensor channel: {0}")]
    UnknownChannel(String),
    #[error("Key sensor set must not be empty")]
    EmptyKeySensors,
    #[error("Invalid window size {0}: must be at least 1")]
    InvalidWindow(usize),
    #[error("Input not ordered by (unit_id, cycle) at row {index}")]
    UnorderedInput { index: usize },
}
