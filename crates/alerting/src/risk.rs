//! Risk Band Classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Operator-facing risk band for a RUL estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskStatus {
    /// Comfortable margin before failure
    Normal,
    /// Maintenance approaching
    Alert,
    /// Imminent failure
    Danger,
}

impl RiskStatus {
    /// Wire label carried in prediction responses
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::Normal => "Normal",
            RiskStatus::Alert => "Alert: maintenance approaching",
            RiskStatus::Danger => "Danger: imminent failure",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status label that does not match any risk band
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown risk status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for RiskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [RiskStatus::Normal, RiskStatus::Alert, RiskStatus::Danger]
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Band boundaries on the clipped RUL scale (cycles)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Estimates below this are at least `Alert` (default: 50)
    pub alert_below: f64,
    /// Estimates below this are `Danger` (default: 20)
    pub danger_below: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            alert_below: 50.0,
            danger_below: 20.0,
        }
    }
}

/// Classifies RUL estimates into risk bands
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// `>= alert_below` is Normal, `[danger_below, alert_below)` is Alert,
    /// everything lower is Danger
    pub fn classify(&self, rul_estimate: f64) -> RiskStatus {
        let status = if rul_estimate < self.thresholds.danger_below {
            RiskStatus::Danger
        } else if rul_estimate < self.thresholds.alert_below {
            RiskStatus::Alert
        } else {
            RiskStatus::Normal
        };
        debug!("RUL {:.2} classified as {:?}", rul_estimate, status);
        status
    }
}
