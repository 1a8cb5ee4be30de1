//! Alerting System
//!
//! Maps a remaining-useful-life estimate onto an operator-facing risk band.

mod risk;

pub use risk::{RiskClassifier, RiskStatus, RiskThresholds, UnknownStatus};
