//! Validation Error Types

use std::collections::BTreeSet;
use thiserror::Error;

/// Errors while validating an inference row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required feature columns absent from the row
    #[error("Missing features in request: {}", format_feature_set(.0))]
    MissingFeatures(BTreeSet<String>),

    /// Value present but not a number
    #[error("Feature {feature} has non-numeric value {value}")]
    NonNumeric { feature: String, value: String },
}

/// Render a feature set as `{'a', 'b'}`
pub fn format_feature_set(names: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("{{{}}}", quoted.join(", "))
}
