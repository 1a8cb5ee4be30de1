//! Schema Validator for Inference Rows

use crate::error::ValidationError;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Validates rows against an ordered list of expected feature columns
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    expected: Vec<String>,
}

impl SchemaValidator {
    /// Create a validator for the given trained column order
    pub fn new(expected: Vec<String>) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Names from the schema that the row does not carry
    pub fn missing(&self, row: &Map<String, Value>) -> BTreeSet<String> {
        self.expected
            .iter()
            .filter(|name| !row.contains_key(name.as_str()))
            .cloned()
            .collect()
    }

    /// Check presence of every expected column
    pub fn check_presence(&self, row: &Map<String, Value>) -> Result<(), ValidationError> {
        let missing = self.missing(row);
        if missing.is_empty() {
            Ok(())
        } else {
            debug!("Row rejected: {} missing features", missing.len());
            Err(ValidationError::MissingFeatures(missing))
        }
    }

    /// Select expected columns in trained order; extra columns are ignored.
    ///
    /// JSON `null` becomes NaN, which the model treats as a missing value.
    pub fn select(&self, row: &Map<String, Value>) -> Result<Vec<f64>, ValidationError> {
        self.check_presence(row)?;
        self.expected
            .iter()
            .map(|name| match &row[name.as_str()] {
                Value::Null => Ok(f64::NAN),
                Value::Number(n) => n.as_f64().ok_or_else(|| non_numeric(name, &row[name.as_str()])),
                other => Err(non_numeric(name, other)),
            })
            .collect()
    }
}

fn non_numeric(feature: &str, value: &Value) -> ValidationError {
    ValidationError::NonNumeric {
        feature: feature.to_string(),
        value: value.to_string(),
    }
}
