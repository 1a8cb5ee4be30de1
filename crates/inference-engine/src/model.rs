//! Model capability traits

use ndarray::{ArrayView1, ArrayView2};
use thiserror::Error;

/// Errors raised by a regression model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("Training set is empty")]
    EmptyInput,
    #[error("Target has {target} values for {rows} rows")]
    TargetLength { rows: usize, target: usize },
    #[error("Non-finite target at row {0}")]
    NonFiniteTarget(usize),
    #[error("Model produced a non-finite estimate")]
    NonFiniteOutput,
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(String),
}

/// A fitted model mapping one feature row to a RUL estimate
pub trait RulModel {
    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    /// Estimate for one row, values in trained column order
    fn predict_row(&self, features: &[f64]) -> Result<f64, ModelError>;

    /// Estimates for every row of a matrix
    fn predict_batch(&self, rows: ArrayView2<'_, f64>) -> Result<Vec<f64>, ModelError> {
        rows.outer_iter()
            .map(|row| match row.as_slice() {
                Some(values) => self.predict_row(values),
                None => self.predict_row(&row.to_vec()),
            })
            .collect()
    }
}

/// A learning algorithm producing a [`RulModel`]
pub trait RulRegressor {
    type Model: RulModel;

    fn fit(
        &self,
        features: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
    ) -> Result<Self::Model, ModelError>;
}
