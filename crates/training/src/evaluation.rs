//! Offline Scoring

use crate::TrainingError;
use feature_engine::{FeatureError, FeatureTable};
use inference_engine::{RulModel, TrainedArtifact};
use ndarray::Array2;
use tracing::{debug, info};

/// Root mean squared error; `None` for empty or mismatched inputs
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Some((sum / actual.len() as f64).sqrt())
}

/// Result of scoring the last observed cycle of every test unit
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// (unit_id, clipped true RUL, estimate) per unit
    pub units: Vec<(u32, f64, f64)>,
    pub rmse: Option<f64>,
}

/// Predict the final row of each unit and compare against ground truth.
///
/// `truth[k]` is the RUL of unit `k + 1`; it is clipped to `max_rul` the same
/// way training labels are.
pub fn evaluate_last_cycles<M: RulModel>(
    artifact: &TrainedArtifact<M>,
    table: &FeatureTable,
    truth: &[u32],
    max_rul: u32,
) -> Result<EvaluationReport, TrainingError> {
    let indices = artifact
        .expected_feature_columns()
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| FeatureError::UnknownChannel(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut last_rows: Vec<usize> = Vec::new();
    for i in 0..table.len() {
        match last_rows.last_mut() {
            Some(last) if table.unit_id(*last) == table.unit_id(i) => *last = i,
            _ => last_rows.push(i),
        }
    }

    let matrix = Array2::from_shape_fn((last_rows.len(), indices.len()), |(r, c)| {
        table.row(last_rows[r])[indices[c]].unwrap_or(f64::NAN)
    });
    let predictions = artifact.model().predict_batch(matrix.view())?;

    let mut units = Vec::with_capacity(last_rows.len());
    for (&row, &estimate) in last_rows.iter().zip(&predictions) {
        let unit = table.unit_id(row);
        let actual = (unit as usize)
            .checked_sub(1)
            .and_then(|k| truth.get(k))
            .ok_or(TrainingError::GroundTruthMismatch {
                unit,
                truth: truth.len(),
            })?;
        debug!(
            "Unit {} cycle {}: true RUL {} estimate {:.2}",
            unit,
            table.cycle(row),
            actual,
            estimate
        );
        units.push((unit, (*actual).min(max_rul) as f64, estimate));
    }

    let actual: Vec<f64> = units.iter().map(|u| u.1).collect();
    let score = rmse(&actual, &predictions);
    if let Some(score) = score {
        info!("Test RMSE over {} units: {:.2} cycles", units.len(), score);
    }
    Ok(EvaluationReport { units, rmse: score })
}
