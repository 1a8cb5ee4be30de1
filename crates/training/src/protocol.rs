//! Training Protocol

use crate::evaluation::rmse;
use crate::labeling::{attach_rul_labels, MAX_RUL};
use crate::split::{split_by_unit, DEFAULT_SPLIT_UNIT};
use crate::TrainingError;
use feature_engine::{FeatureConfig, FeatureEngine, FeatureTable, NullPolicy};
use inference_engine::{BoostedModel, GradientBoostedTrees, RulModel, RulRegressor, TrainedArtifact};
use ndarray::{Array1, Array2};
use sensor_frame::RawReading;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub features: FeatureConfig,
    /// Target ceiling (default: 125)
    pub max_rul: u32,
    /// Last unit id of the training split (default: 80)
    pub last_train_unit: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            max_rul: MAX_RUL,
            last_train_unit: DEFAULT_SPLIT_UNIT,
        }
    }
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport<M = BoostedModel> {
    pub artifact: TrainedArtifact<M>,
    pub train_rows: usize,
    pub validation_rows: usize,
    /// `None` when the validation split is empty
    pub validation_rmse: Option<f64>,
}

/// Runs feature engineering, labeling, the unit split, the fit and the
/// validation pass
pub struct TrainingProtocol<R = GradientBoostedTrees> {
    config: TrainingConfig,
    engine: FeatureEngine,
    regressor: R,
}

impl TrainingProtocol<GradientBoostedTrees> {
    /// Protocol with the default booster
    pub fn new(config: TrainingConfig) -> Result<Self, TrainingError> {
        Self::with_regressor(config, GradientBoostedTrees::default())
    }
}

impl<R: RulRegressor> TrainingProtocol<R> {
    pub fn with_regressor(config: TrainingConfig, regressor: R) -> Result<Self, TrainingError> {
        let engine = FeatureEngine::new(config.features.clone())?;
        Ok(Self {
            config,
            engine,
            regressor,
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on readings ordered by (unit_id, cycle)
    pub fn run(&self, readings: &[RawReading]) -> Result<TrainingReport<R::Model>, TrainingError> {
        let table = self.engine.engineer(readings, NullPolicy::training())?;
        let labels = attach_rul_labels(&table, readings, self.config.max_rul);
        let split = split_by_unit(&table, self.config.last_train_unit);

        info!(
            "Training rows: {} | Validation rows: {} | Features: {}",
            split.train.len(),
            split.validation.len(),
            table.columns().len()
        );

        if split.train.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }

        let x_train = feature_matrix(&table, &split.train);
        let y_train = Array1::from_vec(select_labels(&labels, &split.train));
        let model = self.regressor.fit(x_train.view(), y_train.view())?;

        let validation_rmse = if split.validation.is_empty() {
            warn!("Validation split is empty; skipping evaluation");
            None
        } else {
            let x_val = feature_matrix(&table, &split.validation);
            let y_val = select_labels(&labels, &split.validation);
            let predictions = model.predict_batch(x_val.view())?;
            let score = rmse(&y_val, &predictions);
            if let Some(score) = score {
                info!("Validation RMSE: {:.2} cycles", score);
            }
            score
        };

        let base_sensor_list = self.config.features.key_sensors.channels().to_vec();
        let artifact = TrainedArtifact::new(model, table.columns().to_vec(), base_sensor_list)?;

        Ok(TrainingReport {
            artifact,
            train_rows: split.train.len(),
            validation_rows: split.validation.len(),
            validation_rmse,
        })
    }
}

/// Dense matrix of the given rows; nulls become NaN
pub fn feature_matrix(table: &FeatureTable, rows: &[usize]) -> Array2<f64> {
    let width = table.columns().len();
    Array2::from_shape_fn((rows.len(), width), |(i, j)| {
        table.row(rows[i])[j].unwrap_or(f64::NAN)
    })
}

fn select_labels(labels: &[f64], rows: &[usize]) -> Vec<f64> {
    rows.iter().map(|&i| labels[i]).collect()
}
