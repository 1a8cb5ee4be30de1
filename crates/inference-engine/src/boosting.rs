//! Gradient-Boosted Regression Trees
//!
//! Histogram-based boosting with a squared-error objective. Each feature is
//! quantised into at most `max_bins` bins once per fit; bin 0 holds missing
//! (NaN) values, which always travel to the left child.

use crate::model::{ModelError, RulModel, RulRegressor};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Splits must improve the objective by more than this
const MIN_GAIN: f64 = 1e-12;

/// Loss minimised by the booster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    SquaredError,
}

/// Booster hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    /// Number of boosting rounds (default: 500)
    pub n_estimators: usize,
    /// Shrinkage applied to every tree (default: 0.05)
    pub learning_rate: f64,
    /// Maximum tree depth (default: 6)
    pub max_depth: usize,
    pub objective: Objective,
    /// L2 regularisation on leaf weights (default: 1.0)
    pub lambda: f64,
    /// Minimum rows per child (default: 1)
    pub min_child_weight: f64,
    /// Histogram bins per feature, including the missing bin (default: 256)
    pub max_bins: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 500,
            learning_rate: 0.05,
            max_depth: 6,
            objective: Objective::SquaredError,
            lambda: 1.0,
            min_child_weight: 1.0,
            max_bins: 256,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: &str| Err(ModelError::InvalidParams(msg.to_string()));
        if self.n_estimators == 0 {
            return invalid("n_estimators must be at least 1");
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid("learning_rate must be a positive number");
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1");
        }
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return invalid("lambda must be non-negative");
        }
        if !(self.min_child_weight.is_finite() && self.min_child_weight >= 0.0) {
            return invalid("min_child_weight must be non-negative");
        }
        if self.max_bins < 3 || self.max_bins > u16::MAX as usize {
            return invalid("max_bins must be within [3, 65535]");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One fitted regression tree; leaf values already include shrinkage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn predict_by<F: Fn(usize) -> f64>(&self, feature_value: F) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = feature_value(feature);
                    idx = if x.is_nan() || x <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Fitted boosted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedModel {
    base_score: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl BoostedModel {
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl RulModel for BoostedModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        let estimate = self.base_score
            + self
                .trees
                .iter()
                .map(|t| t.predict_by(|f| features[f]))
                .sum::<f64>();
        if estimate.is_finite() {
            Ok(estimate)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }
}

/// Gradient-boosted tree regressor
#[derive(Debug, Clone, Default)]
pub struct GradientBoostedTrees {
    params: BoostingParams,
}

impl GradientBoostedTrees {
    pub fn new(params: BoostingParams) -> Self {
        Self { params }
    }
}

impl RulRegressor for GradientBoostedTrees {
    type Model = BoostedModel;

    fn fit(
        &self,
        features: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
    ) -> Result<BoostedModel, ModelError> {
        self.params.validate()?;
        let (n_rows, n_features) = features.dim();
        if n_rows == 0 {
            return Err(ModelError::EmptyInput);
        }
        if target.len() != n_rows {
            return Err(ModelError::TargetLength {
                rows: n_rows,
                target: target.len(),
            });
        }
        if let Some(i) = target.iter().position(|y| !y.is_finite()) {
            return Err(ModelError::NonFiniteTarget(i));
        }

        info!(
            "Fitting {} trees (depth {}, lr {}) on {} rows x {} features",
            self.params.n_estimators,
            self.params.max_depth,
            self.params.learning_rate,
            n_rows,
            n_features
        );

        let binned = BinnedMatrix::build(features, self.params.max_bins);
        let base_score = target.sum() / n_rows as f64;
        let mut predictions = vec![base_score; n_rows];
        let mut residuals = vec![0.0; n_rows];
        let mut rows: Vec<usize> = Vec::with_capacity(n_rows);
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for round in 0..self.params.n_estimators {
            for i in 0..n_rows {
                residuals[i] = target[i] - predictions[i];
            }
            rows.clear();
            rows.extend(0..n_rows);

            let tree = TreeBuilder::new(&binned, &residuals, &self.params).build(&mut rows);
            for (i, p) in predictions.iter_mut().enumerate() {
                *p += tree.predict_by(|f| features[[i, f]]);
            }
            trees.push(tree);

            if (round + 1) % 100 == 0 {
                let mse = predictions
                    .iter()
                    .zip(target.iter())
                    .map(|(p, y)| (p - y).powi(2))
                    .sum::<f64>()
                    / n_rows as f64;
                debug!("Round {}: train rmse {:.4}", round + 1, mse.sqrt());
            }
        }

        Ok(BoostedModel {
            base_score,
            n_features,
            trees,
        })
    }
}

/// Features quantised once per fit
struct BinnedMatrix {
    /// Upper bin edges per feature; value bin `b` covers `(cuts[b-2], cuts[b-1]]`
    cuts: Vec<Vec<f64>>,
    /// Bin index per feature, per row
    bins: Vec<Vec<u16>>,
}

impl BinnedMatrix {
    fn build(features: ArrayView2<'_, f64>, max_bins: usize) -> Self {
        let mut cuts = Vec::with_capacity(features.ncols());
        let mut bins = Vec::with_capacity(features.ncols());
        for column in features.columns() {
            let feature_cuts = compute_cuts(column.iter().copied(), max_bins - 2);
            bins.push(column.iter().map(|&x| bin_of(&feature_cuts, x)).collect());
            cuts.push(feature_cuts);
        }
        Self { cuts, bins }
    }
}

/// At most `max_cuts` strictly increasing edges taken from the distinct finite values
fn compute_cuts(values: impl Iterator<Item = f64>, max_cuts: usize) -> Vec<f64> {
    let mut distinct: Vec<f64> = values.filter(|x| x.is_finite()).collect();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    let d = distinct.len();
    if d <= max_cuts {
        return distinct;
    }
    (1..=max_cuts).map(|k| distinct[k * d / max_cuts - 1]).collect()
}

fn bin_of(cuts: &[f64], x: f64) -> u16 {
    if x.is_nan() {
        0
    } else {
        (1 + cuts.partition_point(|&c| c < x)) as u16
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    /// Rows with bin <= this go left
    bin: u16,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    binned: &'a BinnedMatrix,
    residuals: &'a [f64],
    params: &'a BoostingParams,
    nodes: Vec<TreeNode>,
    hist_sum: Vec<f64>,
    hist_count: Vec<f64>,
}

impl<'a> TreeBuilder<'a> {
    fn new(binned: &'a BinnedMatrix, residuals: &'a [f64], params: &'a BoostingParams) -> Self {
        Self {
            binned,
            residuals,
            params,
            nodes: Vec::new(),
            hist_sum: Vec::new(),
            hist_count: Vec::new(),
        }
    }

    fn build(mut self, rows: &mut [usize]) -> RegressionTree {
        self.grow(rows, 0);
        RegressionTree { nodes: self.nodes }
    }

    fn grow(&mut self, rows: &mut [usize], depth: usize) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value: 0.0 });

        let g: f64 = rows.iter().map(|&r| self.residuals[r]).sum();
        let h = rows.len() as f64;

        let split = if depth < self.params.max_depth && rows.len() >= 2 {
            self.best_split(rows, g, h)
        } else {
            None
        };

        let binned = self.binned;
        let mid = split.map(|s| {
            partition_rows(rows, |r| binned.bins[s.feature][r] <= s.bin)
        });

        match (split, mid) {
            (Some(s), Some(mid)) if mid > 0 && mid < rows.len() => {
                let (left_rows, right_rows) = rows.split_at_mut(mid);
                let left = self.grow(left_rows, depth + 1);
                let right = self.grow(right_rows, depth + 1);
                self.nodes[idx] = TreeNode::Split {
                    feature: s.feature,
                    threshold: s.threshold,
                    left,
                    right,
                };
            }
            _ => {
                let weight = g / (h + self.params.lambda);
                self.nodes[idx] = TreeNode::Leaf {
                    value: self.params.learning_rate * weight,
                };
            }
        }
        idx
    }

    fn best_split(&mut self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let binned = self.binned;
        let residuals = self.residuals;
        let lambda = self.params.lambda;
        let min_child = self.params.min_child_weight.max(f64::MIN_POSITIVE);
        let parent = g * g / (h + lambda);
        let mut best: Option<SplitCandidate> = None;

        for (feature, cuts) in binned.cuts.iter().enumerate() {
            if cuts.is_empty() {
                continue;
            }
            let n_bins = cuts.len() + 2;
            self.hist_sum.clear();
            self.hist_sum.resize(n_bins, 0.0);
            self.hist_count.clear();
            self.hist_count.resize(n_bins, 0.0);

            let column = &binned.bins[feature];
            for &r in rows {
                let b = column[r] as usize;
                self.hist_sum[b] += residuals[r];
                self.hist_count[b] += 1.0;
            }

            // Bin 0 (missing) is always on the left
            let mut gl = self.hist_sum[0];
            let mut hl = self.hist_count[0];
            for t in 1..=cuts.len() {
                gl += self.hist_sum[t];
                hl += self.hist_count[t];
                let (gr, hr) = (g - gl, h - hl);
                if hl < min_child || hr < min_child {
                    continue;
                }
                let gain = gl * gl / (hl + lambda) + gr * gr / (hr + lambda) - parent;
                if gain > MIN_GAIN && best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        bin: t as u16,
                        threshold: cuts[t - 1],
                        gain,
                    });
                }
            }
        }
        best
    }
}

/// Move rows satisfying `goes_left` to the front; returns the boundary
fn partition_rows<F: Fn(usize) -> bool>(rows: &mut [usize], goes_left: F) -> usize {
    let mut mid = 0;
    for i in 0..rows.len() {
        if goes_left(rows[i]) {
            rows.swap(mid, i);
            mid += 1;
        }
    }
    mid
}
