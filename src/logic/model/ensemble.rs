//! Ensemble Estimator
//!
//! Tree ensembles over raw (unscaled) features:
//! - Random forest: bootstrap samples, fully grown trees, averaged
//! - Gradient boosting: squared loss, shallow trees fitted to residuals
//!
//! Both track impurity-based feature importances.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::estimator::Regressor;
use super::tree::{RegressionTree, TreeParams};
use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::features::{FeatureRow, FEATURE_COUNT};

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_BOOSTING_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleMethod {
    RandomForest,
    GradientBoosting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleEstimator {
    pub method: EnsembleMethod,
    pub n_estimators: usize,
    pub tree_params: TreeParams,
    /// Shrinkage per boosting round (unused by the forest)
    pub learning_rate: f64,
    /// Boosting starting value (mean target); 0.0 for the forest
    pub init: f64,
    pub trees: Vec<RegressionTree>,
    /// Normalized to sum 1 after fitting
    pub importances: [f64; FEATURE_COUNT],
}

impl EnsembleEstimator {
    pub fn random_forest(n_estimators: usize) -> Self {
        Self {
            method: EnsembleMethod::RandomForest,
            n_estimators,
            tree_params: TreeParams::default(),
            learning_rate: 1.0,
            init: 0.0,
            trees: Vec::new(),
            importances: [0.0; FEATURE_COUNT],
        }
    }

    pub fn gradient_boosting(n_estimators: usize) -> Self {
        Self {
            method: EnsembleMethod::GradientBoosting,
            n_estimators,
            tree_params: TreeParams::with_depth(DEFAULT_BOOSTING_DEPTH),
            learning_rate: DEFAULT_LEARNING_RATE,
            init: 0.0,
            trees: Vec::new(),
            importances: [0.0; FEATURE_COUNT],
        }
    }

    fn fit_forest(&mut self, rows: &[FeatureRow], targets: &[f64], rng: &mut ChaCha8Rng) {
        let n = rows.len();
        for _ in 0..self.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut tree_importance = [0.0; FEATURE_COUNT];
            let tree = RegressionTree::fit(rows, targets, &sample, &self.tree_params, &mut tree_importance);
            accumulate_normalized(&mut self.importances, &tree_importance);
            self.trees.push(tree);
        }
    }

    fn fit_boosting(&mut self, rows: &[FeatureRow], targets: &[f64]) {
        let n = rows.len();
        self.init = targets.iter().sum::<f64>() / n as f64;

        let sample: Vec<usize> = (0..n).collect();
        let mut current = vec![self.init; n];

        for _ in 0..self.n_estimators {
            let residuals: Vec<f64> = targets.iter().zip(&current).map(|(y, f)| y - f).collect();
            let mut tree_importance = [0.0; FEATURE_COUNT];
            let tree = RegressionTree::fit(rows, &residuals, &sample, &self.tree_params, &mut tree_importance);

            for (f, row) in current.iter_mut().zip(rows) {
                *f += self.learning_rate * tree.predict(row);
            }
            accumulate_normalized(&mut self.importances, &tree_importance);
            self.trees.push(tree);
        }
    }
}

impl EnsembleEstimator {
    /// Reject unfitted or structurally broken ensembles
    pub fn validate(&self) -> RecoveryResult<()> {
        if self.trees.is_empty() {
            return Err(RecoveryError::UntrainedModel);
        }
        if !self.learning_rate.is_finite() || !self.init.is_finite() {
            return Err(RecoveryError::MalformedArtifact(format!(
                "{} has non-finite learning rate or init",
                self.name()
            )));
        }
        self.trees.iter().try_for_each(RegressionTree::validate)
    }
}

/// Add a tree's importances, scaled to sum 1, into `total`
fn accumulate_normalized(total: &mut [f64; FEATURE_COUNT], tree: &[f64; FEATURE_COUNT]) {
    let sum: f64 = tree.iter().sum();
    if sum > 0.0 {
        for (t, v) in total.iter_mut().zip(tree) {
            *t += v / sum;
        }
    }
}

impl Regressor for EnsembleEstimator {
    fn name(&self) -> &'static str {
        match self.method {
            EnsembleMethod::RandomForest => "Random Forest",
            EnsembleMethod::GradientBoosting => "Gradient Boosting",
        }
    }

    fn fit(&mut self, rows: &[FeatureRow], targets: &[f64], rng: &mut ChaCha8Rng) -> RecoveryResult<()> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(RecoveryError::EmptyDataset(format!(
                "{} needs matching rows/targets, got {}/{}",
                self.name(),
                rows.len(),
                targets.len()
            )));
        }

        self.trees.clear();
        self.importances = [0.0; FEATURE_COUNT];

        match self.method {
            EnsembleMethod::RandomForest => self.fit_forest(rows, targets, rng),
            EnsembleMethod::GradientBoosting => self.fit_boosting(rows, targets),
        }

        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            for v in self.importances.iter_mut() {
                *v /= total;
            }
        }
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn predict_raw(&self, row: &FeatureRow) -> f64 {
        match self.method {
            EnsembleMethod::RandomForest => {
                if self.trees.is_empty() {
                    return f64::NAN;
                }
                self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
            }
            EnsembleMethod::GradientBoosting => {
                self.init
                    + self
                        .trees
                        .iter()
                        .map(|t| self.learning_rate * t.predict(row))
                        .sum::<f64>()
            }
        }
    }

    fn feature_importances(&self) -> Option<[f64; FEATURE_COUNT]> {
        self.is_fitted().then_some(self.importances)
    }
}
