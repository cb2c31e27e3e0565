//! Model Trainer
//!
//! Splits a training set, cross-validates every candidate estimator on the
//! training partition, scores it on the held-out partition and selects the
//! one with the lowest cross-validated MAE.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::split::{kfold, train_test_split};
use crate::config::Config;
use crate::constants::{DEFAULT_BOOSTING_ROUNDS, DEFAULT_CV_FOLDS, DEFAULT_FOREST_TREES, DEFAULT_TEST_RATIO};
use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::evaluate::{constant_baseline_mae, mean_absolute_error, RegressionMetrics};
use crate::logic::features::{feature_name, FeatureRow, StandardScaler, TrainingSet, FEATURE_COUNT};
use crate::logic::model::{EnsembleEstimator, Estimator, HeuristicAverageEstimator, LinearEstimator, Regressor};

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    pub test_ratio: f64,
    pub cv_folds: usize,
    pub forest_trees: usize,
    pub boosting_rounds: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_ratio: DEFAULT_TEST_RATIO,
            cv_folds: DEFAULT_CV_FOLDS,
            forest_trees: DEFAULT_FOREST_TREES,
            boosting_rounds: DEFAULT_BOOSTING_ROUNDS,
        }
    }
}

impl From<&Config> for TrainerConfig {
    fn from(config: &Config) -> Self {
        Self {
            test_ratio: config.test_ratio,
            cv_folds: config.cv_folds,
            forest_trees: config.forest_trees,
            boosting_rounds: config.boosting_rounds,
        }
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// One entry of a ranked importance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Sort layout-ordered importances descending; ties keep layout order
pub fn rank_importances(values: &[f64; FEATURE_COUNT]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = values
        .iter()
        .enumerate()
        .map(|(i, &importance)| FeatureImportance {
            feature: feature_name(i).unwrap_or("unknown").to_string(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// A fitted candidate and its scores
#[derive(Debug, Clone)]
pub struct CandidateReport {
    pub name: String,
    pub metrics: RegressionMetrics,
    pub estimator: Estimator,
    pub feature_importance: Option<Vec<FeatureImportance>>,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Declaration order
    pub candidates: Vec<CandidateReport>,
    pub best_index: usize,
    /// Fitted on the training partition only
    pub scaler: StandardScaler,
    /// Unscaled held-out rows
    pub test_rows: Vec<FeatureRow>,
    pub test_targets: Vec<f64>,
    pub train_size: usize,
    /// Held-out MAE of always predicting the training mean
    pub baseline_mae: f64,
}

impl TrainingOutcome {
    pub fn best(&self) -> &CandidateReport {
        &self.candidates[self.best_index]
    }

    /// Clamped prediction of the best candidate for an unscaled row
    pub fn predict_best(&self, row: &FeatureRow) -> f64 {
        let best = &self.best().estimator;
        if best.uses_scaled_features() {
            best.predict(&self.scaler.transform(row))
        } else {
            best.predict(row)
        }
    }
}

// ============================================================================
// TRAINER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Unfitted candidates in declaration order
    pub fn candidates(&self) -> Vec<Estimator> {
        vec![
            LinearEstimator::new().into(),
            EnsembleEstimator::random_forest(self.config.forest_trees).into(),
            EnsembleEstimator::gradient_boosting(self.config.boosting_rounds).into(),
            HeuristicAverageEstimator::new().into(),
        ]
    }

    pub fn train(&self, set: &TrainingSet, rng: &mut ChaCha8Rng) -> RecoveryResult<TrainingOutcome> {
        validate_targets(set)?;

        let partition = train_test_split(set.len(), self.config.test_ratio, rng)?;
        if partition.train.len() < self.config.cv_folds {
            return Err(RecoveryError::EmptyDataset(format!(
                "training partition has {} rows, fewer than {} folds",
                partition.train.len(),
                self.config.cv_folds
            )));
        }

        let train_rows: Vec<FeatureRow> = partition.train.iter().map(|&i| set.rows[i]).collect();
        let train_targets: Vec<f64> = partition.train.iter().map(|&i| set.targets[i]).collect();
        let test_rows: Vec<FeatureRow> = partition.test.iter().map(|&i| set.rows[i]).collect();
        let test_targets: Vec<f64> = partition.test.iter().map(|&i| set.targets[i]).collect();

        let scaler = StandardScaler::fit(&train_rows);
        let scaled_train = scaler.transform_all(&train_rows);
        let scaled_test = scaler.transform_all(&test_rows);

        let templates = self.candidates();
        log::info!(
            "Training {} candidates on {} rows ({} held out, {}-fold CV)",
            templates.len(),
            train_rows.len(),
            test_rows.len(),
            self.config.cv_folds
        );

        let mut candidates = Vec::with_capacity(templates.len());
        for template in templates {
            let (fit_rows, eval_rows) = if template.uses_scaled_features() {
                (&scaled_train, &scaled_test)
            } else {
                (&train_rows, &test_rows)
            };

            let cv_mae = self.cross_validate(&template, fit_rows, &train_targets, rng)?;

            let mut estimator = template;
            estimator.fit(fit_rows, &train_targets, rng)?;

            let mut metrics = estimator.evaluate(eval_rows, &test_targets)?;
            metrics.cv_mae = cv_mae;

            log::info!(
                "{}: MAE={:.3} RMSE={:.3} R2={:.3} CV_MAE={:.3}",
                estimator.name(),
                metrics.mae,
                metrics.rmse,
                metrics.r2,
                metrics.cv_mae
            );

            candidates.push(CandidateReport {
                name: estimator.name().to_string(),
                metrics,
                feature_importance: estimator.feature_importances().map(|v| rank_importances(&v)),
                estimator,
            });
        }

        let best_index = select_best(&candidates)?;

        let train_mean = train_targets.iter().sum::<f64>() / train_targets.len() as f64;
        let baseline_mae = constant_baseline_mae(train_mean, &test_targets)?;

        log::info!(
            "Selected {} (CV MAE {:.3}, baseline MAE {:.3})",
            candidates[best_index].name,
            candidates[best_index].metrics.cv_mae,
            baseline_mae
        );

        Ok(TrainingOutcome {
            candidates,
            best_index,
            scaler,
            test_rows,
            test_targets,
            train_size: partition.train.len(),
            baseline_mae,
        })
    }

    /// Mean fold MAE of fresh copies of `template`
    fn cross_validate(
        &self,
        template: &Estimator,
        rows: &[FeatureRow],
        targets: &[f64],
        rng: &mut ChaCha8Rng,
    ) -> RecoveryResult<f64> {
        let folds = kfold(rows.len(), self.config.cv_folds);
        if folds.is_empty() {
            return Err(RecoveryError::EmptyDataset(format!(
                "cannot build {} folds from {} rows",
                self.config.cv_folds,
                rows.len()
            )));
        }

        let mut total = 0.0;
        for fold in &folds {
            let fold_rows: Vec<FeatureRow> = fold.train.iter().map(|&i| rows[i]).collect();
            let fold_targets: Vec<f64> = fold.train.iter().map(|&i| targets[i]).collect();
            let val_rows: Vec<FeatureRow> = fold.test.iter().map(|&i| rows[i]).collect();
            let val_targets: Vec<f64> = fold.test.iter().map(|&i| targets[i]).collect();

            let mut model = template.clone();
            model.fit(&fold_rows, &fold_targets, rng)?;
            total += mean_absolute_error(&model.predict_batch(&val_rows), &val_targets)?;
        }

        Ok(total / folds.len() as f64)
    }
}

fn validate_targets(set: &TrainingSet) -> RecoveryResult<()> {
    if set.is_empty() {
        return Err(RecoveryError::EmptyDataset("no training rows".to_string()));
    }
    if let Some(pos) = set.targets.iter().position(|y| !y.is_finite()) {
        return Err(RecoveryError::input("recovery_weeks", format!("non-finite target at row {}", pos)));
    }

    let first = set.targets[0];
    if set.targets.iter().all(|&y| y == first) {
        return Err(RecoveryError::EmptyDataset(format!(
            "target has zero variance (every row is {})",
            first
        )));
    }
    Ok(())
}

/// Lowest CV MAE wins; on a tie the earlier candidate is kept
fn select_best(candidates: &[CandidateReport]) -> RecoveryResult<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in candidates.iter().enumerate() {
        if !c.metrics.is_finite() {
            log::warn!("{} produced non-finite metrics, excluded from selection", c.name);
            continue;
        }
        match best {
            Some(b) if c.metrics.cv_mae >= candidates[b].metrics.cv_mae => {}
            _ => best = Some(i),
        }
    }
    best.ok_or_else(|| RecoveryError::EmptyDataset("no candidate produced finite metrics".to_string()))
}
