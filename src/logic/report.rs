//! Training Report
//!
//! Human-readable summary of one training run, written through `log`.

use rand::seq::index::sample;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::logic::evaluate::RegressionMetrics;
use crate::logic::training::{FeatureImportance, TrainingOutcome};

pub const TOP_FEATURES: usize = 5;
pub const SAMPLE_COMPARISONS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct CandidateLine {
    pub name: String,
    pub metrics: RegressionMetrics,
}

/// One held-out row: what happened vs. what the best model says
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleComparison {
    pub actual: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub sample_count: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub candidates: Vec<CandidateLine>,
    pub best_model: String,
    pub best_metrics: RegressionMetrics,
    pub baseline_mae: f64,
    pub top_features: Vec<FeatureImportance>,
    pub comparisons: Vec<SampleComparison>,
}

impl TrainingReport {
    /// Summarize `outcome`; comparison rows are drawn from `rng`
    pub fn build(outcome: &TrainingOutcome, sample_count: usize, rng: &mut ChaCha8Rng) -> Self {
        let best = outcome.best();
        let test_size = outcome.test_rows.len();

        let comparisons = sample(rng, test_size, SAMPLE_COMPARISONS.min(test_size))
            .into_iter()
            .map(|i| SampleComparison {
                actual: outcome.test_targets[i],
                predicted: outcome.predict_best(&outcome.test_rows[i]),
            })
            .collect();

        Self {
            sample_count,
            train_size: outcome.train_size,
            test_size,
            candidates: outcome
                .candidates
                .iter()
                .map(|c| CandidateLine {
                    name: c.name.clone(),
                    metrics: c.metrics,
                })
                .collect(),
            best_model: best.name.clone(),
            best_metrics: best.metrics,
            baseline_mae: outcome.baseline_mae,
            top_features: best
                .feature_importance
                .as_ref()
                .map(|ranked| ranked.iter().take(TOP_FEATURES).cloned().collect())
                .unwrap_or_default(),
            comparisons,
        }
    }

    pub fn log(&self) {
        log::info!("Generated {} scenarios", self.sample_count);
        log::info!("Split: {} train / {} held out", self.train_size, self.test_size);

        log::info!("Model comparison:");
        for c in &self.candidates {
            log::info!(
                "   {:<18} MAE {:>6.3}  RMSE {:>6.3}  R2 {:>6.3}  CV MAE {:>6.3}",
                c.name,
                c.metrics.mae,
                c.metrics.rmse,
                c.metrics.r2,
                c.metrics.cv_mae
            );
        }

        log::info!(
            "Best model: {} (MAE {:.2} weeks, R2 {:.3}; constant baseline MAE {:.2})",
            self.best_model,
            self.best_metrics.mae,
            self.best_metrics.r2,
            self.baseline_mae
        );

        if !self.top_features.is_empty() {
            log::info!("Top {} features:", self.top_features.len());
            for f in &self.top_features {
                log::info!("   {:<22} {:.3}", f.feature, f.importance);
            }
        }

        for (i, c) in self.comparisons.iter().enumerate() {
            log::info!(
                "Sample {}: actual {:.1} weeks, predicted {:.1} weeks",
                i + 1,
                c.actual,
                c.predicted
            );
        }
    }
}
