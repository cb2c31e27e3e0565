//! Estimator Abstraction
//!
//! `Regressor` is the seam every model implements; `Estimator` is the
//! closed, serializable set of models the trainer can select and the
//! artifact can carry.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::ensemble::EnsembleEstimator;
use super::heuristic::HeuristicAverageEstimator;
use super::linear::LinearEstimator;
use crate::constants::clamp_weeks;
use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::evaluate::RegressionMetrics;
use crate::logic::features::{FeatureRow, FEATURE_COUNT};

// ============================================================================
// REGRESSOR TRAIT
// ============================================================================

/// Trait for recovery-time regressors
pub trait Regressor {
    /// Human-readable model name
    fn name(&self) -> &'static str;

    /// Whether rows must be standardized before fit/predict
    fn uses_scaled_features(&self) -> bool {
        false
    }

    fn fit(&mut self, rows: &[FeatureRow], targets: &[f64], rng: &mut ChaCha8Rng) -> RecoveryResult<()>;

    fn is_fitted(&self) -> bool;

    /// Unbounded model output
    fn predict_raw(&self, row: &FeatureRow) -> f64;

    /// Output clamped to the recovery range
    fn predict(&self, row: &FeatureRow) -> f64 {
        clamp_weeks(self.predict_raw(row))
    }

    fn predict_batch(&self, rows: &[FeatureRow]) -> Vec<f64> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    /// Held-out metrics over already-prepared rows
    fn evaluate(&self, rows: &[FeatureRow], targets: &[f64]) -> RecoveryResult<RegressionMetrics> {
        RegressionMetrics::held_out(&self.predict_batch(rows), targets)
    }

    /// Learned per-feature importances, in layout order
    fn feature_importances(&self) -> Option<[f64; FEATURE_COUNT]> {
        None
    }
}

// ============================================================================
// ESTIMATOR SET
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Linear(LinearEstimator),
    Ensemble(EnsembleEstimator),
    HeuristicAverage(HeuristicAverageEstimator),
}

impl Estimator {
    fn inner(&self) -> &dyn Regressor {
        match self {
            Estimator::Linear(m) => m,
            Estimator::Ensemble(m) => m,
            Estimator::HeuristicAverage(m) => m,
        }
    }

    /// Reject estimators that could only yield placeholder predictions
    pub fn check_integrity(&self) -> RecoveryResult<()> {
        if !self.is_fitted() {
            return Err(RecoveryError::UntrainedModel);
        }
        let finite = match self {
            Estimator::Linear(m) => m.intercept.is_finite() && m.coefficients.iter().all(|c| c.is_finite()),
            Estimator::Ensemble(m) => return m.validate(),
            Estimator::HeuristicAverage(m) => {
                !m.attack_means.is_empty()
                    && m.global_mean.is_finite()
                    && m.calibration.is_finite()
                    && m.attack_means.iter().chain(&m.clinic_means).all(|g| g.mean.is_finite())
            }
        };
        if !finite {
            return Err(RecoveryError::MalformedArtifact(format!(
                "{} holds non-finite parameters",
                self.name()
            )));
        }
        Ok(())
    }

    fn inner_mut(&mut self) -> &mut dyn Regressor {
        match self {
            Estimator::Linear(m) => m,
            Estimator::Ensemble(m) => m,
            Estimator::HeuristicAverage(m) => m,
        }
    }
}

impl Regressor for Estimator {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn uses_scaled_features(&self) -> bool {
        self.inner().uses_scaled_features()
    }

    fn fit(&mut self, rows: &[FeatureRow], targets: &[f64], rng: &mut ChaCha8Rng) -> RecoveryResult<()> {
        self.inner_mut().fit(rows, targets, rng)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn predict_raw(&self, row: &FeatureRow) -> f64 {
        self.inner().predict_raw(row)
    }

    fn feature_importances(&self) -> Option<[f64; FEATURE_COUNT]> {
        self.inner().feature_importances()
    }
}

impl From<LinearEstimator> for Estimator {
    fn from(m: LinearEstimator) -> Self {
        Estimator::Linear(m)
    }
}

impl From<EnsembleEstimator> for Estimator {
    fn from(m: EnsembleEstimator) -> Self {
        Estimator::Ensemble(m)
    }
}

impl From<HeuristicAverageEstimator> for Estimator {
    fn from(m: HeuristicAverageEstimator) -> Self {
        Estimator::HeuristicAverage(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_names() {
        assert_eq!(Estimator::from(LinearEstimator::new()).name(), "Linear Regression");
        assert_eq!(Estimator::from(EnsembleEstimator::random_forest(3)).name(), "Random Forest");
        assert_eq!(Estimator::from(EnsembleEstimator::gradient_boosting(3)).name(), "Gradient Boosting");
        assert_eq!(Estimator::from(HeuristicAverageEstimator::new()).name(), "Heuristic Average");
    }

    #[test]
    fn test_only_linear_uses_scaling() {
        assert!(Estimator::from(LinearEstimator::new()).uses_scaled_features());
        assert!(!Estimator::from(EnsembleEstimator::random_forest(3)).uses_scaled_features());
        assert!(!Estimator::from(HeuristicAverageEstimator::new()).uses_scaled_features());
    }

    #[test]
    fn test_predict_is_clamped() {
        let mut linear = LinearEstimator::new();
        linear.intercept = 40.0;
        linear.fitted = true;
        let model = Estimator::from(linear);
        let row = [0.0; FEATURE_COUNT];
        assert_eq!(model.predict_raw(&row), 40.0);
        assert_eq!(model.predict(&row), 12.0);
    }

    #[test]
    fn test_integrity_rejects_unfitted_and_non_finite() {
        for unfitted in [
            Estimator::from(LinearEstimator::new()),
            Estimator::from(EnsembleEstimator::random_forest(3)),
            Estimator::from(HeuristicAverageEstimator::new()),
        ] {
            assert!(matches!(unfitted.check_integrity(), Err(RecoveryError::UntrainedModel)));
        }

        let mut linear = LinearEstimator::new();
        linear.fitted = true;
        linear.coefficients[4] = f64::NAN;
        assert!(matches!(
            Estimator::from(linear).check_integrity(),
            Err(RecoveryError::MalformedArtifact(_))
        ));
    }

    #[test]
    fn test_serde_tag() {
        let json = serde_json::to_value(Estimator::from(HeuristicAverageEstimator::new())).unwrap();
        assert_eq!(json["kind"], "heuristic_average");
    }
}
