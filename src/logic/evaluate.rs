//! Evaluator - Regression Metrics
//!
//! Pure functions over (predictions, actuals). Both slices must be
//! non-empty and of equal length; anything else is an `EmptyDataset` error.

use serde::{Deserialize, Serialize};

use crate::error::{RecoveryError, RecoveryResult};

/// Accuracy of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Held-out mean absolute error (weeks)
    pub mae: f64,
    /// Held-out root mean squared error (weeks)
    pub rmse: f64,
    /// Held-out coefficient of determination
    pub r2: f64,
    /// k-fold cross-validated MAE on the training partition
    pub cv_mae: f64,
}

impl RegressionMetrics {
    /// Held-out metrics; `cv_mae` is filled by the trainer
    pub fn held_out(predictions: &[f64], actuals: &[f64]) -> RecoveryResult<Self> {
        Ok(Self {
            mae: mean_absolute_error(predictions, actuals)?,
            rmse: root_mean_squared_error(predictions, actuals)?,
            r2: r_squared(predictions, actuals)?,
            cv_mae: 0.0,
        })
    }

    pub fn is_finite(&self) -> bool {
        self.mae.is_finite() && self.rmse.is_finite() && self.r2.is_finite() && self.cv_mae.is_finite()
    }
}

/// Shared length check; returns the pair count
fn paired_len(predictions: &[f64], actuals: &[f64]) -> RecoveryResult<usize> {
    if predictions.len() != actuals.len() {
        return Err(RecoveryError::EmptyDataset(format!(
            "{} predictions for {} actuals",
            predictions.len(),
            actuals.len()
        )));
    }
    if actuals.is_empty() {
        return Err(RecoveryError::EmptyDataset("no values to score".into()));
    }
    Ok(actuals.len())
}

/// mean(|p - a|)
pub fn mean_absolute_error(predictions: &[f64], actuals: &[f64]) -> RecoveryResult<f64> {
    let n = paired_len(predictions, actuals)?;
    let total: f64 = predictions.iter().zip(actuals).map(|(p, a)| (p - a).abs()).sum();
    Ok(total / n as f64)
}

/// sqrt(mean((p - a)^2))
pub fn root_mean_squared_error(predictions: &[f64], actuals: &[f64]) -> RecoveryResult<f64> {
    let n = paired_len(predictions, actuals)?;
    let total: f64 = predictions.iter().zip(actuals).map(|(p, a)| (p - a).powi(2)).sum();
    Ok((total / n as f64).sqrt())
}

/// 1 - SS_res / SS_tot
///
/// Defined as 0.0 when the actuals have no spread (SS_tot = 0).
pub fn r_squared(predictions: &[f64], actuals: &[f64]) -> RecoveryResult<f64> {
    let n = paired_len(predictions, actuals)?;
    let mean = actuals.iter().sum::<f64>() / n as f64;

    let ss_tot: f64 = actuals.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(0.0);
    }
    let ss_res: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (a - p).powi(2))
        .sum();

    Ok(1.0 - ss_res / ss_tot)
}

/// MAE of always predicting `constant`
pub fn constant_baseline_mae(constant: f64, actuals: &[f64]) -> RecoveryResult<f64> {
    let predictions = vec![constant; actuals.len()];
    mean_absolute_error(&predictions, actuals)
}
