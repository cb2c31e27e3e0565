//! Heuristic Average Estimator
//!
//! Closed-form model: attack-type and clinic-type target means, scaled by
//! fixed financial, posture and IT factors, then calibrated so that the
//! training mean is reproduced. No iterative fitting.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::estimator::Regressor;
use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::features::layout::idx;
use crate::logic::features::FeatureRow;

// Posture reductions, subtracted from a 1.0 security factor
pub const BACKUP_REDUCTION: f64 = 0.3;
pub const INCIDENT_PLAN_REDUCTION: f64 = 0.2;
pub const INSURANCE_REDUCTION: f64 = 0.1;
pub const TRAINING_REDUCTION: f64 = 0.1;

/// Weight of the loss/revenue ratio in the financial factor
pub const LOSS_RATIO_WEIGHT: f64 = 0.5;
/// Maximum reduction from IT investment
pub const IT_BUDGET_WEIGHT: f64 = 0.25;
/// IT budget share treated as fully mature
pub const IT_BUDGET_CEILING: f64 = 0.12;

/// Mean target of one categorical group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub code: u32,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeuristicAverageEstimator {
    pub attack_means: Vec<GroupMean>,
    pub clinic_means: Vec<GroupMean>,
    pub global_mean: f64,
    /// mean(target) / mean(uncalibrated prediction) over training rows
    pub calibration: f64,
    pub fitted: bool,
}

fn group_means(rows: &[FeatureRow], targets: &[f64], column: usize) -> Vec<GroupMean> {
    let mut groups: Vec<GroupMean> = Vec::new();
    for (row, &y) in rows.iter().zip(targets) {
        let code = row[column] as u32;
        match groups.iter_mut().find(|g| g.code == code) {
            Some(g) => {
                g.mean += y;
                g.count += 1;
            }
            None => groups.push(GroupMean { code, mean: y, count: 1 }),
        }
    }
    for g in groups.iter_mut() {
        g.mean /= g.count as f64;
    }
    groups.sort_by_key(|g| g.code);
    groups
}

impl HeuristicAverageEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, groups: &[GroupMean], code: f64) -> f64 {
        let code = code as u32;
        match groups.iter().find(|g| g.code == code) {
            Some(g) => g.mean,
            None => {
                log::debug!("No training group for code {}, using global mean", code);
                self.global_mean
            }
        }
    }

    /// Posture factor; every flag present lowers it
    pub fn security_factor(row: &FeatureRow) -> f64 {
        1.0 - BACKUP_REDUCTION * row[idx::HAS_BACKUP]
            - INCIDENT_PLAN_REDUCTION * row[idx::HAS_INCIDENT_PLAN]
            - INSURANCE_REDUCTION * row[idx::HAS_CYBER_INSURANCE]
            - TRAINING_REDUCTION * row[idx::SECURITY_TRAINING]
    }

    /// Prediction before calibration
    fn uncalibrated(&self, row: &FeatureRow) -> f64 {
        let base = self.lookup(&self.attack_means, row[idx::ATTACK_TYPE]);
        let clinic_factor = if self.global_mean > 0.0 {
            self.lookup(&self.clinic_means, row[idx::CLINIC_TYPE]) / self.global_mean
        } else {
            1.0
        };
        let financial_factor = 1.0 + row[idx::FINANCIAL_LOSS_RATIO].max(0.0) * LOSS_RATIO_WEIGHT;
        let it_maturity = (row[idx::IT_BUDGET_PCT] / IT_BUDGET_CEILING).clamp(0.0, 1.0);
        let it_factor = 1.0 - it_maturity * IT_BUDGET_WEIGHT;

        base * clinic_factor * financial_factor * Self::security_factor(row) * it_factor
    }
}

impl Regressor for HeuristicAverageEstimator {
    fn name(&self) -> &'static str {
        "Heuristic Average"
    }

    fn fit(&mut self, rows: &[FeatureRow], targets: &[f64], _rng: &mut ChaCha8Rng) -> RecoveryResult<()> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(RecoveryError::EmptyDataset(format!(
                "heuristic fit needs matching rows/targets, got {}/{}",
                rows.len(),
                targets.len()
            )));
        }

        let n = targets.len() as f64;
        self.global_mean = targets.iter().sum::<f64>() / n;
        self.attack_means = group_means(rows, targets, idx::ATTACK_TYPE);
        self.clinic_means = group_means(rows, targets, idx::CLINIC_TYPE);
        self.calibration = 1.0;

        let raw_mean = rows.iter().map(|r| self.uncalibrated(r)).sum::<f64>() / n;
        if raw_mean > 0.0 {
            self.calibration = self.global_mean / raw_mean;
        }

        self.fitted = true;
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn predict_raw(&self, row: &FeatureRow) -> f64 {
        self.calibration * self.uncalibrated(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn row(attack: f64, clinic: f64, backup: bool) -> FeatureRow {
        let mut r = [0.0; FEATURE_COUNT];
        r[idx::ATTACK_TYPE] = attack;
        r[idx::CLINIC_TYPE] = clinic;
        r[idx::HAS_BACKUP] = if backup { 1.0 } else { 0.0 };
        r[idx::FINANCIAL_LOSS_RATIO] = 0.4;
        r[idx::IT_BUDGET_PCT] = 0.05;
        r
    }

    fn fitted() -> HeuristicAverageEstimator {
        let rows = vec![
            row(0.0, 0.0, false),
            row(0.0, 1.0, true),
            row(1.0, 0.0, false),
            row(1.0, 1.0, true),
        ];
        let targets = vec![2.0, 1.0, 8.0, 5.0];
        let mut model = HeuristicAverageEstimator::new();
        model.fit(&rows, &targets, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        model
    }

    #[test]
    fn test_group_means() {
        let model = fitted();
        assert_eq!(model.attack_means.len(), 2);
        assert_abs_diff_eq!(model.attack_means[0].mean, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(model.attack_means[1].mean, 6.5, epsilon = 1e-12);
        assert_abs_diff_eq!(model.global_mean, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_calibration_reproduces_training_mean() {
        let model = fitted();
        let rows = [
            row(0.0, 0.0, false),
            row(0.0, 1.0, true),
            row(1.0, 0.0, false),
            row(1.0, 1.0, true),
        ];
        let mean_pred = rows.iter().map(|r| model.predict_raw(r)).sum::<f64>() / 4.0;
        assert_abs_diff_eq!(mean_pred, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_backup_does_not_increase_prediction() {
        let model = fitted();
        for attack in [0.0, 1.0] {
            for clinic in [0.0, 1.0] {
                let without = model.predict_raw(&row(attack, clinic, false));
                let with = model.predict_raw(&row(attack, clinic, true));
                assert!(with <= without);
            }
        }
    }

    #[test]
    fn test_unknown_group_falls_back_to_global_mean() {
        let model = fitted();
        let known = model.predict_raw(&row(1.0, 0.0, false));
        let unknown = model.predict_raw(&row(9.0, 0.0, false));
        assert!(unknown.is_finite());
        assert!(unknown < known);
    }
}
