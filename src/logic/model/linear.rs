//! Linear Estimator
//!
//! Ordinary least squares with intercept, fitted on standardized features
//! through the normal equations.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::estimator::Regressor;
use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::features::{FeatureRow, FEATURE_COUNT};

/// Diagonal term that keeps XᵀX invertible when features are collinear.
/// Too small to move a well-posed solution.
const RIDGE: f64 = 1e-8;

const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearEstimator {
    pub intercept: f64,
    pub coefficients: [f64; FEATURE_COUNT],
    pub fitted: bool,
}

impl LinearEstimator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for LinearEstimator {
    fn name(&self) -> &'static str {
        "Linear Regression"
    }

    fn uses_scaled_features(&self) -> bool {
        true
    }

    fn fit(&mut self, rows: &[FeatureRow], targets: &[f64], _rng: &mut ChaCha8Rng) -> RecoveryResult<()> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(RecoveryError::EmptyDataset(format!(
                "linear fit needs matching rows/targets, got {}/{}",
                rows.len(),
                targets.len()
            )));
        }

        // Augmented design: column 0 is the intercept
        const DIM: usize = FEATURE_COUNT + 1;
        let mut xtx = vec![vec![0.0; DIM]; DIM];
        let mut xty = vec![0.0; DIM];

        for (row, &y) in rows.iter().zip(targets) {
            let mut x = [1.0; DIM];
            x[1..].copy_from_slice(row);
            for i in 0..DIM {
                xty[i] += x[i] * y;
                for j in 0..DIM {
                    xtx[i][j] += x[i] * x[j];
                }
            }
        }
        for (i, diag) in xtx.iter_mut().enumerate().skip(1) {
            diag[i] += RIDGE;
        }

        let beta = solve_linear_system(xtx, xty).ok_or_else(|| {
            RecoveryError::EmptyDataset("design matrix is singular".into())
        })?;

        self.intercept = beta[0];
        self.coefficients.copy_from_slice(&beta[1..]);
        self.fitted = true;
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn predict_raw(&self, row: &FeatureRow) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn test_solve_small_system() {
        // 2x + y = 5, x - y = 1
        let x = solve_linear_system(vec![vec![2.0, 1.0], vec![1.0, -1.0]], vec![5.0, 1.0]).unwrap();
        assert_abs_diff_eq!(x[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_system() {
        assert!(solve_linear_system(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0]).is_none());
    }

    #[test]
    fn test_recovers_linear_relation() {
        // y = 3 + 2·x0 - 0.5·x3, other features vary but carry no signal
        let rows: Vec<FeatureRow> = (0..60)
            .map(|i| {
                let mut r = [0.0; FEATURE_COUNT];
                for (j, v) in r.iter_mut().enumerate() {
                    *v = ((i * (j + 3) * 7919) % 101) as f64 / 10.0;
                }
                r
            })
            .collect();
        let targets: Vec<f64> = rows.iter().map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[3]).collect();

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut model = LinearEstimator::new();
        model.fit(&rows, &targets, &mut rng).unwrap();

        assert!(model.is_fitted());
        assert_abs_diff_eq!(model.coefficients[0], 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(model.coefficients[3], -0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(model.predict_raw(&rows[7]), targets[7], epsilon = 1e-5);
    }

    #[test]
    fn test_empty_fit_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(LinearEstimator::new().fit(&[], &[], &mut rng).is_err());
    }
}
