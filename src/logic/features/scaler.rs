//! Standard Scaler
//!
//! Zero-mean / unit-variance transform fitted on the training partition only
//! and replayed on held-out rows and every later prediction.

use serde::{Deserialize, Serialize};

use super::layout::{feature_name, FEATURE_COUNT};
use super::vector::FeatureRow;

/// Per-feature standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_COUNT],
    /// Population standard deviation; constant columns keep scale 1.0
    pub scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Identity transform
    pub fn identity() -> Self {
        Self {
            mean: [0.0; FEATURE_COUNT],
            scale: [1.0; FEATURE_COUNT],
        }
    }

    pub fn fit(rows: &[FeatureRow]) -> Self {
        if rows.is_empty() {
            return Self::identity();
        }

        let n = rows.len() as f64;
        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];

        for j in 0..FEATURE_COUNT {
            let m = rows.iter().map(|r| r[j]).sum::<f64>() / n;
            let variance = rows.iter().map(|r| (r[j] - m).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();

            mean[j] = m;
            if std > f64::EPSILON {
                scale[j] = std;
            } else {
                log::debug!(
                    "Feature '{}' is constant in training data, leaving it unscaled",
                    feature_name(j).unwrap_or("unknown")
                );
            }
        }

        Self { mean, scale }
    }

    pub fn transform(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            out[j] = (row[j] - self.mean[j]) / self.scale[j];
        }
        out
    }

    pub fn transform_all(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::identity()
    }
}
