//! Model Artifact
//!
//! The persisted bundle: fitted estimator, preprocessing state, layout
//! fingerprint and training metadata, sealed by a checksum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::evaluate::RegressionMetrics;
use crate::logic::features::{EncodingTables, FeatureRow, LayoutInfo, StandardScaler};
use crate::logic::model::{Estimator, Regressor};
use crate::logic::training::{FeatureImportance, TrainingOutcome};

// ============================================================================
// VERSIONED MODEL ARTIFACT
// ============================================================================

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Per-candidate scores kept for comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub name: String,
    pub metrics: RegressionMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub artifact_id: uuid::Uuid,
    pub model_name: String,

    // Prediction state (covered by the checksum)
    pub estimator: Estimator,
    pub scaler: StandardScaler,
    pub encoders: EncodingTables,

    pub layout: LayoutInfo,
    pub metrics: RegressionMetrics,
    pub candidates: Vec<CandidateSummary>,
    pub feature_importance: Option<Vec<FeatureImportance>>,

    pub training_samples: usize,
    pub seed: u64,
    pub training_date: DateTime<Utc>,

    /// SHA-256 (hex) of the prediction state
    pub checksum: String,
}

impl ModelArtifact {
    /// Package the selected candidate of a training run
    pub fn from_outcome(
        outcome: &TrainingOutcome,
        encoders: &EncodingTables,
        training_samples: usize,
        seed: u64,
    ) -> RecoveryResult<Self> {
        let best = outcome.best();
        Self::new(
            best.estimator.clone(),
            outcome.scaler.clone(),
            encoders.clone(),
            best.metrics,
            outcome
                .candidates
                .iter()
                .map(|c| CandidateSummary {
                    name: c.name.clone(),
                    metrics: c.metrics,
                })
                .collect(),
            best.feature_importance.clone(),
            training_samples,
            seed,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        estimator: Estimator,
        scaler: StandardScaler,
        encoders: EncodingTables,
        metrics: RegressionMetrics,
        candidates: Vec<CandidateSummary>,
        feature_importance: Option<Vec<FeatureImportance>>,
        training_samples: usize,
        seed: u64,
    ) -> RecoveryResult<Self> {
        estimator.check_integrity()?;

        let checksum = compute_checksum(&estimator, &scaler, &encoders)?;
        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            artifact_id: uuid::Uuid::new_v4(),
            model_name: estimator.name().to_string(),
            estimator,
            scaler,
            encoders,
            layout: LayoutInfo::current(),
            metrics,
            candidates,
            feature_importance,
            training_samples,
            seed,
            training_date: Utc::now(),
            checksum,
        })
    }

    /// Recompute the checksum and compare with the stored one
    pub fn verify_checksum(&self) -> RecoveryResult<()> {
        let computed = compute_checksum(&self.estimator, &self.scaler, &self.encoders)?;
        if computed != self.checksum {
            return Err(RecoveryError::ChecksumMismatch {
                stored: self.checksum.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Version, layout, checksum, then estimator integrity
    pub fn validate(&self) -> RecoveryResult<()> {
        check_format_version(self.format_version)?;
        self.layout.validate()?;
        self.verify_checksum()?;

        if self.model_name != self.estimator.name() {
            return Err(RecoveryError::MalformedArtifact(format!(
                "model name '{}' does not match stored {} estimator",
                self.model_name,
                self.estimator.name()
            )));
        }
        self.estimator.check_integrity()
    }

    /// Clamped prediction for an unscaled row
    pub fn predict_row(&self, row: &FeatureRow) -> (f64, f64) {
        let prepared = if self.estimator.uses_scaled_features() {
            self.scaler.transform(row)
        } else {
            *row
        };
        let raw = self.estimator.predict_raw(&prepared);
        (raw, self.estimator.predict(&prepared))
    }
}

/// Reject any format other than the one this build writes
pub fn check_format_version(found: u32) -> RecoveryResult<()> {
    if found != ARTIFACT_FORMAT_VERSION {
        return Err(RecoveryError::ArtifactVersion {
            found,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    Ok(())
}

/// SHA-256 over the JSON of estimator, scaler and encoders
pub fn compute_checksum(
    estimator: &Estimator,
    scaler: &StandardScaler,
    encoders: &EncodingTables,
) -> RecoveryResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(estimator)?);
    hasher.update(serde_json::to_vec(scaler)?);
    hasher.update(serde_json::to_vec(encoders)?);
    Ok(hex::encode(hasher.finalize()))
}
