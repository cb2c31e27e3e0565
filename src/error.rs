//! Error handling

use std::path::PathBuf;
use thiserror::Error;

pub type RecoveryResult<T> = Result<T, RecoveryError>;

#[derive(Debug, Error)]
pub enum RecoveryError {
    // Scenario / prediction input errors
    #[error("invalid input `{field}`: {reason}")]
    Input { field: String, reason: String },

    // Training errors
    #[error("dataset unusable for training: {0}")]
    EmptyDataset(String),

    #[error("no trained model available - train or load an artifact first")]
    UntrainedModel,

    // Artifact errors
    #[error("unsupported artifact format version {found} (expected {expected})")]
    ArtifactVersion { found: u32, expected: u32 },

    #[error(
        "feature layout mismatch: expected v{expected_version} ({expected_hash:08x}), got v{actual_version} ({actual_hash:08x})"
    )]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    #[error("artifact checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },

    #[error("malformed model artifact: {0}")]
    MalformedArtifact(String),

    #[error("model artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl RecoveryError {
    pub fn input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RecoveryError::Input {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::input(field, "required attribute is missing")
    }
}
