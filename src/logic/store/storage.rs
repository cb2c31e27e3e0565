//! Artifact Storage
//!
//! Pretty-printed JSON on disk. The format version is read from the raw
//! document before the typed parse, so artifacts from other versions are
//! reported as such even when their field set differs.

use std::fs;
use std::path::Path;

use super::artifact::{check_format_version, ModelArtifact};
use crate::error::{RecoveryError, RecoveryResult};

/// Save artifact to disk
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> RecoveryResult<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(artifact)?;
    fs::write(path, json)?;

    log::info!(
        "Saved {} artifact {} to {}",
        artifact.model_name,
        artifact.artifact_id,
        path.display()
    );
    Ok(())
}

/// `format_version` of an untyped artifact document
fn read_format_version(document: &serde_json::Value) -> RecoveryResult<u32> {
    let raw = document
        .get("format_version")
        .ok_or_else(|| RecoveryError::MalformedArtifact("missing format_version".into()))?;

    raw.as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| RecoveryError::MalformedArtifact(format!("format_version is not a u32: {}", raw)))
}

/// Load artifact from disk with validation
pub fn load_artifact(path: &Path) -> RecoveryResult<ModelArtifact> {
    if !path.exists() {
        return Err(RecoveryError::ArtifactNotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let document: serde_json::Value = serde_json::from_slice(&data)?;
    check_format_version(read_format_version(&document)?)?;

    let artifact: ModelArtifact = serde_json::from_value(document)?;

    // Validate layout/checksum/estimator
    artifact.validate()?;

    log::debug!(
        "Loaded {} artifact {} (trained {})",
        artifact.model_name,
        artifact.artifact_id,
        artifact.training_date.to_rfc3339()
    );
    Ok(artifact)
}
