//! Model Store - Versioned Artifact Persistence
//!
//! A trained model travels as one JSON document holding the estimator, the
//! scaler, the category encodings and the layout fingerprint. Loading
//! rejects anything the running build cannot interpret.

pub mod artifact;
pub mod storage;


pub use artifact::{check_format_version, compute_checksum, CandidateSummary, ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use storage::{load_artifact, save_artifact};
