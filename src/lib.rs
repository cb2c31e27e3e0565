//! Clinic Cyber Recovery - Core Library
//!
//! Simulates clinic cyber-attack scenarios, trains recovery-time regressors
//! on them and persists the selected model for reuse.
//!
//! ## Pipeline
//! - `logic::scenario` - synthetic clinic + attack generation
//! - `logic::features` - fixed feature layout, encoding, scaling
//! - `logic::model` - estimators (linear, ensemble, heuristic)
//! - `logic::training` - split, cross-validation, model selection
//! - `logic::store` - versioned model artifact
//! - `logic::predictor` - bounded recovery estimates from a stored artifact
//! - `logic::report` / `logic::pipeline` - end-to-end training run

pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{RecoveryError, RecoveryResult};
