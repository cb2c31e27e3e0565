//! Scenario Module - Synthetic Clinic/Attack Data
//!
//! Generates internally consistent clinic + attack scenarios and the
//! recovery-time target the models learn from.

pub mod types;
pub mod generator;


// Re-export common types
pub use types::{AttackType, ClinicType, Scenario, SecurityPosture};
pub use generator::{compute_recovery_weeks, RecoveryDrivers, RecoveryOutcome, ScenarioGenerator};
