//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// Default number of simulated scenarios
pub const DEFAULT_SAMPLE_COUNT: usize = 150;

/// Default seed for the shared random stream
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of scenarios held out for evaluation
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Folds used for cross-validated MAE
pub const DEFAULT_CV_FOLDS: usize = 5;

/// Trees grown by the random forest candidate
pub const DEFAULT_FOREST_TREES: usize = 100;

/// Boosting rounds for the gradient boosting candidate
pub const DEFAULT_BOOSTING_ROUNDS: usize = 100;

/// Artifact file name inside the data directory
pub const DEFAULT_MODEL_FILE: &str = "clinic_recovery_model.json";

/// Lower bound of any recovery estimate (weeks)
pub const MIN_RECOVERY_WEEKS: f64 = 1.0;

/// Upper bound of any recovery estimate (weeks)
pub const MAX_RECOVERY_WEEKS: f64 = 12.0;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "clinic-recovery";

/// Clamp a recovery estimate into the supported range
pub fn clamp_weeks(weeks: f64) -> f64 {
    weeks.clamp(MIN_RECOVERY_WEEKS, MAX_RECOVERY_WEEKS)
}
