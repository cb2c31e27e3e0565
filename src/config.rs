//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::constants::*;
use crate::error::{RecoveryError, RecoveryResult};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of scenarios to simulate
    pub sample_count: usize,

    /// Seed of the shared random stream
    pub seed: u64,

    /// Where the trained artifact is written
    pub model_path: PathBuf,

    /// Held-out fraction (0.0 - 1.0, exclusive)
    pub test_ratio: f64,

    /// Cross-validation folds
    pub cv_folds: usize,

    /// Random forest size
    pub forest_trees: usize,

    /// Gradient boosting rounds
    pub boosting_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            seed: DEFAULT_SEED,
            model_path: default_model_path(),
            test_ratio: DEFAULT_TEST_RATIO,
            cv_folds: DEFAULT_CV_FOLDS,
            forest_trees: DEFAULT_FOREST_TREES,
            boosting_rounds: DEFAULT_BOOSTING_ROUNDS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            sample_count: parse_var("CLINIC_SAMPLES").unwrap_or(DEFAULT_SAMPLE_COUNT),

            seed: parse_var("CLINIC_SEED").unwrap_or(DEFAULT_SEED),

            model_path: env::var("CLINIC_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_model_path()),

            test_ratio: parse_var("CLINIC_TEST_RATIO").unwrap_or(DEFAULT_TEST_RATIO),

            cv_folds: parse_var("CLINIC_CV_FOLDS").unwrap_or(DEFAULT_CV_FOLDS),

            forest_trees: parse_var("CLINIC_FOREST_TREES").unwrap_or(DEFAULT_FOREST_TREES),

            boosting_rounds: parse_var("CLINIC_BOOSTING_ROUNDS").unwrap_or(DEFAULT_BOOSTING_ROUNDS),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> RecoveryResult<()> {
        if self.sample_count == 0 {
            return Err(RecoveryError::Config("sample count must be positive".into()));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(RecoveryError::Config(format!(
                "test ratio must lie in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.cv_folds < 2 {
            return Err(RecoveryError::Config(format!(
                "at least 2 cross-validation folds required, got {}",
                self.cv_folds
            )));
        }
        if self.forest_trees == 0 || self.boosting_rounds == 0 {
            return Err(RecoveryError::Config(
                "ensemble sizes must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Get default artifact path
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(DEFAULT_MODEL_FILE)
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_count, 150);
        assert_eq!(config.seed, 42);
        assert_eq!(config.cv_folds, 5);
        assert!(config.model_path.ends_with(DEFAULT_MODEL_FILE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let config = Config {
            test_ratio: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RecoveryError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_single_fold() {
        let config = Config {
            cv_folds: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_samples() {
        let config = Config {
            sample_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
