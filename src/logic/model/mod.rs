//! Model Module - Recovery-Time Estimators
//!
//! One `Regressor` seam, three model families:
//! - `linear` - least squares on standardized features
//! - `ensemble` - random forest / gradient boosting over `tree`
//! - `heuristic` - closed-form group means with posture adjustments

pub mod estimator;
pub mod linear;
pub mod tree;
pub mod ensemble;
pub mod heuristic;

// Re-export common types
pub use estimator::{Estimator, Regressor};
pub use linear::LinearEstimator;
pub use ensemble::{EnsembleEstimator, EnsembleMethod};
pub use heuristic::HeuristicAverageEstimator;
