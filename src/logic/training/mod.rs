//! Training Module - Candidate Fitting & Selection
//!
//! Seeded partitioning, k-fold cross-validation and best-model selection.

pub mod split;
pub mod trainer;

#[cfg(test)]
mod tests;

pub use split::{kfold, train_test_split, Partition};
pub use trainer::{
    rank_importances, CandidateReport, FeatureImportance, Trainer, TrainerConfig, TrainingOutcome,
};
