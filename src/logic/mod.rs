//! Logic Module - Scenario Simulation & Recovery Modeling

pub mod scenario;
pub mod features;
pub mod model;
pub mod evaluate;
pub mod training;
pub mod store;
pub mod predictor;
pub mod report;
pub mod pipeline;
