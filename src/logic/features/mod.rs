//! Features Module - Feature Derivation Engine
//!
//! Fixed-order numeric vectors from scenarios, with the encoding and
//! scaling state that must travel with a trained model.

pub mod layout;
pub mod encoding;
pub mod scaler;
pub mod vector;


// Re-export common types
pub use layout::{feature_name, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use encoding::{CategoryEncoder, EncodingTables};
pub use scaler::StandardScaler;
pub use vector::{derive_row, FeatureRow, TrainingSet};
