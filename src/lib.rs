/// churn-predict library crate.
///
/// Encodes customer form attributes into the feature vector a trained churn
/// classifier expects and runs a single prediction against it.
///
/// The binary entry point (src/main.rs) uses these same modules.
pub mod attributes;
pub mod encoder;
pub mod error;
pub mod input;
pub mod model;
pub mod predictor;
pub mod report;
pub mod schema;

pub use attributes::{CategoricalField, RawAttributes};
pub use encoder::{FeatureMap, encode};
pub use error::{ChurnError, Result};
pub use predictor::{ChurnLabel, PredictionResult, Predictor};
pub use schema::{AlignedVector, SchemaColumns, align};
