//! Error types shared by the encoder, aligner and predictor.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ClassifierError;

/// Errors surfaced by the churn prediction pipeline.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// A startup artifact (model or schema) is missing, unreadable or
    /// inconsistent with the other artifact.
    #[error("failed to load {}: {reason}", .path.display())]
    ModelLoad { path: PathBuf, reason: String },

    /// A categorical attribute holds a value outside its domain.
    #[error("invalid value {value:?} for field `{field}`")]
    InvalidCategory { field: &'static str, value: String },

    /// Alignment was attempted without any schema columns.
    #[error("schema columns are not loaded")]
    SchemaUnavailable,

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

impl ChurnError {
    pub(crate) fn model_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ChurnError::ModelLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChurnError>;
