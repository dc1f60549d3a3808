//! Classifier abstraction and the serialized model formats it loads from.
//!
//! # Submodules
//! - [`logistic`] — binary logistic regression
//! - [`forest`]   — random forest of axis-aligned decision trees
//!
//! Model files are JSON objects tagged by `model_type`; see [`ModelArtifact`].

pub mod forest;
pub mod logistic;

use serde::Deserialize;
use thiserror::Error;

pub use forest::{DecisionTree, ForestModel};
pub use logistic::LogisticModel;

/// Failure while invoking a loaded classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("classifier expects {expected} features, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("malformed classifier output: {0}")]
    MalformedOutput(String),
}

/// A trained classifier: input is one feature vector in schema order.
pub trait Classifier: Send + Sync {
    /// Class labels, in the order `predict_proba` reports them.
    fn classes(&self) -> &[i64];

    /// Width of the input vector.
    fn n_features(&self) -> usize;

    /// Column names recorded at training time, if the artifact carries them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Structural checks run before the classifier serves any request.
    /// A classifier that passes must not panic in [`Classifier::predict_proba`].
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Per-class probabilities, aligned with [`Classifier::classes`].
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError>;

    /// Most probable class label. Ties go to the earlier class.
    fn predict(&self, features: &[f64]) -> Result<i64, ClassifierError> {
        let proba = self.predict_proba(features)?;
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in proba.iter().copied().enumerate() {
            if best.is_none_or(|(_, top)| p > top) {
                best = Some((i, p));
            }
        }
        let (index, _) =
            best.ok_or_else(|| ClassifierError::MalformedOutput("empty probability vector".into()))?;
        self.classes().get(index).copied().ok_or_else(|| {
            ClassifierError::MalformedOutput(format!(
                "{} probabilities for {} classes",
                proba.len(),
                self.classes().len()
            ))
        })
    }
}

pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<(), ClassifierError> {
    if features.len() != expected {
        return Err(ClassifierError::InputWidth {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

pub(crate) fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

/// Serialized model, as exported by the training process.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticModel),
    RandomForest(ForestModel),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }

    pub fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            ModelArtifact::LogisticRegression(model) => Box::new(model),
            ModelArtifact::RandomForest(model) => Box::new(model),
        }
    }
}
