//! Prediction handle: schema + classifier loaded once, shared by every request.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::attributes::RawAttributes;
use crate::encoder::encode;
use crate::error::{ChurnError, Result};
use crate::input::{ArtifactPaths, load_model, load_schema};
use crate::model::{Classifier, ClassifierError};
use crate::schema::{AlignedVector, SchemaColumns, SchemaCoverage, align};

/// Class label the classifier uses for a churning customer.
pub const POSITIVE_CLASS: i64 = 1;

const IN_MEMORY: &str = "<in-memory classifier>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChurnLabel {
    Churn,
    Stay,
}

impl ChurnLabel {
    pub fn headline(self) -> &'static str {
        match self {
            ChurnLabel::Churn => "Customer Likely to Churn",
            ChurnLabel::Stay => "Customer Likely to Stay",
        }
    }
}

/// Outcome of one prediction.
///
/// `probability` is always the churn probability, whichever label won.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: ChurnLabel,
    pub probability: f64,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\nProbability: {:.2}",
            self.label.headline(),
            self.probability
        )
    }
}

pub struct Predictor {
    schema: SchemaColumns,
    classifier: Box<dyn Classifier>,
    positive_index: usize,
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predictor")
            .field("columns", &self.schema.len())
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

impl Predictor {
    /// Pair a schema with a classifier trained on it.
    pub fn new(schema: SchemaColumns, classifier: Box<dyn Classifier>) -> Result<Self> {
        Self::assemble(schema, classifier).map_err(|reason| ChurnError::model_load(IN_MEMORY, reason))
    }

    /// Load both startup artifacts and check they agree.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let schema = load_schema(&paths.columns)?;
        let classifier = load_model(&paths.model)?;
        let predictor = Self::assemble(schema, classifier)
            .map_err(|reason| ChurnError::model_load(&paths.model, reason))?;
        info!(
            model = %paths.model.display(),
            columns = %paths.columns.display(),
            width = predictor.schema.len(),
            "predictor ready"
        );
        Ok(predictor)
    }

    fn assemble(
        schema: SchemaColumns,
        classifier: Box<dyn Classifier>,
    ) -> std::result::Result<Self, String> {
        classifier.validate()?;
        if schema.is_empty() {
            return Err("schema has no columns".to_string());
        }
        if classifier.n_features() != schema.len() {
            return Err(format!(
                "model expects {} features but schema has {} columns",
                classifier.n_features(),
                schema.len()
            ));
        }
        if let Some(names) = classifier.feature_names()
            && names != schema.names()
        {
            return Err("model feature names differ from schema columns".to_string());
        }
        let positive_index = classifier
            .classes()
            .iter()
            .position(|c| *c == POSITIVE_CLASS)
            .ok_or_else(|| format!("model classes lack the churn class {POSITIVE_CLASS}"))?;

        let coverage = SchemaCoverage::of(&schema);
        for key in &coverage.dropped {
            warn!(key = %key, "encoder output has no schema column; it will be ignored");
        }
        if !coverage.zero_filled.is_empty() {
            debug!(
                columns = ?coverage.zero_filled,
                "schema columns not produced by the encoder are always 0"
            );
        }

        Ok(Self {
            schema,
            classifier,
            positive_index,
        })
    }

    pub fn schema(&self) -> &SchemaColumns {
        &self.schema
    }

    /// Encode and align one set of attributes without invoking the model.
    pub fn encode_aligned(&self, raw: &RawAttributes) -> Result<AlignedVector> {
        let features = encode(raw)?;
        align(&features, &self.schema)
    }

    pub fn predict(&self, raw: &RawAttributes) -> Result<PredictionResult> {
        let aligned = self.encode_aligned(raw)?;
        self.predict_aligned(&aligned)
    }

    /// Run the classifier on an already aligned vector.
    pub fn predict_aligned(&self, aligned: &AlignedVector) -> Result<PredictionResult> {
        let values = aligned.values();
        let class = self.classifier.predict(values)?;
        let proba = self.classifier.predict_proba(values)?;
        let probability = self.churn_probability(&proba)?;

        let label = if class == POSITIVE_CLASS {
            ChurnLabel::Churn
        } else {
            ChurnLabel::Stay
        };
        debug!(?label, probability, "prediction complete");
        Ok(PredictionResult { label, probability })
    }

    fn churn_probability(&self, proba: &[f64]) -> std::result::Result<f64, ClassifierError> {
        let n_classes = self.classifier.classes().len();
        if proba.len() != n_classes {
            return Err(ClassifierError::MalformedOutput(format!(
                "{} probabilities for {} classes",
                proba.len(),
                n_classes
            )));
        }
        if let Some(p) = proba.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(ClassifierError::MalformedOutput(format!(
                "class probability {p} is outside [0, 1]"
            )));
        }
        Ok(proba[self.positive_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forest::LEAF;
    use crate::model::{DecisionTree, ForestModel, LogisticModel};

    /// Classifier with canned outputs for exercising result selection.
    struct Canned {
        classes: Vec<i64>,
        width: usize,
        label: i64,
        proba: Vec<f64>,
    }

    impl Classifier for Canned {
        fn classes(&self) -> &[i64] {
            &self.classes
        }

        fn n_features(&self) -> usize {
            self.width
        }

        fn predict(&self, _features: &[f64]) -> std::result::Result<i64, ClassifierError> {
            Ok(self.label)
        }

        fn predict_proba(&self, _features: &[f64]) -> std::result::Result<Vec<f64>, ClassifierError> {
            Ok(self.proba.clone())
        }
    }

    fn schema() -> SchemaColumns {
        SchemaColumns::new(["tenure", "gender_Male", "Contract_Two year"])
    }

    fn canned(classes: Vec<i64>, label: i64, proba: Vec<f64>) -> Box<dyn Classifier> {
        Box::new(Canned {
            classes,
            width: 3,
            label,
            proba,
        })
    }

    #[test]
    fn test_positive_class_probability_is_selected_by_label() {
        // Classes reported in reverse order: churn is at index 0.
        let predictor = Predictor::new(schema(), canned(vec![1, 0], 1, vec![0.8, 0.2])).unwrap();
        let result = predictor.predict(&RawAttributes::default()).unwrap();
        assert_eq!(result.label, ChurnLabel::Churn);
        assert_eq!(result.probability, 0.8);
    }

    #[test]
    fn test_stay_label_still_reports_churn_probability() {
        let predictor = Predictor::new(schema(), canned(vec![0, 1], 0, vec![0.9, 0.1])).unwrap();
        let result = predictor.predict(&RawAttributes::default()).unwrap();
        assert_eq!(result.label, ChurnLabel::Stay);
        assert_eq!(result.probability, 0.1);
    }

    #[test]
    fn test_malformed_probability_vector_propagates() {
        let predictor = Predictor::new(schema(), canned(vec![0, 1], 0, vec![1.0])).unwrap();
        let err = predictor.predict(&RawAttributes::default()).unwrap_err();
        assert!(matches!(
            err,
            ChurnError::Classifier(ClassifierError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_out_of_range_probability_is_malformed() {
        let predictor = Predictor::new(schema(), canned(vec![0, 1], 1, vec![-0.5, 1.5])).unwrap();
        assert!(predictor.predict(&RawAttributes::default()).is_err());

        let nan = Predictor::new(schema(), canned(vec![0, 1], 1, vec![0.5, f64::NAN])).unwrap();
        assert!(nan.predict(&RawAttributes::default()).is_err());

        // The churn entry is fine; the other class is not.
        let stay_nan =
            Predictor::new(schema(), canned(vec![0, 1], 1, vec![f64::NAN, 0.4])).unwrap();
        assert!(matches!(
            stay_nan.predict(&RawAttributes::default()),
            Err(ChurnError::Classifier(ClassifierError::MalformedOutput(_)))
        ));
    }

    #[test]
    fn test_rejects_malformed_forest_at_startup() {
        let tree = DecisionTree {
            children_left: vec![1, LEAF],
            children_right: vec![2, LEAF],
            feature: vec![0, -2],
            threshold: vec![1.0, -2.0],
            value: vec![vec![1.0, 1.0], vec![1.0, 0.0]],
        };
        let model = ForestModel {
            classes: vec![0, 1],
            n_features: 3,
            feature_names: None,
            trees: vec![tree],
        };
        let err = Predictor::new(schema(), Box::new(model)).unwrap_err();
        assert!(matches!(err, ChurnError::ModelLoad { .. }), "{err}");
        assert!(err.to_string().contains("tree 0"), "{err}");
    }

    #[test]
    fn test_rejects_width_mismatch() {
        let classifier = Box::new(Canned {
            classes: vec![0, 1],
            width: 5,
            label: 0,
            proba: vec![0.5, 0.5],
        });
        let err = Predictor::new(schema(), classifier).unwrap_err();
        assert!(err.to_string().contains("expects 5 features"));
    }

    #[test]
    fn test_rejects_missing_churn_class() {
        let err = Predictor::new(schema(), canned(vec![0, 2], 0, vec![0.5, 0.5])).unwrap_err();
        assert!(matches!(err, ChurnError::ModelLoad { .. }));
    }

    #[test]
    fn test_rejects_mismatched_feature_names() {
        let model = LogisticModel {
            classes: vec![0, 1],
            coefficients: vec![0.1, 0.2, 0.3],
            intercept: 0.0,
            feature_names: Some(vec![
                "gender_Male".to_string(),
                "tenure".to_string(),
                "Contract_Two year".to_string(),
            ]),
        };
        assert!(Predictor::new(schema(), Box::new(model)).is_err());
    }

    #[test]
    fn test_invalid_category_rejects_only_that_request() {
        let model = LogisticModel {
            classes: vec![0, 1],
            coefficients: vec![-0.05, 0.1, -1.5],
            intercept: 0.2,
            feature_names: None,
        };
        let predictor = Predictor::new(schema(), Box::new(model)).unwrap();

        let mut bad = RawAttributes::default();
        bad.gender = "Other".to_string();
        assert!(matches!(
            predictor.predict(&bad),
            Err(ChurnError::InvalidCategory { field: "gender", .. })
        ));
        assert!(predictor.predict(&RawAttributes::default()).is_ok());
    }

    #[test]
    fn test_logistic_end_to_end() {
        // logit = 0.2 - 0.05 * tenure + 0.1 * gender_Male - 1.5 * two_year
        let model = LogisticModel {
            classes: vec![0, 1],
            coefficients: vec![-0.05, 0.1, -1.5],
            intercept: 0.2,
            feature_names: None,
        };
        let predictor = Predictor::new(schema(), Box::new(model)).unwrap();

        let raw = RawAttributes {
            tenure: 2,
            gender: "Male".to_string(),
            ..RawAttributes::default()
        };
        let aligned = predictor.encode_aligned(&raw).unwrap();
        assert_eq!(aligned.values(), &[2.0, 1.0, 0.0]);

        let result = predictor.predict(&raw).unwrap();
        let expected = 1.0 / (1.0 + (-0.2f64).exp());
        assert!((result.probability - expected).abs() < 1e-12);
        assert_eq!(result.label, ChurnLabel::Churn);
    }

    #[test]
    fn test_display_matches_form_output() {
        let result = PredictionResult {
            label: ChurnLabel::Stay,
            probability: 0.123,
        };
        assert_eq!(result.to_string(), "Customer Likely to Stay\nProbability: 0.12");
    }

    #[test]
    fn test_serializes_lowercase_label() {
        let result = PredictionResult {
            label: ChurnLabel::Churn,
            probability: 0.75,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"label":"churn","probability":0.75}"#);
    }
}
