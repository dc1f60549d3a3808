use serde::Deserialize;

use super::{Classifier, ClassifierError, check_width, default_classes};

/// Binary logistic regression over the aligned feature vector.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl LogisticModel {
    /// Log-odds of the second class.
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        check_width(self.coefficients.len(), features)?;
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + dot)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticModel {
    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> Result<(), String> {
        if self.classes.len() != 2 {
            return Err(format!(
                "logistic regression needs exactly 2 classes, found {}",
                self.classes.len()
            ));
        }
        if self.coefficients.is_empty() {
            return Err("logistic regression has no coefficients".to_string());
        }
        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(format!("coefficient {i} is not finite"));
        }
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }
        if let Some(names) = &self.feature_names
            && names.len() != self.coefficients.len()
        {
            return Err(format!(
                "{} feature names for {} coefficients",
                names.len(),
                self.coefficients.len()
            ));
        }
        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        let z = self.decision_function(features)?;
        if !z.is_finite() {
            return Err(ClassifierError::MalformedOutput(format!(
                "decision function is {z}"
            )));
        }
        let p = sigmoid(z);
        Ok(vec![1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(coefficients: Vec<f64>, intercept: f64) -> LogisticModel {
        LogisticModel {
            classes: vec![0, 1],
            coefficients,
            intercept,
            feature_names: None,
        }
    }

    #[test]
    fn test_zero_logit_is_even_odds() {
        let m = model(vec![1.0, -1.0], 0.0);
        let proba = m.predict_proba(&[2.0, 2.0]).unwrap();
        assert!((proba[0] - 0.5).abs() < 1e-12);
        assert!((proba[1] - 0.5).abs() < 1e-12);
        // Ties resolve to the first class, matching a strict `> 0` decision.
        assert_eq!(m.predict(&[2.0, 2.0]).unwrap(), 0);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let m = model(vec![0.8, -0.3, 1.2], -0.5);
        for x in [[0.0, 0.0, 0.0], [1.0, 5.0, 0.0], [3.0, 0.0, 2.0]] {
            let proba = m.predict_proba(&x).unwrap();
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_known_probability() {
        // logit = -1.0 + 2.0 * 1.0 = 1.0
        let m = model(vec![2.0], -1.0);
        let proba = m.predict_proba(&[1.0]).unwrap();
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((proba[1] - expected).abs() < 1e-12);
        assert_eq!(m.predict(&[1.0]).unwrap(), 1);
    }

    #[test]
    fn test_extreme_logits_stay_in_range() {
        let m = model(vec![1.0], 0.0);
        let high = m.predict_proba(&[800.0]).unwrap();
        let low = m.predict_proba(&[-800.0]).unwrap();
        assert_eq!(high[1], 1.0);
        assert_eq!(low[1], 0.0);
    }

    #[test]
    fn test_width_mismatch() {
        let m = model(vec![1.0, 1.0], 0.0);
        assert_eq!(
            m.predict_proba(&[1.0]),
            Err(ClassifierError::InputWidth {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_artifacts() {
        assert!(model(vec![], 0.0).validate().is_err());
        assert!(model(vec![f64::NAN], 0.0).validate().is_err());
        assert!(model(vec![1.0], f64::INFINITY).validate().is_err());

        let mut three_classes = model(vec![1.0], 0.0);
        three_classes.classes = vec![0, 1, 2];
        assert!(three_classes.validate().is_err());

        let mut named = model(vec![1.0, 2.0], 0.0);
        named.feature_names = Some(vec!["tenure".to_string()]);
        assert!(named.validate().is_err());
    }
}
