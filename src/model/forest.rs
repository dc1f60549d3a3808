use serde::Deserialize;

use super::{Classifier, ClassifierError, check_width, default_classes};

/// Marker in `children_left`/`children_right` for a leaf node.
pub const LEAF: i64 = -1;

/// One fitted decision tree, stored as parallel per-node arrays.
///
/// A sample at a split node goes left when `x[feature] <= threshold`.
/// `value[node]` holds per-class weights; only leaf rows are read.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree node arrays differ in length".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {node} has exactly one child"));
                }
                let weights = &self.value[node];
                if weights.len() != n_classes {
                    return Err(format!(
                        "leaf {node} has {} class weights, expected {n_classes}",
                        weights.len()
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0)
                    || weights.iter().sum::<f64>() <= 0.0
                {
                    return Err(format!("leaf {node} has invalid class weights"));
                }
                continue;
            }
            // Children always follow their parent, so traversal terminates.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {node} has out-of-order child {child}"));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {node} has a NaN threshold"));
            }
        }
        Ok(())
    }

    /// Normalized class weights of the leaf `features` falls into.
    ///
    /// Bounds are checked on every step, so an unvalidated tree yields an
    /// error instead of a panic.
    pub fn leaf_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        let broken = |node: usize| {
            ClassifierError::MalformedOutput(format!("tree node {node} is out of bounds"))
        };
        let mut node = 0usize;
        // A well-formed path visits each node at most once.
        for _ in 0..=self.node_count() {
            let left = *self.children_left.get(node).ok_or_else(|| broken(node))?;
            if left == LEAF {
                let weights = self.value.get(node).ok_or_else(|| broken(node))?;
                let total: f64 = weights.iter().sum();
                return Ok(weights.iter().map(|w| w / total).collect());
            }
            let right = *self.children_right.get(node).ok_or_else(|| broken(node))?;
            let feature = *self.feature.get(node).ok_or_else(|| broken(node))?;
            let threshold = *self.threshold.get(node).ok_or_else(|| broken(node))?;
            let x = usize::try_from(feature)
                .ok()
                .and_then(|f| features.get(f))
                .ok_or_else(|| {
                    ClassifierError::MalformedOutput(format!(
                        "node {node} splits on unknown feature {feature}"
                    ))
                })?;
            let next = if *x <= threshold { left } else { right };
            node = usize::try_from(next).map_err(|_| broken(node))?;
        }
        Err(ClassifierError::MalformedOutput(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }
}

/// Random forest classifier; probabilities are averaged over trees.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<DecisionTree>,
}

impl Classifier for ForestModel {
    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err(format!(
                "random forest needs at least 2 classes, found {}",
                self.classes.len()
            ));
        }
        if self.n_features == 0 {
            return Err("random forest declares no input features".to_string());
        }
        if self.trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        if let Some(names) = &self.feature_names
            && names.len() != self.n_features
        {
            return Err(format!(
                "{} feature names for {} input features",
                names.len(),
                self.n_features
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        check_width(self.n_features, features)?;
        if self.trees.is_empty() {
            return Err(ClassifierError::MalformedOutput(
                "random forest has no trees".to_string(),
            ));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf_proba(features)?;
            if leaf.len() != proba.len() {
                return Err(ClassifierError::MalformedOutput(format!(
                    "leaf reports {} classes, forest has {}",
                    leaf.len(),
                    proba.len()
                )));
            }
            for (acc, p) in proba.iter_mut().zip(leaf) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}
