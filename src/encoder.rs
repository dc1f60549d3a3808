//! One-hot encoding of raw form attributes into named model features.
//!
//! # Encoding rules
//!
//! Numeric fields pass through under their column names. Each categorical
//! field has one baseline category that encodes as all zeros; every other
//! category owns exactly one indicator column. Column names must match the
//! columns the classifier was trained on, character for character: a typo
//! here does not fail, it silently zero-fills the real column.

use std::collections::BTreeMap;

use tracing::debug;

use crate::attributes::{CategoricalField, RawAttributes};
use crate::error::{ChurnError, Result};

/// Pass-through numeric columns, in form order.
pub const NUMERIC_KEYS: [&str; 4] = ["SeniorCitizen", "tenure", "MonthlyCharges", "TotalCharges"];

/// One-hot rule for a single categorical field.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalRule {
    pub field: CategoricalField,
    /// Category encoded as all-zero indicators.
    pub baseline: &'static str,
    /// `(category, column)` pairs for every non-baseline category.
    pub indicators: &'static [(&'static str, &'static str)],
}

impl CategoricalRule {
    /// Every accepted category, baseline first.
    pub fn domain(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.baseline).chain(self.indicators.iter().map(|(category, _)| *category))
    }

    /// Indicator columns owned by this field.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indicators.iter().map(|(_, key)| *key)
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.domain().any(|category| category == value)
    }
}

pub const CATEGORICAL_RULES: &[CategoricalRule] = &[
    CategoricalRule {
        field: CategoricalField::Gender,
        baseline: "Female",
        indicators: &[("Male", "gender_Male")],
    },
    CategoricalRule {
        field: CategoricalField::Partner,
        baseline: "No",
        indicators: &[("Yes", "Partner_Yes")],
    },
    CategoricalRule {
        field: CategoricalField::Dependents,
        baseline: "No",
        indicators: &[("Yes", "Dependents_Yes")],
    },
    CategoricalRule {
        field: CategoricalField::PhoneService,
        baseline: "No",
        indicators: &[("Yes", "PhoneService_Yes")],
    },
    CategoricalRule {
        field: CategoricalField::InternetService,
        baseline: "DSL",
        indicators: &[
            ("Fiber optic", "InternetService_Fiber optic"),
            ("No", "InternetService_No"),
        ],
    },
    CategoricalRule {
        field: CategoricalField::Contract,
        baseline: "Month-to-month",
        indicators: &[
            ("One year", "Contract_One year"),
            ("Two year", "Contract_Two year"),
        ],
    },
    CategoricalRule {
        field: CategoricalField::PaperlessBilling,
        baseline: "No",
        indicators: &[("Yes", "PaperlessBilling_Yes")],
    },
    CategoricalRule {
        field: CategoricalField::OnlineSecurity,
        baseline: "No",
        indicators: &[
            ("Yes", "OnlineSecurity_Yes"),
            ("No internet service", "OnlineSecurity_No internet service"),
        ],
    },
    CategoricalRule {
        field: CategoricalField::DeviceProtection,
        baseline: "No",
        indicators: &[
            ("Yes", "DeviceProtection_Yes"),
            ("No internet service", "DeviceProtection_No internet service"),
        ],
    },
    CategoricalRule {
        field: CategoricalField::PaymentMethod,
        baseline: "Bank transfer (automatic)",
        indicators: &[
            (
                "Credit card (automatic)",
                "PaymentMethod_Credit card (automatic)",
            ),
            ("Electronic check", "PaymentMethod_Electronic check"),
            ("Mailed check", "PaymentMethod_Mailed check"),
        ],
    },
];

/// Look up the rule for a categorical field.
pub fn rule_for(field: CategoricalField) -> Option<&'static CategoricalRule> {
    CATEGORICAL_RULES.iter().find(|rule| rule.field == field)
}

/// Every column the encoder can emit: numerics first, then indicators in rule order.
pub fn encoded_keys() -> impl Iterator<Item = &'static str> {
    NUMERIC_KEYS
        .into_iter()
        .chain(CATEGORICAL_RULES.iter().flat_map(|rule| rule.keys()))
}

/// Named feature values produced for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap(BTreeMap<String, f64>);

impl FeatureMap {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        FeatureMap(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Encode one set of form attributes.
///
/// Fails with [`ChurnError::InvalidCategory`] when a categorical field holds
/// a label outside its domain.
pub fn encode(raw: &RawAttributes) -> Result<FeatureMap> {
    let mut features = BTreeMap::new();

    let numerics = [
        f64::from(raw.senior_citizen),
        f64::from(raw.tenure),
        raw.monthly_charges,
        raw.total_charges,
    ];
    for (key, value) in NUMERIC_KEYS.into_iter().zip(numerics) {
        features.insert(key.to_string(), value);
    }

    for rule in CATEGORICAL_RULES {
        let selected = raw.category(rule.field);
        if !rule.accepts(selected) {
            return Err(ChurnError::InvalidCategory {
                field: rule.field.name(),
                value: selected.to_string(),
            });
        }
        for (category, key) in rule.indicators {
            let hot = if *category == selected { 1.0 } else { 0.0 };
            features.insert(key.to_string(), hot);
        }
    }

    debug!(features = features.len(), "encoded raw attributes");
    Ok(FeatureMap(features))
}
