//! Schema columns and alignment of encoded features onto them.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::encoder::{FeatureMap, encoded_keys};
use crate::error::{ChurnError, Result};

/// Ordered feature names the classifier was trained on.
///
/// Cloning shares the underlying list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumns {
    names: Arc<[String]>,
}

impl SchemaColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(|name| name.into()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// First column name that appears more than once.
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.names
            .iter()
            .find(|name| !seen.insert(name.as_str()))
            .map(String::as_str)
    }
}

/// Feature values laid out in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    columns: SchemaColumns,
    values: Vec<f64>,
}

impl AlignedVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn columns(&self) -> &SchemaColumns {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.position(name).map(|i| self.values[i])
    }

    /// `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Project `features` onto `schema`.
///
/// Columns missing from `features` are filled with 0; features the schema
/// does not name are dropped.
pub fn align(features: &FeatureMap, schema: &SchemaColumns) -> Result<AlignedVector> {
    if schema.is_empty() {
        return Err(ChurnError::SchemaUnavailable);
    }

    let values: Vec<f64> = schema
        .names()
        .iter()
        .map(|name| features.get(name).unwrap_or(0.0))
        .collect();

    debug!(
        columns = values.len(),
        features = features.len(),
        "aligned features to schema"
    );
    Ok(AlignedVector {
        columns: schema.clone(),
        values,
    })
}

/// How the encoder's output lines up with a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaCoverage {
    /// Schema columns the encoder fills, in schema order.
    pub mapped: Vec<String>,
    /// Schema columns the encoder never produces; always aligned to 0.
    pub zero_filled: Vec<String>,
    /// Encoder keys the schema does not name; always dropped.
    pub dropped: Vec<String>,
}

impl SchemaCoverage {
    pub fn of(schema: &SchemaColumns) -> Self {
        let produced: HashSet<&str> = encoded_keys().collect();
        let (mapped, zero_filled): (Vec<String>, Vec<String>) = schema
            .names()
            .iter()
            .cloned()
            .partition(|name| produced.contains(name.as_str()));
        let dropped = encoded_keys()
            .filter(|key| schema.position(key).is_none())
            .map(str::to_string)
            .collect();

        SchemaCoverage {
            mapped,
            zero_filled,
            dropped,
        }
    }
}
