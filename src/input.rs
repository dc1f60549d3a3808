use std::fmt::Display;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::info;

use crate::attributes::RawAttributes;
use crate::error::{ChurnError, Result};
use crate::model::{Classifier, ModelArtifact};
use crate::schema::SchemaColumns;

pub const DEFAULT_MODEL_PATH: &str = "churn_model.json";
pub const DEFAULT_COLUMNS_PATH: &str = "model_columns.json";

pub const SENIOR_CITIZEN_RANGE: RangeInclusive<u8> = 0..=1;
pub const TENURE_RANGE: RangeInclusive<u32> = 0..=100;
pub const MONTHLY_CHARGES_RANGE: RangeInclusive<f64> = 0.0..=200.0;
pub const TOTAL_CHARGES_RANGE: RangeInclusive<f64> = 0.0..=10000.0;

/// Locations of the two startup artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub columns: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            columns: PathBuf::from(DEFAULT_COLUMNS_PATH),
        }
    }
}

fn read_artifact(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ChurnError::model_load(path, e.to_string()))
}

/// Load the ordered schema columns: a JSON array of column names.
pub fn load_schema(path: &Path) -> Result<SchemaColumns> {
    let text = read_artifact(path)?;
    let names: Vec<String> = serde_json::from_str(&text)
        .map_err(|e| ChurnError::model_load(path, format!("invalid column list: {e}")))?;
    let schema = SchemaColumns::new(names);

    if schema.is_empty() {
        return Err(ChurnError::model_load(path, "column list is empty"));
    }
    if let Some(dup) = schema.first_duplicate() {
        return Err(ChurnError::model_load(
            path,
            format!("column {dup:?} is listed more than once"),
        ));
    }

    info!(path = %path.display(), columns = schema.len(), "loaded schema columns");
    Ok(schema)
}

/// Load and structurally validate a serialized model.
pub fn load_model(path: &Path) -> Result<Box<dyn Classifier>> {
    let text = read_artifact(path)?;
    let artifact: ModelArtifact = serde_json::from_str(&text)
        .map_err(|e| ChurnError::model_load(path, format!("invalid model file: {e}")))?;
    let kind = artifact.kind();
    let classifier = artifact.into_classifier();
    classifier
        .validate()
        .map_err(|reason| ChurnError::model_load(path, reason))?;

    info!(path = %path.display(), model_type = kind, "loaded model");
    Ok(classifier)
}

fn check_range<T: PartialOrd + Display>(
    name: &str,
    value: T,
    range: &RangeInclusive<T>,
) -> anyhow::Result<()> {
    if !range.contains(&value) {
        bail!(
            "{name} = {value} is outside {}..={}",
            range.start(),
            range.end()
        );
    }
    Ok(())
}

/// Bounds the form puts on the numeric attributes. The encoder does not
/// re-check them, so every input path runs this before encoding.
pub fn check_ranges(raw: &RawAttributes) -> anyhow::Result<()> {
    check_range("SeniorCitizen", raw.senior_citizen, &SENIOR_CITIZEN_RANGE)?;
    check_range("tenure", raw.tenure, &TENURE_RANGE)?;
    check_range("MonthlyCharges", raw.monthly_charges, &MONTHLY_CHARGES_RANGE)?;
    check_range("TotalCharges", raw.total_charges, &TOTAL_CHARGES_RANGE)?;
    Ok(())
}

/// Read one customer's attributes from a JSON object keyed like the form.
pub fn load_attributes(path: &Path) -> anyhow::Result<RawAttributes> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read attributes at {}", path.display()))?;
    let raw = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse attributes at {}", path.display()))?;
    check_ranges(&raw)
        .with_context(|| format!("attributes at {} are out of range", path.display()))?;
    info!(path = %path.display(), "loaded attributes file");
    Ok(raw)
}
