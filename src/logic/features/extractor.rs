//! Feature Extractor - table statistics for the authenticity model

use serde::Serialize;

use crate::logic::table::{ColumnKind, FileType, TabularPayload};
use super::moments::describe;
use super::vector::{FeatureValue, FeatureVector};

/// Message returned for any payload that cannot be read as a table
pub const PARSE_FAILURE: &str = "Failed to parse the file.";

/// Reportable extraction failure, serialized as `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{error}")]
pub struct FeatureError {
    pub error: String,
}

impl FeatureError {
    pub fn parse_failure() -> Self {
        Self { error: PARSE_FAILURE.to_string() }
    }
}

/// Parse an uploaded payload and compute its feature vector
pub fn calculate_features(bytes: &[u8], file_type: FileType) -> Result<FeatureVector, FeatureError> {
    let table = TabularPayload::parse(bytes, file_type).map_err(|e| {
        tracing::warn!("Failed to read {} payload ({} bytes): {}", file_type.as_str(), bytes.len(), e);
        FeatureError::parse_failure()
    })?;

    let features = extract(&table);
    tracing::debug!(
        "Extracted {} features from {}x{} table",
        features.len(),
        table.row_count(),
        table.column_count()
    );

    Ok(features)
}

/// Compute features for an already parsed table
pub fn extract(table: &TabularPayload) -> FeatureVector {
    let mut features = FeatureVector::new();
    let row_count = table.row_count();

    features.insert("row_count", FeatureValue::number(row_count as f64));
    features.insert("column_count", FeatureValue::number(table.column_count() as f64));

    for column in table.columns() {
        match column.kind() {
            ColumnKind::Numeric => {
                let moments = describe(&column.numeric_values());
                features.insert(format!("{}_mean", column.name), FeatureValue::from_option(moments.mean));
                features.insert(format!("{}_std", column.name), FeatureValue::from_option(moments.std));
                features.insert(format!("{}_skew", column.name), FeatureValue::from_option(moments.skew));
                features.insert(
                    format!("{}_kurtosis", column.name),
                    FeatureValue::from_option(moments.kurtosis),
                );
            }
            ColumnKind::Categorical => {
                let ratio = if row_count > 0 {
                    column.distinct_count() as f64 / row_count as f64
                } else {
                    0.0
                };
                features.insert(format!("{}_uniqueness_ratio", column.name), FeatureValue::number(ratio));
            }
        }
    }

    features
}
