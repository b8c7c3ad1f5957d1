//! Model Manifest - training-time contract of the classifier
//!
//! Optional JSON sidecar next to the model file:
//!
//! ```json
//! {
//!   "feature_names": ["row_count", "column_count", "price_mean"],
//!   "synthetic_class_index": 1,
//!   "output_name": "probabilities",
//!   "sha256": "9f86d08..."
//! }
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::features::{FeatureValue, FeatureVector};
use super::inference::InferenceError;

/// Value fed to the model for a feature that is absent or null
const MISSING_FEATURE_VALUE: f32 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Feature columns in training order
    pub feature_names: Vec<String>,

    /// Index of the "synthetic" class in the probability output
    #[serde(default = "default_synthetic_class_index")]
    pub synthetic_class_index: usize,

    /// Name of the probability output tensor
    #[serde(default)]
    pub output_name: Option<String>,

    /// Expected SHA-256 of the model file (hex)
    #[serde(default)]
    pub sha256: Option<String>,
}

fn default_synthetic_class_index() -> usize {
    1
}

impl ModelManifest {
    /// Read a manifest. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, InferenceError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::Manifest(format!("{}: {}", path.display(), e)))?;
        let manifest: Self = serde_json::from_str(&content)
            .map_err(|e| InferenceError::Manifest(format!("{}: {}", path.display(), e)))?;

        if manifest.feature_names.is_empty() {
            return Err(InferenceError::Manifest(format!(
                "{}: feature_names is empty",
                path.display()
            )));
        }

        Ok(Some(manifest))
    }

    /// Model input row in training order, plus the number of features
    /// that had to be filled in.
    pub fn feature_row(&self, features: &FeatureVector) -> (Vec<f32>, usize) {
        let mut filled = 0;
        let row = self
            .feature_names
            .iter()
            .map(|name| match features.get(name).and_then(FeatureValue::as_f64) {
                Some(value) => value as f32,
                None => {
                    filled += 1;
                    MISSING_FEATURE_VALUE
                }
            })
            .collect();

        (row, filled)
    }
}

/// Model input row in the vector's own order (no manifest available)
pub fn insertion_order_row(features: &FeatureVector) -> Vec<f32> {
    features
        .iter()
        .map(|(_, value)| value.as_f64().map(|v| v as f32).unwrap_or(MISSING_FEATURE_VALUE))
        .collect()
}

/// Sidecar path used when none is configured: `model.onnx` -> `model.json`
pub fn default_manifest_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("json")
}

/// Hex SHA-256 of a file
pub fn file_sha256(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_features() -> FeatureVector {
        let mut v = FeatureVector::new();
        v.insert("row_count", FeatureValue::Number(10.0));
        v.insert("column_count", FeatureValue::Number(2.0));
        v.insert("price_mean", FeatureValue::Number(3.5));
        v.insert("price_std", FeatureValue::Null);
        v.insert("name_uniqueness_ratio", FeatureValue::Number(0.9));
        v
    }

    #[test]
    fn test_feature_row_follows_manifest_order() {
        let manifest = ModelManifest {
            feature_names: vec![
                "price_mean".to_string(),
                "row_count".to_string(),
                "price_std".to_string(),
                "unknown_feature".to_string(),
            ],
            synthetic_class_index: 1,
            output_name: None,
            sha256: None,
        };

        let (row, filled) = manifest.feature_row(&sample_features());
        assert_eq!(row, vec![3.5, 10.0, 0.0, 0.0]);
        assert_eq!(filled, 2);
    }

    #[test]
    fn test_insertion_order_row() {
        let row = insertion_order_row(&sample_features());
        assert_eq!(row, vec![10.0, 2.0, 3.5, 0.0, 0.9]);
    }

    #[test]
    fn test_load_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"feature_names": ["row_count"]}}"#).unwrap();

        let manifest = ModelManifest::load(&path).unwrap().unwrap();
        assert_eq!(manifest.feature_names, vec!["row_count".to_string()]);
        assert_eq!(manifest.synthetic_class_index, 1);
        assert_eq!(manifest.output_name, None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ModelManifest::load(&dir.path().join("absent.json")).unwrap(), None);
    }

    #[test]
    fn test_load_rejects_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert!(matches!(ModelManifest::load(&broken), Err(InferenceError::Manifest(_))));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, r#"{"feature_names": []}"#).unwrap();
        assert!(matches!(ModelManifest::load(&empty), Err(InferenceError::Manifest(_))));
    }

    #[test]
    fn test_default_manifest_path() {
        assert_eq!(
            default_manifest_path(Path::new("ml_models/authenticity_model.onnx")),
            PathBuf::from("ml_models/authenticity_model.json")
        );
    }

    #[test]
    fn test_file_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            file_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
