//! Authenticity Scorer - ONNX Runtime classifier
//!
//! Loaded once at startup and shared read-only by every request.
//! If the model cannot be loaded the scorer stays usable and answers
//! every call with the neutral probability.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array2;
use parking_lot::Mutex;
use serde::Serialize;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use crate::logic::features::FeatureVector;
use super::manifest::{file_sha256, insertion_order_row, ModelManifest};

/// Probability returned whenever the model cannot answer
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Conventional name of the probability output of exported classifiers
const PROBABILITY_OUTPUT: &str = "probabilities";

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("invalid model manifest: {0}")]
    Manifest(String),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("invalid model output: {0}")]
    InvalidOutput(String),
}

// ============================================================================
// STATE
// ============================================================================

struct LoadedModel {
    // ONNX sessions need exclusive access while running
    session: Mutex<Session>,
    manifest: Option<ModelManifest>,
    output_name: String,
}

enum ModelState {
    Loaded(LoadedModel),
    Unavailable(String),
}

/// Scorer status for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ScorerStatus {
    pub model_loaded: bool,
    pub model_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
    pub inference_count: u64,
}

pub struct AuthenticityScorer {
    model_path: PathBuf,
    state: ModelState,
    inference_count: AtomicU64,
}

impl AuthenticityScorer {
    /// Load the classifier and its optional manifest.
    /// Never fails: a load error puts the scorer in degraded mode.
    pub fn load(model_path: impl AsRef<Path>, manifest_path: impl AsRef<Path>) -> Self {
        let model_path = model_path.as_ref().to_path_buf();
        tracing::info!("Loading authenticity model from: {}", model_path.display());

        let state = match load_model(&model_path, manifest_path.as_ref()) {
            Ok(model) => {
                tracing::info!(
                    "Authenticity model loaded (output '{}', {} manifest features)",
                    model.output_name,
                    model.manifest.as_ref().map(|m| m.feature_names.len()).unwrap_or(0)
                );
                ModelState::Loaded(model)
            }
            Err(e) => {
                tracing::warn!("Authenticity model unavailable, scoring with neutral probability: {}", e);
                ModelState::Unavailable(e.to_string())
            }
        };

        Self {
            model_path,
            state,
            inference_count: AtomicU64::new(0),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ModelState::Loaded(_))
    }

    pub fn status(&self) -> ScorerStatus {
        ScorerStatus {
            model_loaded: self.is_loaded(),
            model_path: self.model_path.display().to_string(),
            unavailable_reason: match &self.state {
                ModelState::Unavailable(reason) => Some(reason.clone()),
                ModelState::Loaded(_) => None,
            },
            inference_count: self.inference_count.load(Ordering::Relaxed),
        }
    }

    /// Probability that the features describe a synthetic dataset
    pub fn try_predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let model = match &self.state {
            ModelState::Loaded(model) => model,
            ModelState::Unavailable(reason) => return Err(InferenceError::Unavailable(reason.clone())),
        };

        let start_time = std::time::Instant::now();

        let (row, class_index) = match &model.manifest {
            Some(manifest) => {
                let (row, filled) = manifest.feature_row(features);
                if filled > 0 {
                    tracing::debug!("{} of {} model features were filled with 0", filled, row.len());
                }
                (row, manifest.synthetic_class_index)
            }
            None => (insertion_order_row(features), 1),
        };

        let width = row.len();
        let input_array = Array2::<f32>::from_shape_vec((1, width), row)
            .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = model.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&model.output_name)
            .ok_or_else(|| InferenceError::InvalidOutput(format!("no output named '{}'", model.output_name)))?;

        let (_, probabilities) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(format!("Extract error: {}", e)))?;

        let probability = probabilities
            .get(class_index)
            .copied()
            .map(f64::from)
            .ok_or_else(|| {
                InferenceError::InvalidOutput(format!(
                    "class index {} out of range for {} probabilities",
                    class_index,
                    probabilities.len()
                ))
            })?;

        self.inference_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Inference on {} features took {}us",
            width,
            start_time.elapsed().as_micros()
        );

        validate_probability(probability)
    }

    /// Like `try_predict`, but any failure yields the neutral probability
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        match self.try_predict(features) {
            Ok(probability) => probability,
            Err(InferenceError::Unavailable(_)) => {
                tracing::debug!("Model not loaded, returning neutral probability");
                NEUTRAL_PROBABILITY
            }
            Err(e) => {
                tracing::error!("Authenticity inference failed, returning neutral probability: {}", e);
                NEUTRAL_PROBABILITY
            }
        }
    }
}

fn validate_probability(probability: f64) -> Result<f64, InferenceError> {
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(InferenceError::InvalidOutput(format!("probability {} outside [0, 1]", probability)))
    }
}

// ============================================================================
// LOADING
// ============================================================================

fn load_model(model_path: &Path, manifest_path: &Path) -> Result<LoadedModel, InferenceError> {
    if !model_path.exists() {
        return Err(InferenceError::ModelNotFound(model_path.display().to_string()));
    }

    let manifest = ModelManifest::load(manifest_path)?;
    if manifest.is_none() {
        tracing::warn!(
            "No model manifest at {}, features will be fed in extraction order",
            manifest_path.display()
        );
    }

    if let Some(expected) = manifest.as_ref().and_then(|m| m.sha256.as_deref()) {
        let actual = file_sha256(model_path)?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(InferenceError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
    }

    let session = Session::builder()
        .map_err(|e| InferenceError::Runtime(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| InferenceError::Runtime(format!("Failed to set optimization: {}", e)))?
        .commit_from_file(model_path)
        .map_err(|e| InferenceError::Runtime(format!("Failed to load model: {}", e)))?;

    let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
    let output_name = select_output(manifest.as_ref(), &output_names)?;

    Ok(LoadedModel {
        session: Mutex::new(session),
        manifest,
        output_name,
    })
}

/// Manifest choice, else `probabilities`, else the last output
fn select_output(manifest: Option<&ModelManifest>, outputs: &[String]) -> Result<String, InferenceError> {
    if let Some(wanted) = manifest.and_then(|m| m.output_name.as_ref()) {
        return if outputs.contains(wanted) {
            Ok(wanted.clone())
        } else {
            Err(InferenceError::Manifest(format!(
                "output '{}' not in model outputs {:?}",
                wanted, outputs
            )))
        };
    }

    if outputs.iter().any(|name| name == PROBABILITY_OUTPUT) {
        return Ok(PROBABILITY_OUTPUT.to_string());
    }

    outputs
        .last()
        .cloned()
        .ok_or_else(|| InferenceError::Runtime("model defines no outputs".to_string()))
}
