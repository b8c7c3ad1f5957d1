//! Model Module - authenticity classifier
//!
//! Inference is kept apart from feature extraction so the model can be
//! swapped without touching the statistics.

pub mod inference;
pub mod manifest;

// Re-export common types
pub use inference::{AuthenticityScorer, InferenceError, ScorerStatus, NEUTRAL_PROBABILITY};
pub use manifest::{default_manifest_path, ModelManifest};
