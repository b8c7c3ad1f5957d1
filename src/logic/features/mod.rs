//! Features Module - statistical features of an uploaded table

pub mod extractor;
pub mod moments;
pub mod vector;


// Re-export common types
pub use extractor::{calculate_features, FeatureError, PARSE_FAILURE};
pub use vector::{FeatureValue, FeatureVector};
