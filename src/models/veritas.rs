//! Veritas response model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::model::NEUTRAL_PROBABILITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub feature: String,
    pub description: String,
    pub impact: Impact,
}

impl Evidence {
    fn new(feature: &str, description: &str, impact: Impact) -> Self {
        Self {
            feature: feature.to_string(),
            description: description.to_string(),
            impact,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticityResult {
    pub request_id: Uuid,
    pub authenticity_score: u8,
    pub evidence: Vec<Evidence>,
}

impl AuthenticityResult {
    /// Build the response for a synthetic-class probability
    pub fn from_probability(synthetic_probability: f64) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            authenticity_score: authenticity_score(synthetic_probability),
            evidence: placeholder_evidence(),
        }
    }
}

/// `round((1 - p) * 100)`, always in [0, 100]
pub fn authenticity_score(synthetic_probability: f64) -> u8 {
    let p = if synthetic_probability.is_finite() {
        synthetic_probability.clamp(0.0, 1.0)
    } else {
        NEUTRAL_PROBABILITY
    };

    ((1.0 - p) * 100.0).round() as u8
}

/// Static evidence; not derived from the features yet
pub fn placeholder_evidence() -> Vec<Evidence> {
    vec![
        Evidence::new("Benford's Law", "Deviation is low", Impact::Low),
        Evidence::new("Column Correlation", "Correlation matrix appears normal", Impact::Medium),
    ]
}
