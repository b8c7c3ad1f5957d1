//! Veritas core: table parsing, feature extraction and scoring

pub mod features;
pub mod model;
pub mod table;
