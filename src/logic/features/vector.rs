//! Feature Vector - named statistics in insertion order
//!
//! Values are JSON-safe by construction: a non-finite number is stored
//! as null. Every feature is numeric, so there is no text variant.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Null,
}

impl FeatureValue {
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            FeatureValue::Number(value)
        } else {
            FeatureValue::Null
        }
    }

    /// `None` (statistic undefined) becomes null
    pub fn from_option(value: Option<f64>) -> Self {
        value.map(Self::number).unwrap_or(FeatureValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FeatureValue::Null)
    }

    fn sanitized(self) -> Self {
        match self {
            FeatureValue::Number(value) => Self::number(value),
            FeatureValue::Null => FeatureValue::Null,
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Number(value) => serializer.serialize_f64(*value),
            FeatureValue::Null => serializer.serialize_none(),
        }
    }
}

/// Ordered feature name -> value mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, FeatureValue)>,
    /// name -> position in `entries`
    positions: HashMap<String, usize>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a feature, keeping its first position
    pub fn insert(&mut self, name: impl Into<String>, value: FeatureValue) {
        let name = name.into();
        let value = value.sanitized();

        match self.positions.get(&name) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.positions
            .get(name)
            .map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
