//! Typed record metadata
//!
//! Knowledge records carry loosely-structured descriptive fields (name,
//! muscle groups, instructions, tags). Instead of an untyped JSON map, the
//! value space is a closed set of variants so the evidence renderer and the
//! persisted format stay type-safe.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    StringList(Vec<String>),
}

impl MetadataValue {
    /// Returns the value as a string slice, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

/// Ordered string-keyed metadata map
///
/// `BTreeMap` keeps serialization and rendering order stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    /// Convenience accessor for string-valued fields
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(MetadataValue::as_str)
    }

    pub fn get_str_list(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).and_then(MetadataValue::as_str_list)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let meta = Metadata::new()
            .with("name", "Push-Up")
            .with("sets", 3i64)
            .with("weighted", false)
            .with("tags", vec!["chest".to_string(), "bodyweight".to_string()]);

        assert_eq!(meta.get_str("name"), Some("Push-Up"));
        assert_eq!(meta.get("sets").and_then(MetadataValue::as_i64), Some(3));
        assert_eq!(meta.get("weighted").and_then(MetadataValue::as_bool), Some(false));
        assert_eq!(
            meta.get_str_list("tags"),
            Some(&["chest".to_string(), "bodyweight".to_string()][..])
        );
        assert!(meta.get_str("missing").is_none());
    }

    #[test]
    fn test_wrong_variant_accessor_returns_none() {
        let meta = Metadata::new().with("sets", 3i64);
        assert!(meta.get_str("sets").is_none());
    }

    #[test]
    fn test_serialization_is_plain_json() {
        let meta = Metadata::new().with("name", "Squat").with("difficulty", 2i64);

        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"difficulty":2,"name":"Squat"}"#);

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_integer_coerces_to_float() {
        let meta = Metadata::new().with("reps", 12i64);
        assert_eq!(meta.get("reps").and_then(MetadataValue::as_f64), Some(12.0));
    }
}
