//! Request context normalization
//!
//! A coaching request carries user context. Only a small whitelist of
//! fields is meaningful to retrieval quality (goals, experience level,
//! available equipment, session focus); everything else - timestamps,
//! device info, session counters - is volatile noise that would either skew
//! the query embedding or make every cache fingerprint unique. The
//! whitelist lives in exactly one place (`stable_fields`) and is shared by
//! the retrieval engine and the cache fingerprinter.

use serde::{Deserialize, Serialize};

use crate::domain::metadata::Metadata;

/// User context accompanying a retrieval or generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalContext {
    /// Training goals, e.g. "hypertrophy", "marathon prep"
    #[serde(default)]
    pub goals: Vec<String>,
    /// Self-reported experience level, e.g. "beginner"
    #[serde(default)]
    pub experience_level: Option<String>,
    /// Equipment available to the user
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Focus of the current session, e.g. "upper body"
    #[serde(default)]
    pub focus: Option<String>,
    /// Everything else the caller sent along. Carried for logging and
    /// downstream prompting, deliberately excluded from embeddings and
    /// fingerprints.
    #[serde(default)]
    pub extra: Metadata,
}

impl RetrievalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goals.push(goal.into());
        self
    }

    pub fn with_experience_level(mut self, level: impl Into<String>) -> Self {
        self.experience_level = Some(level.into());
        self
    }

    pub fn with_equipment(mut self, item: impl Into<String>) -> Self {
        self.equipment.push(item.into());
        self
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<crate::domain::metadata::MetadataValue>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// The stability-relevant fields in a fixed order.
    ///
    /// Empty fields are omitted entirely so "no focus" and "focus unset"
    /// normalize identically. List fields are joined with commas in the
    /// caller-provided order.
    pub fn stable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();

        if !self.goals.is_empty() {
            fields.push(("goals", self.goals.join(",")));
        }
        if let Some(level) = &self.experience_level {
            if !level.trim().is_empty() {
                fields.push(("experience_level", level.trim().to_string()));
            }
        }
        if !self.equipment.is_empty() {
            fields.push(("equipment", self.equipment.join(",")));
        }
        if let Some(focus) = &self.focus {
            if !focus.trim().is_empty() {
                fields.push(("focus", focus.trim().to_string()));
            }
        }

        fields
    }

    /// Renders the stable fields as plain text for the query embedding.
    /// Returns an empty string when nothing relevant is set.
    pub fn as_embedding_text(&self) -> String {
        self.stable_fields()
            .into_iter()
            .map(|(name, value)| format!("{}: {}", name.replace('_', " "), value))
            .collect::<Vec<_>>()
            .join(". ")
    }

    pub fn is_empty(&self) -> bool {
        self.stable_fields().is_empty()
    }
}
