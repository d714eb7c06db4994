//! Retrieval request

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::RetrievalContext;

/// A retrieval request: the user's query plus normalized coaching context.
///
/// Namespaces, top_k and threshold are optional overrides; unset fields
/// fall back to the engine's configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalRequest {
    pub query: String,
    #[serde(default)]
    pub context: RetrievalContext,
    #[serde(default)]
    pub namespaces: Option<Vec<String>>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
    /// Overall deadline for this retrieval; searches still running when it
    /// elapses are dropped and the best evidence so far is returned.
    #[serde(default)]
    pub deadline: Option<Duration>,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: RetrievalContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Text fed to the embedding provider: the query, then the stable
    /// context fields when any are set.
    pub fn embedding_text(&self) -> String {
        let context_text = self.context.as_embedding_text();
        if context_text.is_empty() {
            self.query.trim().to_string()
        } else {
            format!("{}. {}", self.query.trim(), context_text)
        }
    }
}
