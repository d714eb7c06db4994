//! Evidence bundle produced by the retrieval engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::vector::SearchResult;

/// Bookkeeping about how a bundle was assembled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleMeta {
    /// Candidates seen across all namespaces before the merge cut
    pub total_candidates: usize,
    /// Namespaces the engine attempted to search
    pub namespaces_searched: Vec<String>,
    /// Results contributed per namespace (failed or empty namespaces report 0)
    pub per_namespace_counts: BTreeMap<String, usize>,
    /// Whether the rendered context was cut at the length limit
    pub truncated: bool,
    /// Set when the whole retrieval degraded (e.g. embedding unavailable);
    /// downstream generation decides whether to proceed without evidence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ranked, length-bounded evidence for a downstream generation step
///
/// Invariant: `context_text.len() <= max_context_length` for the limit the
/// engine was configured with; `sources` is in rank order for provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub context_text: String,
    pub sources: Vec<SearchResult>,
    pub meta: BundleMeta,
}

impl EvidenceBundle {
    /// Empty bundle carrying an error marker, for degraded retrievals
    pub fn degraded(namespaces: Vec<String>, error: impl Into<String>) -> Self {
        let per_namespace_counts = namespaces.iter().map(|ns| (ns.clone(), 0)).collect();

        Self {
            context_text: String::new(),
            sources: Vec::new(),
            meta: BundleMeta {
                total_candidates: 0,
                namespaces_searched: namespaces,
                per_namespace_counts,
                truncated: false,
                error: Some(error.into()),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
