//! Retrieval engine
//!
//! Orchestrates one retrieval: embed the query, fan out across namespaces,
//! merge and rank, render a length-bounded evidence text. Retrieval is an
//! enrichment step for generation, so `retrieve` never returns an error -
//! every failure degrades to a smaller (possibly empty) bundle with the
//! failure recorded in `meta`, and generation decides what to do without
//! evidence.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::config::RetrievalConfig;
use crate::domain::DomainError;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::retrieval::{BundleMeta, EvidenceBundle, RetrievalRequest};
use crate::domain::vector::{SearchQuery, SearchResult, VectorStore};
use crate::infrastructure::retry::{RetryConfig, retry_with_backoff};

#[derive(Debug)]
pub struct RetrievalEngine {
    embeddings: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStore>,
    config: RetrievalConfig,
    retry: RetryConfig,
}

impl RetrievalEngine {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embeddings,
            vectors,
            config,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Runs one retrieval and always produces a bundle.
    ///
    /// A namespace that fails or overruns the deadline contributes zero
    /// results; only a failed query embedding empties the whole bundle,
    /// marked in `meta.error`.
    pub async fn retrieve(&self, request: RetrievalRequest) -> EvidenceBundle {
        let namespaces = request
            .namespaces
            .clone()
            .unwrap_or_else(|| self.config.default_namespaces.clone());
        let top_k = request.top_k.unwrap_or(self.config.default_top_k);
        let threshold = request
            .similarity_threshold
            .unwrap_or(self.config.default_threshold);

        let embedding_text = request.embedding_text();
        let embed_timeout = self.config.embed_timeout();
        let embedding = match retry_with_backoff(&self.retry, "embedding.embed", || async {
            match tokio::time::timeout(embed_timeout, self.embeddings.embed(&embedding_text)).await
            {
                Ok(result) => result,
                Err(_) => Err(DomainError::transient(format!(
                    "embedding call exceeded {:?}",
                    embed_timeout
                ))),
            }
        })
        .await
        {
            Ok(vector) => vector,
            Err(error) => {
                tracing::warn!(%error, "query embedding unavailable, returning empty evidence");
                return EvidenceBundle::degraded(
                    namespaces,
                    format!("embedding unavailable: {}", error),
                );
            }
        };

        let deadline = request.deadline.unwrap_or_else(|| self.config.deadline());

        // Each namespace contributes at most top_k candidates; the merged
        // cut below keeps top_k * overfetch_factor, so a dominant namespace
        // cannot fill the whole bundle.
        let searches = namespaces.iter().map(|namespace| {
            let query = SearchQuery::new(embedding.clone(), namespace.clone())
                .with_top_k(top_k)
                .with_similarity_threshold(threshold);

            async move {
                match tokio::time::timeout(deadline, self.vectors.search(query)).await {
                    Ok(Ok(results)) => Some(results),
                    Ok(Err(error)) => {
                        tracing::warn!(
                            namespace = namespace.as_str(),
                            %error,
                            "namespace search failed, contributing no results"
                        );
                        None
                    }
                    Err(_) => {
                        tracing::warn!(
                            namespace = namespace.as_str(),
                            deadline_ms = deadline.as_millis() as u64,
                            "namespace search overran the deadline, contributing no results"
                        );
                        None
                    }
                }
            }
        });

        let per_namespace = join_all(searches).await;
        let all_failed = !namespaces.is_empty() && per_namespace.iter().all(Option::is_none);

        let mut per_namespace_counts = BTreeMap::new();
        let mut candidates: Vec<SearchResult> = Vec::new();
        for (namespace, results) in namespaces.iter().zip(per_namespace) {
            let results = results.unwrap_or_default();
            per_namespace_counts.insert(namespace.clone(), results.len());
            candidates.extend(results);
        }
        let total_candidates = candidates.len();

        // Stable sort: ties keep namespace declaration order, then each
        // store's own deterministic order.
        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(top_k.saturating_mul(self.config.overfetch_factor.max(1)));

        let (context_text, truncated) =
            assemble_context(&candidates, self.config.max_context_length);

        tracing::debug!(
            total_candidates,
            kept = candidates.len(),
            context_bytes = context_text.len(),
            truncated,
            "retrieval complete"
        );

        EvidenceBundle {
            context_text,
            sources: candidates,
            meta: BundleMeta {
                total_candidates,
                namespaces_searched: namespaces,
                per_namespace_counts,
                truncated,
                error: all_failed.then(|| "all namespace searches failed".to_string()),
            },
        }
    }
}

const BLOCK_SEPARATOR: &str = "\n\n";
const EXCERPT_CHARS: usize = 200;

/// Renders one result as a human-readable block. Only fields actually
/// present in the metadata appear; there are no placeholders.
fn render_block(result: &SearchResult) -> String {
    let meta = &result.metadata;
    let mut lines = Vec::new();

    if let Some(name) = meta.get_str("name").or_else(|| meta.get_str("title")) {
        lines.push(format!("## {}", name));
    }
    if let Some(description) = meta.get_str("description") {
        lines.push(description.to_string());
    }
    if let Some(summary) = meta.get_str("summary") {
        lines.push(summary.to_string());
    }
    if let Some(instructions) = meta.get_str("instructions") {
        lines.push(format!("Instructions: {}", excerpt(instructions)));
    }
    if let Some(tags) = meta.get_str_list("tags") {
        if !tags.is_empty() {
            lines.push(format!("Tags: {}", tags.join(", ")));
        }
    }
    lines.push(format!("Relevance: {:.2}", result.similarity));

    lines.join("\n")
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Concatenates blocks in rank order up to `limit` bytes. Cuts fall at
/// block boundaries; only when the very first block alone overflows is it
/// hard-cut at a char boundary.
fn assemble_context(results: &[SearchResult], limit: usize) -> (String, bool) {
    let mut text = String::new();
    let mut truncated = false;

    for result in results {
        let block = render_block(result);
        let needed = if text.is_empty() {
            block.len()
        } else {
            text.len() + BLOCK_SEPARATOR.len() + block.len()
        };

        if needed > limit {
            truncated = true;
            if text.is_empty() {
                let mut cut = limit;
                while cut > 0 && !block.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.push_str(&block[..cut]);
            }
            break;
        }

        if !text.is_empty() {
            text.push_str(BLOCK_SEPARATOR);
        }
        text.push_str(&block);
    }

    (text, truncated)
}
