//! Vector store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::metadata::Metadata;

use super::record::VectorRecord;

/// A single search hit, ephemeral and produced per query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub namespace: String,
    pub metadata: Metadata,
    /// Clamped cosine similarity in `[0, 1]`
    pub similarity: f32,
}

impl SearchResult {
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        metadata: Metadata,
        similarity: f32,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            metadata,
            similarity,
        }
    }
}

/// Per-namespace record count and approximate stored bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStats {
    pub count: usize,
    pub total_bytes: usize,
}

/// Search arguments
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub namespace: String,
    pub top_k: usize,
    pub similarity_threshold: f32,
}

impl SearchQuery {
    pub fn new(vector: Vec<f32>, namespace: impl Into<String>) -> Self {
        Self {
            vector,
            namespace: namespace.into(),
            top_k: 5,
            similarity_threshold: 0.6,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

/// Namespace-partitioned vector store
///
/// Search is a full-namespace scan: O(namespace size) per query. That is a
/// design constraint, not an accident - namespaces are curated knowledge
/// bases holding thousands of records, not millions, and exact scan
/// semantics keep result ordering deterministic. Do not swap in an
/// approximate index without re-deriving the threshold/top-k contract.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Stores a record; an existing record with the same id in the same
    /// namespace is overwritten (idempotent write).
    async fn store(&self, record: VectorRecord) -> Result<(), DomainError>;

    /// Scans the namespace and returns up to `top_k` results with
    /// `similarity >= similarity_threshold`, sorted descending by
    /// similarity. Ties keep scan arrival order, which is deterministic
    /// for a fixed store state.
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>, DomainError>;

    /// Deletes a record; returns `false` if it did not exist.
    async fn delete(&self, id: &str, namespace: &str) -> Result<bool, DomainError>;

    /// Lists namespaces that currently hold at least one record.
    async fn list_namespaces(&self) -> Result<Vec<String>, DomainError>;

    /// Record count and approximate byte size for a namespace.
    async fn namespace_stats(&self, namespace: &str) -> Result<NamespaceStats, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;
    use crate::domain::vector::similarity::cosine_similarity;

    /// Mock vector store with per-namespace scripted failures and delays
    #[derive(Debug, Default)]
    pub struct MockVectorStore {
        records: Mutex<Vec<VectorRecord>>,
        failing_namespaces: Mutex<HashSet<String>>,
        slow_namespaces: Mutex<HashMap<String, std::time::Duration>>,
    }

    impl MockVectorStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_record(self, record: VectorRecord) -> Self {
            self.records.lock().unwrap().push(record);
            self
        }

        /// Every search against this namespace fails deterministically
        pub fn with_failing_namespace(self, namespace: impl Into<String>) -> Self {
            self.failing_namespaces.lock().unwrap().insert(namespace.into());
            self
        }

        /// Searches against this namespace stall for `delay` before answering
        pub fn with_slow_namespace(
            self,
            namespace: impl Into<String>,
            delay: std::time::Duration,
        ) -> Self {
            self.slow_namespaces.lock().unwrap().insert(namespace.into(), delay);
            self
        }
    }

    #[async_trait]
    impl VectorStore for MockVectorStore {
        async fn store(&self, record: VectorRecord) -> Result<(), DomainError> {
            let mut records = self.records.lock().unwrap();
            records.retain(|r| !(r.id == record.id && r.namespace == record.namespace));
            records.push(record);
            Ok(())
        }

        async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>, DomainError> {
            let delay = self.slow_namespaces.lock().unwrap().get(&query.namespace).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if self.failing_namespaces.lock().unwrap().contains(&query.namespace) {
                return Err(DomainError::transient(format!(
                    "namespace '{}' is unreachable",
                    query.namespace
                )));
            }

            let records = self.records.lock().unwrap();
            let mut results: Vec<SearchResult> = records
                .iter()
                .filter(|r| r.namespace == query.namespace)
                .map(|r| {
                    SearchResult::new(
                        &r.id,
                        &r.namespace,
                        r.metadata.clone(),
                        cosine_similarity(&query.vector, &r.vector),
                    )
                })
                .filter(|r| r.similarity >= query.similarity_threshold)
                .collect();

            results.sort_by(|a, b| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            results.truncate(query.top_k);
            Ok(results)
        }

        async fn delete(&self, id: &str, namespace: &str) -> Result<bool, DomainError> {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| !(r.id == id && r.namespace == namespace));
            Ok(records.len() < before)
        }

        async fn list_namespaces(&self) -> Result<Vec<String>, DomainError> {
            let records = self.records.lock().unwrap();
            let mut counts: HashMap<String, usize> = HashMap::new();
            for r in records.iter() {
                *counts.entry(r.namespace.clone()).or_insert(0) += 1;
            }
            let mut namespaces: Vec<String> = counts.into_keys().collect();
            namespaces.sort();
            Ok(namespaces)
        }

        async fn namespace_stats(&self, namespace: &str) -> Result<NamespaceStats, DomainError> {
            let records = self.records.lock().unwrap();
            let mut stats = NamespaceStats::default();
            for r in records.iter().filter(|r| r.namespace == namespace) {
                stats.count += 1;
                stats.total_bytes += r.approximate_bytes();
            }
            Ok(stats)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::metadata::Metadata;

        fn record(id: &str, namespace: &str, vector: Vec<f32>) -> VectorRecord {
            VectorRecord::new(id, namespace, vector, Metadata::new()).unwrap()
        }

        #[tokio::test]
        async fn test_mock_store_and_search() {
            let store = MockVectorStore::new()
                .with_record(record("a", "exercises", vec![1.0, 0.0]))
                .with_record(record("b", "exercises", vec![0.0, 1.0]));

            let results = store
                .search(SearchQuery::new(vec![1.0, 0.0], "exercises").with_similarity_threshold(0.9))
                .await
                .unwrap();

            assert_eq!(results.len(), 1);
            assert_eq!(results[0].id, "a");
        }

        #[tokio::test]
        async fn test_mock_failing_namespace() {
            let store = MockVectorStore::new().with_failing_namespace("nutrition");

            let result = store.search(SearchQuery::new(vec![1.0], "nutrition")).await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_delete_and_stats() {
            let store = MockVectorStore::new()
                .with_record(record("a", "exercises", vec![1.0, 0.0]));

            assert!(store.delete("a", "exercises").await.unwrap());
            assert!(!store.delete("a", "exercises").await.unwrap());
            assert_eq!(
                store.namespace_stats("exercises").await.unwrap(),
                NamespaceStats::default()
            );
        }
    }
}
