//! Flat vector store over durable object storage
//!
//! Records live as JSON objects keyed `{namespace}/{id}`. Search is a
//! brute-force scan of the whole namespace: every record is paged in,
//! scored with clamped cosine similarity, filtered by threshold, and the
//! top k are returned. O(namespace size) per query is a stated design
//! constraint - namespaces are curated knowledge bases of thousands of
//! records, and exact scan semantics keep ordering deterministic. This is
//! the known scaling ceiling; an approximate index would change the
//! threshold/top-k contract and is deliberately not used.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::VectorStoreConfig;
use crate::domain::object_store::{ObjectPage, ObjectStore};
use crate::domain::vector::{
    NamespaceStats, SearchQuery, SearchResult, VectorRecord, VectorStore, cosine_similarity,
};
use crate::domain::DomainError;
use crate::infrastructure::retry::{RetryConfig, retry_with_backoff};

#[derive(Debug)]
pub struct FlatVectorStore {
    objects: Arc<dyn ObjectStore>,
    config: VectorStoreConfig,
    retry: RetryConfig,
}

impl FlatVectorStore {
    pub fn new(objects: Arc<dyn ObjectStore>, config: VectorStoreConfig) -> Self {
        Self {
            objects,
            config,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn namespace_prefix(namespace: &str) -> String {
        format!("{}/", namespace)
    }

    fn is_accepted_width(&self, width: usize) -> bool {
        self.config.accepted_dimensions.contains(&width)
    }

    async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.config.op_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::transient(format!(
                "object store call exceeded {:?}",
                self.config.op_timeout()
            ))),
        }
    }

    async fn get_object(&self, key: &str) -> Result<Option<String>, DomainError> {
        retry_with_backoff(&self.retry, "object_store.get", || {
            self.timed(self.objects.get(key))
        })
        .await
    }

    async fn list_page(
        &self,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ObjectPage, DomainError> {
        retry_with_backoff(&self.retry, "object_store.list", || {
            self.timed(self.objects.list(prefix, token, self.config.scan_page_size))
        })
        .await
    }

    /// Pages through a namespace, yielding records in listing order.
    /// Records that no longer parse are skipped with a warning rather than
    /// failing the scan.
    async fn scan_namespace(&self, namespace: &str) -> Result<Vec<VectorRecord>, DomainError> {
        let prefix = Self::namespace_prefix(namespace);
        let mut records = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.list_page(&prefix, token.as_deref()).await?;

            for key in &page.keys {
                let Some(json) = self.get_object(key).await? else {
                    // Deleted between the listing and the read; skip.
                    continue;
                };

                match serde_json::from_str::<VectorRecord>(&json) {
                    Ok(record) => records.push(record),
                    Err(error) => {
                        tracing::warn!(key, %error, "skipping unreadable vector record");
                    }
                }
            }

            match page.next_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl VectorStore for FlatVectorStore {
    async fn store(&self, record: VectorRecord) -> Result<(), DomainError> {
        if !self.is_accepted_width(record.dimensions) {
            return Err(DomainError::validation(format!(
                "Vector width {} is not accepted (accepted: {:?})",
                record.dimensions, self.config.accepted_dimensions
            )));
        }

        let key = record.key();
        let json = serde_json::to_string(&record)
            .map_err(|e| DomainError::storage(format!("Failed to serialize record: {}", e)))?;

        retry_with_backoff(&self.retry, "object_store.put", || {
            self.timed(self.objects.put(&key, &json))
        })
        .await?;

        tracing::debug!(key, dimensions = record.dimensions, "stored vector record");
        Ok(())
    }

    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>, DomainError> {
        if query.vector.is_empty() {
            return Err(DomainError::validation("Query vector must not be empty"));
        }
        if query.top_k == 0 {
            return Ok(Vec::new());
        }

        let records = self.scan_namespace(&query.namespace).await?;
        let scanned = records.len();

        // Scoring preserves scan (listing) order; the stable sort below
        // keeps that order for ties, so results are deterministic for a
        // fixed store state.
        let mut results: Vec<SearchResult> = records
            .into_iter()
            .map(|record| {
                let similarity = cosine_similarity(&query.vector, &record.vector);
                SearchResult::new(record.id, record.namespace, record.metadata, similarity)
            })
            .filter(|result| result.similarity >= query.similarity_threshold)
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(query.top_k);

        tracing::debug!(
            namespace = query.namespace,
            scanned,
            returned = results.len(),
            "namespace scan complete"
        );

        Ok(results)
    }

    async fn delete(&self, id: &str, namespace: &str) -> Result<bool, DomainError> {
        let key = format!("{}/{}", namespace, id);

        retry_with_backoff(&self.retry, "object_store.delete", || {
            self.timed(self.objects.delete(&key))
        })
        .await
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, DomainError> {
        let mut namespaces = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.list_page("", token.as_deref()).await?;

            for key in &page.keys {
                if let Some((namespace, _)) = key.split_once('/') {
                    if namespaces.last().map(String::as_str) != Some(namespace)
                        && !namespaces.iter().any(|n| n == namespace)
                    {
                        namespaces.push(namespace.to_string());
                    }
                }
            }

            match page.next_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        Ok(namespaces)
    }

    async fn namespace_stats(&self, namespace: &str) -> Result<NamespaceStats, DomainError> {
        let records = self.scan_namespace(namespace).await?;

        let mut stats = NamespaceStats::default();
        for record in &records {
            stats.count += 1;
            stats.total_bytes += record.approximate_bytes();
        }

        Ok(stats)
    }
}
