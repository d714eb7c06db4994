//! In-memory object store
//!
//! Default backing for tests and single-process deployments. A `BTreeMap`
//! keeps keys ordered, so prefix listing is stable across calls for a fixed
//! store state - the vector scan's tie-break determinism depends on that.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::object_store::{ObjectPage, ObjectStore};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, String>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), DomainError> {
        if key.is_empty() {
            return Err(DomainError::validation("Object key must not be empty"));
        }

        self.objects
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.objects.write().await.remove(key).is_some())
    }

    async fn list(
        &self,
        prefix: &str,
        page_token: Option<&str>,
        limit: usize,
    ) -> Result<ObjectPage, DomainError> {
        if limit == 0 {
            return Err(DomainError::validation("Listing limit must be positive"));
        }

        let objects = self.objects.read().await;

        let keys: Vec<String> = objects
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .filter(|k| page_token.is_none_or(|t| k.as_str() > t))
            .take(limit)
            .cloned()
            .collect();

        // A full page may have more behind it; a short page is the end.
        let next_token = if keys.len() == limit {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage { keys, next_token })
    }
}
