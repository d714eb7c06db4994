//! Durable object store seam
//!
//! Backs both the vector store and the durable cache tier. Keys are flat
//! compound paths (`{namespace}/{id}` for vectors, `{fingerprint}/{endpoint}`
//! for cache entries); values are JSON documents. The only listing primitive
//! is prefix listing with pagination, which is all the full-namespace scan
//! needs.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// One page of keys under a prefix
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    /// Keys in this page, in the store's stable listing order
    pub keys: Vec<String>,
    /// Token to pass back for the next page; `None` when exhausted
    pub next_token: Option<String>,
}

/// Flat durable object store
///
/// Implementations must list keys under a prefix in a stable order for a
/// fixed store state; the vector scan's tie-break determinism relies on it.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Writes an object, overwriting any existing value (last write wins)
    async fn put(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Reads an object, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Deletes an object; returns `false` when it did not exist
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Lists up to `limit` keys under `prefix`, resuming from `page_token`
    async fn list(
        &self,
        prefix: &str,
        page_token: Option<&str>,
        limit: usize,
    ) -> Result<ObjectPage, DomainError>;
}
