//! Embedding provider trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for text embedding providers
///
/// The engine treats the provider as an opaque text-to-vector function with
/// quota and latency characteristics. Failures surface as `Transient` when
/// they may be retried and as `EmbeddingUnavailable` once retries are spent.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate an embedding for the given text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Identity of the embedding model (part of cache fingerprints)
    fn model_id(&self) -> &str;

    /// Width of the vectors this provider produces
    fn dimensions(&self) -> usize;
}
