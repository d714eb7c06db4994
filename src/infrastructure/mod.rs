//! Infrastructure layer - concrete implementations behind the domain seams

pub mod cache;
pub mod logging;
pub mod object_store;
pub mod retrieval;
pub mod retry;
pub mod vector;

pub use cache::{CacheStats, FastTier, ResponseCache};
pub use object_store::InMemoryObjectStore;
pub use retrieval::RetrievalEngine;
pub use retry::{RetryConfig, retry_with_backoff};
pub use vector::FlatVectorStore;
