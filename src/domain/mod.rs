//! Domain layer - entities, value types, and the traits at the seams

pub mod cache;
pub mod embedding;
pub mod error;
pub mod metadata;
pub mod object_store;
pub mod retrieval;
pub mod vector;

pub use cache::{CachedResponse, Endpoint, Fingerprinter, StoredCacheEntry, TokenUsage};
pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use metadata::{Metadata, MetadataValue};
pub use object_store::{ObjectPage, ObjectStore};
pub use retrieval::{BundleMeta, EvidenceBundle, RetrievalContext, RetrievalRequest};
pub use vector::{NamespaceStats, SearchQuery, SearchResult, VectorRecord, VectorStore, cosine_similarity};
