//! Semantic retrieval and response caching engine for an AI fitness
//! coaching assistant.
//!
//! Three cooperating pieces:
//!
//! - a namespace-partitioned vector store over flat durable object storage
//!   ([`infrastructure::vector::FlatVectorStore`]), searched by exact
//!   brute-force cosine scan;
//! - a retrieval engine ([`infrastructure::retrieval::RetrievalEngine`])
//!   that embeds a coaching query, fans out across knowledge namespaces
//!   concurrently, and assembles a ranked, length-bounded evidence bundle -
//!   degrading instead of failing when parts are unavailable;
//! - a tiered response cache ([`infrastructure::cache::ResponseCache`])
//!   keyed by semantic request fingerprints, with an in-process LRU fast
//!   tier and a compressed durable tier with per-endpoint TTLs.
//!
//! Embedding providers and the durable object store are seams
//! ([`domain::EmbeddingProvider`], [`domain::ObjectStore`]); callers inject
//! their own implementations.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    CachedResponse, DomainError, EmbeddingProvider, Endpoint, EvidenceBundle, Fingerprinter,
    Metadata, ObjectStore, RetrievalContext, RetrievalRequest, SearchQuery, SearchResult,
    TokenUsage, VectorRecord, VectorStore,
};
pub use infrastructure::{
    FlatVectorStore, InMemoryObjectStore, ResponseCache, RetrievalEngine, RetryConfig,
};
