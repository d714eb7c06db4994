//! Vector records, similarity, and the store trait

mod record;
mod similarity;
mod store;

pub use record::VectorRecord;
pub use similarity::cosine_similarity;
pub use store::{NamespaceStats, SearchQuery, SearchResult, VectorStore};

#[cfg(test)]
pub use store::mock;
