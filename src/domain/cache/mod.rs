//! Response cache entries and fingerprinting

mod entry;
mod fingerprint;

pub use entry::{CachedResponse, Endpoint, StoredCacheEntry, TokenUsage, durable_key};
pub use fingerprint::Fingerprinter;
