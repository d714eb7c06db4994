//! Tiered response caching

mod fast_tier;
mod response_cache;

pub use fast_tier::FastTier;
pub use response_cache::{CacheStats, ResponseCache};
