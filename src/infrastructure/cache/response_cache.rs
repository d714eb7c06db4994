//! Tiered response cache
//!
//! Two tiers: the in-process [`FastTier`] for latency and a durable object
//! store for persistence across restarts. Reads check fast first, then
//! durable with lazy expiry; durable hits are decompressed, promoted, and
//! their hit count written back out of band so the read path never waits on
//! a durable write. Payloads above the configured threshold are
//! zstd-compressed in the durable tier only.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};

use crate::config::CacheConfig;
use crate::domain::cache::{CachedResponse, Endpoint, StoredCacheEntry, TokenUsage, durable_key};
use crate::domain::object_store::ObjectStore;
use crate::domain::DomainError;
use crate::infrastructure::retry::{RetryConfig, retry_with_backoff};

use super::fast_tier::FastTier;

const COMPRESSION_LEVEL: i32 = 3;

/// Process-lifetime cache counters
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    invalidations: AtomicU64,
    errors: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Hits over total lookups; 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_invalidations(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub struct ResponseCache {
    fast: FastTier,
    durable: Arc<dyn ObjectStore>,
    config: CacheConfig,
    retry: RetryConfig,
    stats: Arc<CacheStats>,
}

impl ResponseCache {
    pub fn new(durable: Arc<dyn ObjectStore>, config: CacheConfig) -> Self {
        Self {
            fast: FastTier::new(config.fast_capacity),
            durable,
            config,
            retry: RetryConfig::default(),
            stats: Arc::new(CacheStats::default()),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.config.op_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::transient(format!(
                "durable cache call exceeded {:?}",
                self.config.op_timeout()
            ))),
        }
    }

    /// Looks up a cached response. Durable-tier failures are absorbed as
    /// misses; the cache is an accelerator and must never take down the
    /// request path.
    pub async fn get(&self, fingerprint: &str, endpoint: Endpoint) -> Option<CachedResponse> {
        if let Some(response) = self.fast.get(fingerprint, endpoint) {
            tracing::debug!(fingerprint, %endpoint, tier = "fast", "cache hit");
            self.stats.record_hit();
            return Some(response);
        }

        let key = durable_key(fingerprint, endpoint);
        let json = match retry_with_backoff(&self.retry, "cache.durable.get", || {
            self.timed(self.durable.get(&key))
        })
        .await
        {
            Ok(Some(json)) => json,
            Ok(None) => {
                self.stats.record_miss();
                return None;
            }
            Err(error) => {
                tracing::warn!(key = key.as_str(), %error, "durable cache read failed, treating as miss");
                self.stats.record_error();
                self.stats.record_miss();
                return None;
            }
        };

        let entry: StoredCacheEntry = match serde_json::from_str(&json) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(key = key.as_str(), %error, "unreadable cache entry, treating as miss");
                self.stats.record_error();
                self.stats.record_miss();
                return None;
            }
        };

        let now = Utc::now();
        if entry.is_expired(now) {
            // Lazy expiry: drop the stale body out of band.
            let durable = Arc::clone(&self.durable);
            let op_timeout = self.config.op_timeout();
            tokio::spawn(async move {
                let _ = tokio::time::timeout(op_timeout, durable.delete(&key)).await;
            });
            self.stats.record_miss();
            return None;
        }

        let payload = match decode_payload(&entry) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(key = key.as_str(), %error, "failed to decode cached payload, treating as miss");
                self.stats.record_error();
                self.stats.record_miss();
                return None;
            }
        };

        let mut response = CachedResponse {
            fingerprint: entry.fingerprint.clone(),
            user_id: entry.user_id.clone(),
            endpoint: entry.endpoint,
            payload,
            tokens: entry.tokens,
            model: entry.model.clone(),
            created_at: entry.created_at,
            expires_at: entry.expires_at,
            hit_count: entry.hit_count,
            last_accessed_at: entry.last_accessed_at,
        };
        response.touch(now);

        tracing::debug!(fingerprint, %endpoint, tier = "durable", "cache hit, promoting");
        self.fast.insert(response.clone());
        self.spawn_hit_write_back(entry, response.hit_count, now, key);
        self.stats.record_hit();

        Some(response)
    }

    /// Caches a generated response in both tiers. TTL comes from the
    /// per-endpoint table; the durable form compresses payloads above the
    /// configured threshold, the fast tier always holds the raw payload.
    pub async fn put(
        &self,
        fingerprint: impl Into<String>,
        user_id: impl Into<String>,
        endpoint: Endpoint,
        payload: impl Into<String>,
        tokens: TokenUsage,
        model: impl Into<String>,
    ) -> Result<CachedResponse, DomainError> {
        let ttl = self.config.ttl(endpoint);
        let response = CachedResponse::new(fingerprint, user_id, endpoint, payload, tokens, model, ttl);

        let (stored_payload, compressed) = self.encode_payload(&response.payload)?;
        let entry = StoredCacheEntry {
            fingerprint: response.fingerprint.clone(),
            user_id: response.user_id.clone(),
            endpoint: response.endpoint,
            payload: stored_payload,
            compressed,
            tokens: response.tokens,
            model: response.model.clone(),
            created_at: response.created_at,
            expires_at: response.expires_at,
            hit_count: response.hit_count,
            last_accessed_at: response.last_accessed_at,
            ttl_seconds: ttl.as_secs() as i64,
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| DomainError::cache(format!("Failed to serialize cache entry: {}", e)))?;

        let key = response.key();
        retry_with_backoff(&self.retry, "cache.durable.put", || {
            self.timed(self.durable.put(&key, &json))
        })
        .await
        .map_err(|error| {
            self.stats.record_error();
            error
        })?;

        self.fast.insert(response.clone());
        self.stats.record_write();

        tracing::debug!(
            fingerprint = response.fingerprint.as_str(),
            %endpoint,
            compressed,
            ttl_seconds = ttl.as_secs(),
            "cached response"
        );

        Ok(response)
    }

    /// Removes one entry from both tiers. The fast-tier removal is
    /// guaranteed; the durable delete is best-effort.
    pub async fn invalidate_key(&self, fingerprint: &str, endpoint: Endpoint) {
        self.fast.remove(fingerprint, endpoint);

        let key = durable_key(fingerprint, endpoint);
        if let Err(error) = retry_with_backoff(&self.retry, "cache.durable.delete", || {
            self.timed(self.durable.delete(&key))
        })
        .await
        {
            tracing::warn!(fingerprint, %endpoint, %error, "durable cache delete failed");
            self.stats.record_error();
        }

        self.stats.record_invalidations(1);
    }

    /// Drops a user's entries from the fast tier, optionally scoped to one
    /// endpoint. Only the fast tier is cleared reliably: fingerprints are
    /// one-way, so there is no user-to-key index over the durable tier and
    /// its entries age out via TTL instead. Returns the number of fast-tier
    /// entries removed.
    pub fn invalidate_user(&self, user_id: &str, endpoint: Option<Endpoint>) -> usize {
        let removed = self.fast.remove_user(user_id, endpoint);
        self.stats.record_invalidations(removed as u64);

        tracing::debug!(user_id, removed, "invalidated user's fast-tier entries");
        removed
    }

    fn encode_payload(&self, payload: &str) -> Result<(String, bool), DomainError> {
        if payload.len() <= self.config.compression_threshold_bytes {
            return Ok((payload.to_string(), false));
        }

        let compressed = zstd::stream::encode_all(payload.as_bytes(), COMPRESSION_LEVEL)
            .map_err(|e| DomainError::cache(format!("Failed to compress payload: {}", e)))?;

        Ok((BASE64.encode(compressed), true))
    }

    /// Updates the durable entry's hit bookkeeping without blocking the
    /// read path. Failures only cost staleness of the counters.
    fn spawn_hit_write_back(
        &self,
        mut entry: StoredCacheEntry,
        hit_count: u64,
        now: DateTime<Utc>,
        key: String,
    ) {
        entry.hit_count = hit_count;
        entry.last_accessed_at = now;

        let durable = Arc::clone(&self.durable);
        let stats = Arc::clone(&self.stats);
        let op_timeout = self.config.op_timeout();

        tokio::spawn(async move {
            match serde_json::to_string(&entry) {
                Ok(json) => match tokio::time::timeout(op_timeout, durable.put(&key, &json)).await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        tracing::warn!(key = key.as_str(), %error, "hit-count write-back failed");
                        stats.record_error();
                    }
                    Err(_) => {
                        tracing::warn!(key = key.as_str(), "hit-count write-back timed out");
                        stats.record_error();
                    }
                },
                Err(error) => {
                    tracing::warn!(key = key.as_str(), %error, "hit-count write-back failed");
                    stats.record_error();
                }
            }
        });
    }
}

fn decode_payload(entry: &StoredCacheEntry) -> Result<String, DomainError> {
    if !entry.compressed {
        return Ok(entry.payload.clone());
    }

    let bytes = BASE64
        .decode(&entry.payload)
        .map_err(|e| DomainError::cache(format!("Invalid base64 in cache entry: {}", e)))?;
    let raw = zstd::stream::decode_all(&bytes[..])
        .map_err(|e| DomainError::cache(format!("Failed to decompress payload: {}", e)))?;

    String::from_utf8(raw).map_err(|e| DomainError::cache(format!("Corrupt cached payload: {}", e)))
}
