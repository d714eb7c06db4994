//! In-process fast cache tier
//!
//! Fixed-capacity map guarded by a `std::sync::Mutex`, evicting by least
//! recent access. Recency is a monotonic tick rather than wall-clock time,
//! so two reads in the same millisecond still order correctly and the
//! eviction victim is exact. Entries are always the logical, uncompressed
//! form; this tier exists for latency, not space. Process-local only - a
//! restart empties it and peers never see each other's entries.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::domain::cache::{CachedResponse, Endpoint};

#[derive(Debug)]
struct FastEntry {
    response: CachedResponse,
    tick: u64,
}

#[derive(Debug)]
pub struct FastTier {
    capacity: usize,
    tick: AtomicU64,
    entries: Mutex<HashMap<String, FastEntry>>,
}

impl FastTier {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: AtomicU64::new(0),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(fingerprint: &str, endpoint: Endpoint) -> String {
        format!("{}:{}", fingerprint, endpoint.as_str())
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, FastEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns a live entry, bumping its hit count, access time and recency.
    /// Expired entries are dropped on sight (lazy expiry applies here too).
    pub fn get(&self, fingerprint: &str, endpoint: Endpoint) -> Option<CachedResponse> {
        let key = Self::key(fingerprint, endpoint);
        let now = Utc::now();
        let mut entries = self.lock();

        match entries.get_mut(&key) {
            Some(entry) if entry.response.is_expired(now) => {
                entries.remove(&key);
                None
            }
            Some(entry) => {
                entry.response.touch(now);
                entry.tick = self.next_tick();
                Some(entry.response.clone())
            }
            None => None,
        }
    }

    /// Inserts or refreshes an entry. At capacity the entry with the oldest
    /// access tick is evicted first.
    pub fn insert(&self, response: CachedResponse) {
        let key = Self::key(&response.fingerprint, response.endpoint);
        let mut entries = self.lock();

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            if let Some(victim) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.tick)
                .map(|(k, _)| k.clone())
            {
                tracing::debug!(key = victim.as_str(), "fast tier full, evicting least recently used");
                entries.remove(&victim);
            }
        }

        entries.insert(
            key,
            FastEntry {
                response,
                tick: self.next_tick(),
            },
        );
    }

    pub fn remove(&self, fingerprint: &str, endpoint: Endpoint) -> bool {
        self.lock().remove(&Self::key(fingerprint, endpoint)).is_some()
    }

    /// Drops every entry for a user, optionally scoped to one endpoint.
    /// Returns how many entries were removed.
    pub fn remove_user(&self, user_id: &str, endpoint: Option<Endpoint>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.response.user_id != user_id
                || endpoint.is_some_and(|e| entry.response.endpoint != e)
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::cache::TokenUsage;

    fn response(fingerprint: &str, user: &str, endpoint: Endpoint) -> CachedResponse {
        CachedResponse::new(
            fingerprint,
            user,
            endpoint,
            "payload",
            TokenUsage::new(10, 20),
            "coach-v2",
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_get_bumps_hit_count_and_access_time() {
        let tier = FastTier::new(10);
        tier.insert(response("fp-1", "user-1", Endpoint::CoachChat));

        let first = tier.get("fp-1", Endpoint::CoachChat).unwrap();
        let second = tier.get("fp-1", Endpoint::CoachChat).unwrap();

        assert_eq!(first.hit_count, 1);
        assert_eq!(second.hit_count, 2);
        assert!(second.last_accessed_at >= first.last_accessed_at);
    }

    #[test]
    fn test_same_fingerprint_distinct_endpoints_coexist() {
        let tier = FastTier::new(10);
        tier.insert(response("fp-1", "user-1", Endpoint::CoachChat));
        tier.insert(response("fp-1", "user-1", Endpoint::WorkoutPlan));

        assert_eq!(tier.len(), 2);
        assert!(tier.get("fp-1", Endpoint::CoachChat).is_some());
        assert!(tier.get("fp-1", Endpoint::WorkoutPlan).is_some());
    }

    #[test]
    fn test_eviction_removes_exactly_the_least_recently_accessed() {
        let tier = FastTier::new(3);
        tier.insert(response("fp-a", "user-1", Endpoint::CoachChat));
        tier.insert(response("fp-b", "user-1", Endpoint::CoachChat));
        tier.insert(response("fp-c", "user-1", Endpoint::CoachChat));

        // Touch a and c so b is the oldest by access.
        tier.get("fp-a", Endpoint::CoachChat);
        tier.get("fp-c", Endpoint::CoachChat);

        tier.insert(response("fp-d", "user-1", Endpoint::CoachChat));

        assert_eq!(tier.len(), 3);
        assert!(tier.get("fp-b", Endpoint::CoachChat).is_none());
        assert!(tier.get("fp-a", Endpoint::CoachChat).is_some());
        assert!(tier.get("fp-c", Endpoint::CoachChat).is_some());
        assert!(tier.get("fp-d", Endpoint::CoachChat).is_some());
    }

    #[test]
    fn test_reinsert_refreshes_without_eviction() {
        let tier = FastTier::new(2);
        tier.insert(response("fp-a", "user-1", Endpoint::CoachChat));
        tier.insert(response("fp-b", "user-1", Endpoint::CoachChat));
        tier.insert(response("fp-a", "user-1", Endpoint::CoachChat));

        assert_eq!(tier.len(), 2);
        assert!(tier.get("fp-b", Endpoint::CoachChat).is_some());
    }

    #[test]
    fn test_expired_entry_is_dropped_on_read() {
        let tier = FastTier::new(10);
        let mut entry = response("fp-1", "user-1", Endpoint::CoachChat);
        entry.expires_at = entry.created_at; // expired immediately

        tier.insert(entry);

        assert!(tier.get("fp-1", Endpoint::CoachChat).is_none());
        assert!(tier.is_empty());
    }

    #[test]
    fn test_remove_user_scoped_and_unscoped() {
        let tier = FastTier::new(10);
        tier.insert(response("fp-a", "user-1", Endpoint::CoachChat));
        tier.insert(response("fp-b", "user-1", Endpoint::WorkoutPlan));
        tier.insert(response("fp-c", "user-2", Endpoint::CoachChat));

        assert_eq!(tier.remove_user("user-1", Some(Endpoint::CoachChat)), 1);
        assert!(tier.get("fp-b", Endpoint::WorkoutPlan).is_some());

        assert_eq!(tier.remove_user("user-1", None), 1);
        assert_eq!(tier.len(), 1);
        assert!(tier.get("fp-c", Endpoint::CoachChat).is_some());
    }
}
