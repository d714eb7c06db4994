//! Cache entry types

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// Endpoint classes with distinct expiry characteristics
///
/// A workout plan stays valid far longer than a research summary, so TTLs
/// are assigned per endpoint rather than globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    CoachChat,
    WorkoutPlan,
    NutritionAdvice,
    InjuryPrevention,
    Research,
}

impl Endpoint {
    /// Stable string form used in keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoachChat => "coach_chat",
            Self::WorkoutPlan => "workout_plan",
            Self::NutritionAdvice => "nutrition_advice",
            Self::InjuryPrevention => "injury_prevention",
            Self::Research => "research",
        }
    }

    pub fn all() -> [Endpoint; 5] {
        [
            Self::CoachChat,
            Self::WorkoutPlan,
            Self::NutritionAdvice,
            Self::InjuryPrevention,
            Self::Research,
        ]
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token accounting for a generated response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

impl TokenUsage {
    pub fn new(input: u32, output: u32) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// A cached generated response in its logical (uncompressed) form
///
/// This is what the fast tier holds and what `get` returns. The durable
/// tier persists the same data as [`StoredCacheEntry`], possibly with a
/// compressed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub fingerprint: String,
    pub user_id: String,
    pub endpoint: Endpoint,
    pub payload: String,
    pub tokens: TokenUsage,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u64,
    pub last_accessed_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(
        fingerprint: impl Into<String>,
        user_id: impl Into<String>,
        endpoint: Endpoint,
        payload: impl Into<String>,
        tokens: TokenUsage,
        model: impl Into<String>,
        ttl: std::time::Duration,
    ) -> Self {
        let created_at = Utc::now();
        let expires_at = created_at
            + ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::seconds(0));

        Self {
            fingerprint: fingerprint.into(),
            user_id: user_id.into(),
            endpoint,
            payload: payload.into(),
            tokens,
            model: model.into(),
            created_at,
            expires_at,
            hit_count: 0,
            last_accessed_at: created_at,
        }
    }

    /// Lazy expiry: an entry past `expires_at` is logically absent even if
    /// still physically stored.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Records a read: bumps the hit count and access time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.hit_count += 1;
        self.last_accessed_at = now;
    }

    /// Durable-tier key for this entry
    pub fn key(&self) -> String {
        durable_key(&self.fingerprint, self.endpoint)
    }
}

/// Durable-tier key layout: `{fingerprint}/{endpoint}`
pub fn durable_key(fingerprint: &str, endpoint: Endpoint) -> String {
    format!("{}/{}", fingerprint, endpoint.as_str())
}

/// Durable-tier record: [`CachedResponse`] with the payload possibly
/// zstd-compressed and carried as base64. The fast tier never stores this
/// form; it exists for latency, not space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCacheEntry {
    pub fingerprint: String,
    pub user_id: String,
    pub endpoint: Endpoint,
    /// Raw payload, or base64(zstd(payload)) when `compressed`
    pub payload: String,
    pub compressed: bool,
    pub tokens: TokenUsage,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u64,
    pub last_accessed_at: DateTime<Utc>,
    /// TTL in seconds, consumed by the durable store's own expiry mechanism
    /// where available; in-application lazy expiry is the fallback.
    pub ttl_seconds: i64,
}

impl StoredCacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
