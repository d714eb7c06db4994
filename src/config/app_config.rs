use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::Endpoint;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub vector_store: VectorStoreConfig,
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// Embedding widths the store accepts. Holds at least two because
    /// namespaces are occasionally re-embedded with a newer, differently
    /// sized model without a migration pass.
    pub accepted_dimensions: Vec<usize>,
    /// Keys fetched per object-store listing page during a scan
    pub scan_page_size: usize,
    /// Upper bound on any single object-store call
    pub op_timeout_ms: u64,
}

impl VectorStoreConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Namespaces known to be populated, searched when the caller does not
    /// name any
    pub default_namespaces: Vec<String>,
    pub default_top_k: usize,
    pub default_threshold: f32,
    /// Hard cap on the rendered evidence text, in bytes
    pub max_context_length: usize,
    /// Merge keeps `top_k * overfetch_factor` candidates across namespaces
    pub overfetch_factor: usize,
    /// Default overall deadline for one retrieval
    pub deadline_ms: u64,
    /// Upper bound on a single embedding call (per attempt)
    pub embed_timeout_ms: u64,
}

impl RetrievalConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Fast-tier entry capacity
    pub fast_capacity: usize,
    /// Payloads at or below this size are stored uncompressed; compression
    /// has fixed overhead not worth paying below it
    pub compression_threshold_bytes: usize,
    /// Per-endpoint TTLs in seconds, keyed by the endpoint's string form
    pub ttl_seconds: HashMap<String, u64>,
    /// Upper bound on any single durable-tier call
    pub op_timeout_ms: u64,
}

impl CacheConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// TTL for an endpoint, falling back to the coach-chat default when the
    /// table has no entry.
    pub fn ttl(&self, endpoint: Endpoint) -> Duration {
        let secs = self
            .ttl_seconds
            .get(endpoint.as_str())
            .copied()
            .unwrap_or(3600);
        Duration::from_secs(secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            accepted_dimensions: vec![1536, 3072],
            scan_page_size: 100,
            op_timeout_ms: 5_000,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_namespaces: vec![
                "exercises".to_string(),
                "nutrition".to_string(),
                "injury_prevention".to_string(),
                "research".to_string(),
            ],
            default_top_k: 5,
            default_threshold: 0.6,
            max_context_length: 4_000,
            overfetch_factor: 2,
            deadline_ms: 10_000,
            embed_timeout_ms: 5_000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let mut ttl_seconds = HashMap::new();
        ttl_seconds.insert("coach_chat".to_string(), 3_600);
        ttl_seconds.insert("workout_plan".to_string(), 86_400);
        ttl_seconds.insert("nutrition_advice".to_string(), 43_200);
        ttl_seconds.insert("injury_prevention".to_string(), 86_400);
        ttl_seconds.insert("research".to_string(), 21_600);

        Self {
            fast_capacity: 500,
            compression_threshold_bytes: 1_024,
            ttl_seconds,
            op_timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_accept_two_widths() {
        let config = AppConfig::default();
        assert_eq!(config.vector_store.accepted_dimensions, vec![1536, 3072]);
    }

    #[test]
    fn test_default_retrieval_parameters() {
        let retrieval = RetrievalConfig::default();
        assert_eq!(retrieval.default_top_k, 5);
        assert!((retrieval.default_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(retrieval.max_context_length, 4_000);
        assert!(retrieval.default_namespaces.contains(&"exercises".to_string()));
    }

    #[test]
    fn test_ttl_table_per_endpoint() {
        let cache = CacheConfig::default();
        assert_eq!(cache.ttl(Endpoint::CoachChat), Duration::from_secs(3_600));
        assert_eq!(cache.ttl(Endpoint::WorkoutPlan), Duration::from_secs(86_400));
        assert_eq!(cache.ttl(Endpoint::Research), Duration::from_secs(21_600));
    }

    #[test]
    fn test_ttl_falls_back_when_table_is_sparse() {
        let cache = CacheConfig {
            ttl_seconds: HashMap::new(),
            ..CacheConfig::default()
        };
        assert_eq!(cache.ttl(Endpoint::NutritionAdvice), Duration::from_secs(3_600));
    }
}
