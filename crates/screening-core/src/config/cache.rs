//! Cache provider configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific cache configuration.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// In-memory cache configuration.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
    /// Per-namespace entry lifetimes.
    #[serde(default)]
    pub ttl: CacheTtlConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
            ttl: CacheTtlConfig::default(),
        }
    }
}

/// Redis cache backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Extra namespace for a shared Redis, joined to keys with `:`.
    /// Empty keeps the plain `screening:...` keys.
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: String::new(),
        }
    }
}

/// In-memory cache backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries in the cache.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

/// Entry lifetimes for each cache namespace, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTtlConfig {
    /// Job requirements (`screening:job:*`).
    #[serde(default = "default_requirements_ttl")]
    pub requirements_seconds: u64,
    /// Result pages (`screening:results:*`).
    #[serde(default = "default_hour")]
    pub results_seconds: u64,
    /// Analytics summaries (`screening:analytics:*`).
    #[serde(default = "default_hour")]
    pub analytics_seconds: u64,
    /// Parsed candidate profiles (`screening:candidate:*`).
    #[serde(default = "default_candidate_ttl")]
    pub candidate_seconds: u64,
    /// Delay before a job invalidation is repeated, clearing pages that a
    /// concurrent reader stored from rows read before the write. 0 disables.
    #[serde(default = "default_invalidation_replay")]
    pub invalidation_replay_ms: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            requirements_seconds: default_requirements_ttl(),
            results_seconds: default_hour(),
            analytics_seconds: default_hour(),
            candidate_seconds: default_candidate_ttl(),
            invalidation_replay_ms: default_invalidation_replay(),
        }
    }
}

impl CacheTtlConfig {
    pub fn requirements(&self) -> Duration {
        Duration::from_secs(self.requirements_seconds)
    }

    pub fn results(&self) -> Duration {
        Duration::from_secs(self.results_seconds)
    }

    pub fn analytics(&self) -> Duration {
        Duration::from_secs(self.analytics_seconds)
    }

    pub fn candidate(&self) -> Duration {
        Duration::from_secs(self.candidate_seconds)
    }

    /// `None` when invalidations are not repeated.
    pub fn invalidation_replay(&self) -> Option<Duration> {
        (self.invalidation_replay_ms > 0).then(|| Duration::from_millis(self.invalidation_replay_ms))
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_requirements_ttl() -> u64 {
    24 * 60 * 60
}

fn default_hour() -> u64 {
    60 * 60
}

fn default_candidate_ttl() -> u64 {
    30 * 60
}

fn default_invalidation_replay() -> u64 {
    500
}
