//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section has defaults so a bare environment still boots.

pub mod app;
pub mod cache;
pub mod collaborators;
pub mod database;
pub mod logging;
pub mod screening;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::cache::{CacheConfig, CacheTtlConfig, MemoryCacheConfig, RedisCacheConfig};
pub use self::collaborators::{CollaboratorsConfig, EndpointConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::screening::{RankingConfig, RetryConfig, ScreeningConfig};
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "SCREENING";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Worker pool settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Screening limits, retry policy, and ranking thresholds.
    #[serde(default)]
    pub screening: ScreeningConfig,
    /// External parser and analyzer endpoints.
    #[serde(default)]
    pub collaborators: CollaboratorsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file plus an environment overlay.
    ///
    /// The overlay file is `config/{env}.toml` where `env` comes from
    /// `SCREENING_ENV` (default `development`). Variables prefixed with
    /// `SCREENING__` override both, e.g. `SCREENING__WORKER__CONCURRENCY=8`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let env = std::env::var("SCREENING_ENV").unwrap_or_else(|_| "development".to_string());
        Self::load_with_env(path, &env)
    }

    /// Load configuration using an explicit environment name.
    pub fn load_with_env(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Reject combinations that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), AppError> {
        let ranking = &self.screening.ranking;
        if ranking.strong_threshold > 100 || ranking.moderate_threshold >= ranking.strong_threshold
        {
            return Err(AppError::configuration(format!(
                "Ranking thresholds must satisfy moderate < strong <= 100 (got {} / {})",
                ranking.moderate_threshold, ranking.strong_threshold
            )));
        }
        if self.screening.max_batch_size == 0 {
            return Err(AppError::configuration("screening.max_batch_size must be > 0"));
        }
        if self.screening.retry.max_attempts == 0 {
            return Err(AppError::configuration(
                "screening.retry.max_attempts must be at least 1",
            ));
        }
        if self.screening.retry.backoff_multiplier < 1.0 {
            return Err(AppError::configuration(
                "screening.retry.backoff_multiplier must be >= 1.0",
            ));
        }
        if self.screening.default_page_limit == 0
            || self.screening.default_page_limit > self.screening.max_page_limit
        {
            return Err(AppError::configuration(
                "screening.default_page_limit must be within 1..=max_page_limit",
            ));
        }
        if self.worker.concurrency == 0 {
            return Err(AppError::configuration("worker.concurrency must be > 0"));
        }
        if self.worker.lock_renewal_seconds == 0
            || self.worker.lock_renewal_seconds >= self.worker.lock_duration_seconds
        {
            return Err(AppError::configuration(
                "worker.lock_renewal_seconds must be shorter than worker.lock_duration_seconds",
            ));
        }
        Ok(())
    }
}
