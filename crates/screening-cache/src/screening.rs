//! Fail-open cache for the screening pipeline.
//!
//! Every read returns a value or a miss and every write returns nothing.
//! Provider errors and undecodable entries are logged at `warn` and then
//! forgotten, so the cache can slow a request down but never fail it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use screening_core::config::CacheTtlConfig;
use screening_core::traits::cache::CacheProvider;
use screening_entity::candidate::ParsedResume;
use screening_entity::requirements::JobRequirements;
use screening_entity::screening::{ResultFilter, ResultPage, ScreeningAnalytics};

use crate::keys;

/// Typed, fail-open view over a [`CacheProvider`].
#[derive(Debug, Clone)]
pub struct ScreeningCache {
    provider: Arc<dyn CacheProvider>,
    ttl: CacheTtlConfig,
}

impl ScreeningCache {
    /// Wrap a provider with the configured namespace TTLs.
    pub fn new(provider: Arc<dyn CacheProvider>, ttl: CacheTtlConfig) -> Self {
        Self { provider, ttl }
    }

    /// Read and decode a JSON entry; any failure is a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.provider.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                if let Err(e) = self.provider.delete(key).await {
                    warn!(key, error = %e, "Cache delete failed");
                }
                None
            }
        }
    }

    /// Encode and store a JSON entry; failures are logged only.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Cache value could not be encoded");
                return;
            }
        };
        if let Err(e) = self.provider.set(key, &json, ttl).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }

    /// Cached requirements of a job posting.
    pub async fn requirements(&self, job_id: Uuid) -> Option<JobRequirements> {
        self.get(&keys::job_requirements(job_id)).await
    }

    /// Store requirements of a job posting.
    pub async fn put_requirements(&self, requirements: &JobRequirements) {
        let key = keys::job_requirements(requirements.job_id);
        self.set(&key, requirements, self.ttl.requirements()).await;
    }

    /// Cached result page for a filter.
    pub async fn results_page(
        &self,
        screening_job_id: Uuid,
        filter: &ResultFilter,
    ) -> Option<ResultPage> {
        self.get(&keys::results_page(screening_job_id, filter)).await
    }

    /// Store a result page for a filter.
    pub async fn put_results_page(
        &self,
        screening_job_id: Uuid,
        filter: &ResultFilter,
        page: &ResultPage,
    ) {
        let key = keys::results_page(screening_job_id, filter);
        self.set(&key, page, self.ttl.results()).await;
    }

    /// Cached analytics of a screening job.
    pub async fn analytics(&self, screening_job_id: Uuid) -> Option<ScreeningAnalytics> {
        self.get(&keys::analytics(screening_job_id)).await
    }

    /// Store analytics of a screening job.
    pub async fn put_analytics(&self, screening_job_id: Uuid, analytics: &ScreeningAnalytics) {
        let key = keys::analytics(screening_job_id);
        self.set(&key, analytics, self.ttl.analytics()).await;
    }

    /// Cached parse of a candidate's resume.
    pub async fn candidate(&self, candidate_id: Uuid) -> Option<ParsedResume> {
        self.get(&keys::candidate(candidate_id)).await
    }

    /// Store the parse of a candidate's resume.
    pub async fn put_candidate(&self, candidate_id: Uuid, parsed: &ParsedResume) {
        let key = keys::candidate(candidate_id);
        self.set(&key, parsed, self.ttl.candidate()).await;
    }

    /// Drop every cached page and the analytics of a screening job.
    ///
    /// The deletion runs again after the configured replay delay, so a page
    /// stored by a reader that loaded its rows before the write does not
    /// outlive that delay.
    pub async fn invalidate_job(&self, screening_job_id: Uuid) {
        self.drop_job_entries(screening_job_id).await;

        if let Some(delay) = self.ttl.invalidation_replay() {
            let cache = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                cache.drop_job_entries(screening_job_id).await;
            });
        }
    }

    async fn drop_job_entries(&self, screening_job_id: Uuid) {
        let pattern = keys::results_pattern(screening_job_id);
        match self.provider.delete_pattern(&pattern).await {
            Ok(count) => debug!(%screening_job_id, count, "Invalidated cached result pages"),
            Err(e) => warn!(%screening_job_id, error = %e, "Result page invalidation failed"),
        }
        let key = keys::analytics(screening_job_id);
        if let Err(e) = self.provider.delete(&key).await {
            warn!(%screening_job_id, error = %e, "Analytics invalidation failed");
        }
    }

    /// Check the provider is reachable; errors count as unhealthy.
    pub async fn is_healthy(&self) -> bool {
        match self.provider.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Cache health check failed");
                false
            }
        }
    }
}
