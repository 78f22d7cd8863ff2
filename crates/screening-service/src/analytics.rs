//! Cached per-job analytics.

use std::sync::Arc;

use uuid::Uuid;

use screening_cache::ScreeningCache;
use screening_core::result::AppResult;
use screening_database::ScreeningStore;
use screening_entity::screening::{MatchBands, ScreeningAnalytics};

/// Aggregates a job's scores, reading through the cache.
#[derive(Debug, Clone)]
pub struct AnalyticsAggregator {
    store: Arc<dyn ScreeningStore>,
    cache: ScreeningCache,
    bands: MatchBands,
}

impl AnalyticsAggregator {
    /// Creates a new aggregator.
    pub fn new(store: Arc<dyn ScreeningStore>, cache: ScreeningCache, bands: MatchBands) -> Self {
        Self {
            store,
            cache,
            bands,
        }
    }

    /// Summary of a job's results.
    pub async fn get(&self, screening_job_id: Uuid) -> AppResult<ScreeningAnalytics> {
        if let Some(analytics) = self.cache.analytics(screening_job_id).await {
            return Ok(analytics);
        }
        let analytics = self.store.analytics(screening_job_id, self.bands).await?;
        self.cache.put_analytics(screening_job_id, &analytics).await;
        Ok(analytics)
    }
}
