//! Read-through access to job posting requirements.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use screening_cache::ScreeningCache;
use screening_core::error::AppError;
use screening_core::result::AppResult;
use screening_entity::requirements::JobRequirements;

use crate::collaborators::RequirementsSource;

/// Serves requirements from the cache, falling back to the posting source.
#[derive(Debug, Clone)]
pub struct RequirementsService {
    /// Where postings live.
    source: Arc<dyn RequirementsSource>,
    /// Fail-open cache.
    cache: ScreeningCache,
}

impl RequirementsService {
    /// Creates a new requirements service.
    pub fn new(source: Arc<dyn RequirementsSource>, cache: ScreeningCache) -> Self {
        Self { source, cache }
    }

    /// Requirements of a posting; a posting that does not exist is `NotFound`.
    pub async fn get(&self, job_id: Uuid) -> AppResult<JobRequirements> {
        if let Some(requirements) = self.cache.requirements(job_id).await {
            return Ok(requirements);
        }

        let requirements = self
            .source
            .find_requirements(job_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Requirements for job {job_id} not found")))?;

        debug!(%job_id, "Loaded job requirements from source");
        self.cache.put_requirements(&requirements).await;
        Ok(requirements)
    }
}
