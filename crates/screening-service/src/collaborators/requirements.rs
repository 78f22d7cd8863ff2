//! Job postings table as a requirements source.

use async_trait::async_trait;
use uuid::Uuid;

use screening_core::result::AppResult;
use screening_database::repositories::JobPostingRepository;
use screening_entity::requirements::JobRequirements;

use super::RequirementsSource;

#[async_trait]
impl RequirementsSource for JobPostingRepository {
    async fn find_requirements(&self, job_id: Uuid) -> AppResult<Option<JobRequirements>> {
        JobPostingRepository::find_requirements(self, job_id).await
    }
}
