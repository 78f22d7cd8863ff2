//! Job posting repository (read-only).

use sqlx::PgPool;
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::requirements::JobRequirements;

/// Reads the requirements of externally managed job postings.
#[derive(Debug, Clone)]
pub struct JobPostingRepository {
    pool: PgPool,
}

impl JobPostingRepository {
    /// Create a new job posting repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the requirements of a posting.
    pub async fn find_requirements(&self, job_id: Uuid) -> AppResult<Option<JobRequirements>> {
        sqlx::query_as::<_, JobRequirements>(
            "SELECT id AS job_id, title, description, skills_required, nice_to_have_skills, \
             experience_required_years, expected_strengths \
             FROM job_postings WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to load job requirements", e)
        })
    }
}
