//! Staged resume repository.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::candidate::StagedResume;

/// Repository for resume payloads staged at intake.
#[derive(Debug, Clone)]
pub struct ResumeRepository {
    pool: PgPool,
}

impl ResumeRepository {
    /// Create a new resume repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a staged resume by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StagedResume>> {
        sqlx::query_as::<_, StagedResume>("SELECT * FROM screening_resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to load resume", e))
    }

    /// Insert a staged resume inside an open transaction.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        resume: &StagedResume,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO screening_resumes \
             (id, screening_job_id, candidate_id, filename, content, size_bytes, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(resume.id)
        .bind(resume.screening_job_id)
        .bind(resume.candidate_id)
        .bind(&resume.filename)
        .bind(&resume.content)
        .bind(resume.size_bytes)
        .bind(resume.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to stage resume", e))?;
        Ok(())
    }
}
