//! Screening job repository.

use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::screening::ScreeningJob;

/// Repository for screening job rows and their progress counters.
#[derive(Debug, Clone)]
pub struct ScreeningJobRepository {
    pool: PgPool,
}

impl ScreeningJobRepository {
    /// Create a new screening job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return a reference to the pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a job by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ScreeningJob>> {
        sqlx::query_as::<_, ScreeningJob>("SELECT * FROM screening_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, "Failed to find screening job", e)
            })
    }

    /// List an employer's jobs, newest first, with the unpaginated total.
    pub async fn find_by_employer(
        &self,
        employer_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<(Vec<ScreeningJob>, u64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM screening_jobs WHERE employer_id = $1")
                .bind(employer_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Dependency, "Failed to count screening jobs", e)
                })?;

        let jobs = sqlx::query_as::<_, ScreeningJob>(
            "SELECT * FROM screening_jobs WHERE employer_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
        )
        .bind(employer_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to list screening jobs", e)
        })?;

        Ok((jobs, total.max(0) as u64))
    }

    /// Insert a job inside an open transaction.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        job: &ScreeningJob,
    ) -> AppResult<ScreeningJob> {
        sqlx::query_as::<_, ScreeningJob>(
            "INSERT INTO screening_jobs \
             (id, employer_id, job_id, status, total_resumes, processed_count, failed_count, \
              generation, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(job.id)
        .bind(job.employer_id)
        .bind(job.job_id)
        .bind(job.status)
        .bind(job.total_resumes)
        .bind(job.processed_count)
        .bind(job.failed_count)
        .bind(job.generation)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to create screening job", e)
        })
    }

    /// Atomically count one more scored resume.
    ///
    /// The same statement moves the job to `completed` once every resume
    /// has a terminal outcome. Returns `None` when the job is gone or its
    /// counters are already saturated.
    pub async fn increment_processed<'e, E>(executor: E, id: Uuid) -> AppResult<Option<ScreeningJob>>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ScreeningJob>(
            "UPDATE screening_jobs SET \
                processed_count = processed_count + 1, \
                status = CASE WHEN processed_count + 1 + failed_count >= total_resumes \
                    THEN 'completed'::screening_status ELSE status END, \
                updated_at = NOW() \
             WHERE id = $1 AND processed_count + failed_count < total_resumes \
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to increment processed count", e)
        })
    }

    /// Atomically count one more resume whose task gave up.
    ///
    /// Moves the job to `failed` when no resume was scored at all, or to
    /// `completed` otherwise, once every resume has a terminal outcome.
    pub async fn increment_failed(&self, id: Uuid) -> AppResult<Option<ScreeningJob>> {
        sqlx::query_as::<_, ScreeningJob>(
            "UPDATE screening_jobs SET \
                failed_count = failed_count + 1, \
                status = CASE \
                    WHEN processed_count + failed_count + 1 < total_resumes THEN status \
                    WHEN processed_count = 0 THEN 'failed'::screening_status \
                    ELSE 'completed'::screening_status END, \
                updated_at = NOW() \
             WHERE id = $1 AND processed_count + failed_count < total_resumes \
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to increment failed count", e)
        })
    }

    /// Delete a job; results, resumes and tasks cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM screening_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, "Failed to delete screening job", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
