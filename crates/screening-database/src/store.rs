//! Persistent storage for screening jobs and their results.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::candidate::StagedResume;
use screening_entity::screening::{
    MatchBands, NewScreeningResult, ResultFilter, ResultPage, ScreeningAnalytics, ScreeningJob,
    ScreeningResult,
};

use crate::repositories::{ResumeRepository, ScreeningJobRepository, ScreeningResultRepository};

/// Outcome of persisting a scored resume.
#[derive(Debug, Clone)]
pub enum ResultWrite {
    /// First result for this candidate; the job's processed count was
    /// incremented and `job` is its state afterwards.
    Inserted {
        /// The stored result.
        result: ScreeningResult,
        /// Job after the increment, `None` if the counter was saturated.
        job: Option<ScreeningJob>,
    },
    /// A redelivered task replaced an existing result; counters untouched.
    Updated(ScreeningResult),
    /// The job was deleted or re-generated since the task was enqueued.
    Fenced,
}

/// Storage for screening jobs, staged resumes and results.
///
/// Counter increments are atomic at the storage level and deleting a job
/// removes everything that belongs to it.
#[async_trait]
pub trait ScreeningStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new job together with its staged resumes, all or nothing.
    async fn create_job(
        &self,
        job: &ScreeningJob,
        resumes: &[StagedResume],
    ) -> AppResult<ScreeningJob>;

    /// Find a job by ID.
    async fn find_job(&self, id: Uuid) -> AppResult<Option<ScreeningJob>>;

    /// List an employer's jobs, newest first, with the total count.
    async fn list_jobs(
        &self,
        employer_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<(Vec<ScreeningJob>, u64)>;

    /// Delete a job and cascade to its resumes and results.
    async fn delete_job(&self, id: Uuid) -> AppResult<bool>;

    /// Load a staged resume.
    async fn find_resume(&self, id: Uuid) -> AppResult<Option<StagedResume>>;

    /// Upsert a result, fenced by the job generation, incrementing the
    /// processed count only on first insert.
    async fn save_result(&self, data: &NewScreeningResult) -> AppResult<ResultWrite>;

    /// Atomically add one to the processed count.
    async fn increment_processed(&self, job_id: Uuid) -> AppResult<Option<ScreeningJob>>;

    /// Atomically add one to the failed count.
    async fn increment_failed(&self, job_id: Uuid) -> AppResult<Option<ScreeningJob>>;

    /// One filtered, sorted page of results.
    async fn find_results(&self, job_id: Uuid, filter: &ResultFilter) -> AppResult<ResultPage>;

    /// Every result of a job in insertion order.
    async fn all_results(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>>;

    /// Shortlist exactly the given results of a job; returns rows changed.
    async fn shortlist(&self, job_id: Uuid, result_ids: &[Uuid]) -> AppResult<u64>;

    /// Shortlisted results of a job.
    async fn shortlisted(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>>;

    /// Aggregate a job's scores.
    async fn analytics(&self, job_id: Uuid, bands: MatchBands) -> AppResult<ScreeningAnalytics>;

    /// Check the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// [`ScreeningStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgScreeningStore {
    pool: PgPool,
    jobs: ScreeningJobRepository,
    results: ScreeningResultRepository,
    resumes: ResumeRepository,
}

impl PgScreeningStore {
    /// Create a store over a pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            jobs: ScreeningJobRepository::new(pool.clone()),
            results: ScreeningResultRepository::new(pool.clone()),
            resumes: ResumeRepository::new(pool.clone()),
            pool,
        }
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to begin transaction", e)
        })
    }
}

fn commit_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Dependency, "Failed to commit transaction", e)
}

#[async_trait]
impl ScreeningStore for PgScreeningStore {
    async fn create_job(
        &self,
        job: &ScreeningJob,
        resumes: &[StagedResume],
    ) -> AppResult<ScreeningJob> {
        let mut tx = self.begin().await?;
        let created = ScreeningJobRepository::insert(&mut tx, job).await?;
        for resume in resumes {
            ResumeRepository::insert(&mut tx, resume).await?;
        }
        tx.commit().await.map_err(commit_error)?;
        debug!(screening_job_id = %created.id, resumes = resumes.len(), "Screening job stored");
        Ok(created)
    }

    async fn find_job(&self, id: Uuid) -> AppResult<Option<ScreeningJob>> {
        self.jobs.find_by_id(id).await
    }

    async fn list_jobs(
        &self,
        employer_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<(Vec<ScreeningJob>, u64)> {
        self.jobs.find_by_employer(employer_id, limit, offset).await
    }

    async fn delete_job(&self, id: Uuid) -> AppResult<bool> {
        self.jobs.delete(id).await
    }

    async fn find_resume(&self, id: Uuid) -> AppResult<Option<StagedResume>> {
        self.resumes.find_by_id(id).await
    }

    async fn save_result(&self, data: &NewScreeningResult) -> AppResult<ResultWrite> {
        let mut tx = self.begin().await?;
        let outcome = match ScreeningResultRepository::upsert(&mut tx, data).await {
            Ok(outcome) => outcome,
            Err(e) if e.kind == ErrorKind::Conflict => return Ok(ResultWrite::Fenced),
            Err(e) => return Err(e),
        };

        let write = match outcome {
            None => ResultWrite::Fenced,
            Some((result, false)) => ResultWrite::Updated(result),
            Some((result, true)) => {
                let job =
                    ScreeningJobRepository::increment_processed(&mut *tx, data.screening_job_id)
                        .await?;
                ResultWrite::Inserted { result, job }
            }
        };
        tx.commit().await.map_err(commit_error)?;
        Ok(write)
    }

    async fn increment_processed(&self, job_id: Uuid) -> AppResult<Option<ScreeningJob>> {
        ScreeningJobRepository::increment_processed(self.jobs.pool(), job_id).await
    }

    async fn increment_failed(&self, job_id: Uuid) -> AppResult<Option<ScreeningJob>> {
        self.jobs.increment_failed(job_id).await
    }

    async fn find_results(&self, job_id: Uuid, filter: &ResultFilter) -> AppResult<ResultPage> {
        self.results.find_page(job_id, filter).await
    }

    async fn all_results(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>> {
        self.results.find_all(job_id).await
    }

    async fn shortlist(&self, job_id: Uuid, result_ids: &[Uuid]) -> AppResult<u64> {
        self.results.shortlist(job_id, result_ids).await
    }

    async fn shortlisted(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>> {
        self.results.find_shortlisted(job_id).await
    }

    async fn analytics(&self, job_id: Uuid, bands: MatchBands) -> AppResult<ScreeningAnalytics> {
        self.results.analytics(job_id, bands).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Health check failed", e))
    }
}
