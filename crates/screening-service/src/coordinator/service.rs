//! The coordinator every outer layer calls into.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use screening_cache::ScreeningCache;
use screening_core::config::ScreeningConfig;
use screening_core::error::AppError;
use screening_core::result::AppResult;
use screening_database::{ScreeningStore, TaskQueue};
use screening_entity::candidate::{ResumeUpload, StagedResume};
use screening_entity::screening::{
    MatchBands, ResultFilter, ResultPage, ScreeningAnalytics, ScreeningJob, ScreeningResult,
};
use screening_entity::task::{NewTask, QueueStats, RetryPolicy};

use super::validation;
use crate::analytics::AnalyticsAggregator;
use crate::context::RequestContext;
use crate::ranking::{RankedCandidate, RankingEngine};

/// One page of an employer's screening jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningJobPage {
    /// Jobs on this page, newest first.
    pub jobs: Vec<ScreeningJob>,
    /// Total jobs owned by the employer.
    pub total: u64,
}

/// Reachability of the backing services.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthReport {
    /// Store answered its health check.
    pub database: bool,
    /// Cache answered its health check.
    pub cache: bool,
}

impl HealthReport {
    /// The store is required; the cache only degrades latency.
    pub fn is_ready(&self) -> bool {
        self.database
    }
}

/// Orchestrates bulk screening on top of the store, queue and cache.
#[derive(Debug, Clone)]
pub struct ScreeningCoordinator {
    store: Arc<dyn ScreeningStore>,
    queue: Arc<dyn TaskQueue>,
    cache: ScreeningCache,
    analytics: AnalyticsAggregator,
    ranking: RankingEngine,
    retry: RetryPolicy,
    config: ScreeningConfig,
}

impl ScreeningCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        store: Arc<dyn ScreeningStore>,
        queue: Arc<dyn TaskQueue>,
        cache: ScreeningCache,
        config: ScreeningConfig,
    ) -> Self {
        let bands = MatchBands::from(&config.ranking);
        Self {
            analytics: AnalyticsAggregator::new(store.clone(), cache.clone(), bands),
            ranking: RankingEngine::new(bands),
            retry: RetryPolicy::from(&config.retry),
            store,
            queue,
            cache,
            config,
        }
    }

    /// Screening limits in effect.
    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Validate a batch, persist the job with its resumes and queue one task
    /// per resume. Returns as soon as the work is queued.
    pub async fn initiate_bulk_screening(
        &self,
        employer_id: Uuid,
        job_id: Uuid,
        resumes: Vec<ResumeUpload>,
    ) -> AppResult<ScreeningJob> {
        validation::validate_batch(&resumes, &self.config)?;

        let total = i32::try_from(resumes.len())
            .map_err(|_| AppError::validation("Too many resumes in one batch"))?;
        let job = ScreeningJob::new(employer_id, job_id, total);
        let now = Utc::now();
        let staged: Vec<StagedResume> = resumes
            .into_iter()
            .map(|upload| StagedResume {
                id: Uuid::new_v4(),
                screening_job_id: job.id,
                candidate_id: Uuid::new_v4(),
                size_bytes: upload.content.len() as i64,
                filename: upload.filename,
                content: upload.content.to_vec(),
                created_at: now,
            })
            .collect();

        let job = self.store.create_job(&job, &staged).await?;

        let tasks = staged
            .iter()
            .map(|resume| NewTask {
                screening_job_id: job.id,
                job_generation: job.generation,
                resume_id: resume.id,
                candidate_id: resume.candidate_id,
                job_id,
                priority: 0,
                retry: self.retry,
            })
            .collect();

        if let Err(e) = self.queue.enqueue_batch(tasks).await {
            warn!(screening_job_id = %job.id, error = %e, "Enqueue failed, removing screening job");
            if let Err(cleanup) = self.store.delete_job(job.id).await {
                warn!(screening_job_id = %job.id, error = %cleanup, "Failed to remove unqueued job");
            }
            return Err(e);
        }

        info!(
            screening_job_id = %job.id,
            %employer_id,
            %job_id,
            total_resumes = job.total_resumes,
            "Bulk screening initiated"
        );
        Ok(job)
    }

    /// A job with its progress counters.
    pub async fn get_screening_job(
        &self,
        ctx: &RequestContext,
        screening_job_id: Uuid,
    ) -> AppResult<ScreeningJob> {
        let job = self
            .store
            .find_job(screening_job_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Screening job {screening_job_id} not found")))?;
        ctx.ensure_access(job)
    }

    /// An employer's jobs, newest first.
    pub async fn list_screening_jobs(
        &self,
        employer_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<ScreeningJobPage> {
        validation::validate_limit(limit, &self.config)?;
        let (jobs, total) = self.store.list_jobs(employer_id, limit, offset).await?;
        Ok(ScreeningJobPage { jobs, total })
    }

    /// A filtered page of results, served from cache when possible.
    pub async fn get_screening_results(
        &self,
        ctx: &RequestContext,
        screening_job_id: Uuid,
        filter: &ResultFilter,
    ) -> AppResult<ResultPage> {
        validation::validate_filter(filter, &self.config)?;
        self.get_screening_job(ctx, screening_job_id).await?;

        if let Some(page) = self.cache.results_page(screening_job_id, filter).await {
            return Ok(page);
        }
        let page = self.store.find_results(screening_job_id, filter).await?;
        self.cache
            .put_results_page(screening_job_id, filter, &page)
            .await;
        Ok(page)
    }

    /// Score summary of a job.
    pub async fn get_screening_analytics(
        &self,
        ctx: &RequestContext,
        screening_job_id: Uuid,
    ) -> AppResult<ScreeningAnalytics> {
        self.get_screening_job(ctx, screening_job_id).await?;
        self.analytics.get(screening_job_id).await
    }

    /// Results ranked by score with their match category, best first.
    pub async fn get_ranked_candidates(
        &self,
        ctx: &RequestContext,
        screening_job_id: Uuid,
        limit: Option<u32>,
    ) -> AppResult<Vec<RankedCandidate<ScreeningResult>>> {
        if let Some(limit) = limit {
            validation::validate_limit(limit, &self.config)?;
        }
        self.get_screening_job(ctx, screening_job_id).await?;

        let results = self.store.all_results(screening_job_id).await?;
        let mut ranked = self.ranking.rank_candidates(results);
        if let Some(limit) = limit {
            ranked.truncate(limit as usize);
        }
        Ok(ranked)
    }

    /// Shortlist exactly the given results. Returns how many were marked.
    pub async fn save_shortlist(
        &self,
        ctx: &RequestContext,
        screening_job_id: Uuid,
        result_ids: &[Uuid],
    ) -> AppResult<u64> {
        validation::validate_shortlist(result_ids)?;
        self.get_screening_job(ctx, screening_job_id).await?;

        let updated = self.store.shortlist(screening_job_id, result_ids).await?;
        self.cache.invalidate_job(screening_job_id).await;
        info!(
            %screening_job_id,
            requested = result_ids.len(),
            updated,
            "Shortlist saved"
        );
        Ok(updated)
    }

    /// Shortlisted results of a job.
    pub async fn get_shortlisted(
        &self,
        ctx: &RequestContext,
        screening_job_id: Uuid,
    ) -> AppResult<Vec<ScreeningResult>> {
        self.get_screening_job(ctx, screening_job_id).await?;
        self.store.shortlisted(screening_job_id).await
    }

    /// Delete a job with its resumes and results and stop its queued tasks.
    pub async fn delete_screening_job(
        &self,
        ctx: &RequestContext,
        screening_job_id: Uuid,
    ) -> AppResult<()> {
        self.get_screening_job(ctx, screening_job_id).await?;

        if !self.store.delete_job(screening_job_id).await? {
            return Err(AppError::not_found(format!(
                "Screening job {screening_job_id} not found"
            )));
        }
        match self
            .queue
            .cancel_for_job(screening_job_id, "screening job deleted")
            .await
        {
            Ok(cancelled) if cancelled > 0 => {
                info!(%screening_job_id, cancelled, "Cancelled queued tasks")
            }
            Ok(_) => {}
            Err(e) => warn!(%screening_job_id, error = %e, "Failed to cancel queued tasks"),
        }
        self.cache.invalidate_job(screening_job_id).await;

        info!(%screening_job_id, "Screening job deleted");
        Ok(())
    }

    /// Task counts per status.
    pub async fn queue_stats(&self) -> AppResult<QueueStats> {
        self.queue.stats().await
    }

    /// Probe the store and cache.
    pub async fn health(&self) -> HealthReport {
        let database = match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Store health check failed");
                false
            }
        };
        HealthReport {
            database,
            cache: self.cache.is_healthy().await,
        }
    }
}
