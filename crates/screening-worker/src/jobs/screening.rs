//! Scores one staged resume against its job posting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};
use uuid::Uuid;

use screening_cache::ScreeningCache;
use screening_database::{ResultWrite, ScreeningStore};
use screening_entity::candidate::{ParsedResume, StagedResume};
use screening_entity::screening::{NewScreeningResult, ScreeningJob};
use screening_entity::task::Task;
use screening_service::ranking::match_skills;
use screening_service::{
    CandidateEvaluation, RankingEngine, RequirementsService, ResumeAnalyzer, ResumeParser,
};

use crate::executor::{JobExecutionError, JobHandler};

/// Parse, match, analyze, score and persist one resume.
#[derive(Debug, Clone)]
pub struct ScreeningJobHandler {
    store: Arc<dyn ScreeningStore>,
    parser: Arc<dyn ResumeParser>,
    analyzer: Arc<dyn ResumeAnalyzer>,
    requirements: RequirementsService,
    cache: ScreeningCache,
    ranking: RankingEngine,
}

impl ScreeningJobHandler {
    /// Create a new screening handler.
    pub fn new(
        store: Arc<dyn ScreeningStore>,
        parser: Arc<dyn ResumeParser>,
        analyzer: Arc<dyn ResumeAnalyzer>,
        requirements: RequirementsService,
        cache: ScreeningCache,
        ranking: RankingEngine,
    ) -> Self {
        Self {
            store,
            parser,
            analyzer,
            requirements,
            cache,
            ranking,
        }
    }

    /// The job the task was enqueued for, as long as it still exists in
    /// the same generation.
    async fn current_job(&self, task: &Task) -> Result<ScreeningJob, JobExecutionError> {
        match self.store.find_job(task.screening_job_id).await? {
            Some(job) if job.generation == task.job_generation => Ok(job),
            Some(_) => Err(JobExecutionError::Cancelled(format!(
                "Screening job {} was replaced",
                task.screening_job_id
            ))),
            None => Err(JobExecutionError::Cancelled(format!(
                "Screening job {} was deleted",
                task.screening_job_id
            ))),
        }
    }

    /// Parse once per candidate; a retry after a later step failed reuses
    /// the cached parse.
    async fn parse(
        &self,
        task: &Task,
        resume: &StagedResume,
    ) -> Result<ParsedResume, JobExecutionError> {
        if let Some(parsed) = self.cache.candidate(task.candidate_id).await {
            debug!(task_id = %task.id, "Using cached resume parse");
            return Ok(parsed);
        }
        let parsed = self.parser.parse(&resume.filename, &resume.content).await?;
        self.cache.put_candidate(task.candidate_id, &parsed).await;
        Ok(parsed)
    }

    /// Drop stale pages and log when the job just finished.
    async fn after_write(&self, screening_job_id: Uuid, job: Option<&ScreeningJob>) {
        self.cache.invalidate_job(screening_job_id).await;
        if let Some(job) = job.filter(|j| j.status.is_terminal()) {
            info!(
                screening_job_id = %job.id,
                status = %job.status,
                processed = job.processed_count,
                failed = job.failed_count,
                "Screening job finished"
            );
        }
    }
}

#[async_trait]
impl JobHandler for ScreeningJobHandler {
    async fn execute(&self, task: &Task) -> Result<(), JobExecutionError> {
        let job = self.current_job(task).await?;
        let resume = self.store.find_resume(task.resume_id).await?.ok_or_else(|| {
            JobExecutionError::Cancelled(format!("Resume {} no longer exists", task.resume_id))
        })?;

        let parsed = self.parse(task, &resume).await?;
        let requirements = self.requirements.get(task.job_id).await?;
        let skills = match_skills(
            &parsed.skills,
            &requirements.skills_required,
            &requirements.nice_to_have_skills,
        );
        let analysis = self
            .analyzer
            .analyze(&parsed.full_text, &requirements.title, &requirements.description)
            .await?;

        let evaluation = CandidateEvaluation {
            skills,
            experience_years: parsed.experience_years,
            strengths: analysis.strengths.clone(),
            overall_match: analysis.overall_match,
        };
        let score = self
            .ranking
            .calculate_screening_score(&evaluation, &requirements);
        debug!(
            task_id = %task.id,
            skill_match = score.skill_match,
            experience = score.experience,
            strengths = score.strengths,
            overall = score.overall,
            total = score.total,
            "Resume scored"
        );

        let new_result = NewScreeningResult {
            screening_job_id: job.id,
            job_generation: task.job_generation,
            candidate_id: task.candidate_id,
            filename: resume.filename,
            match_percentage: score.total,
            skills_matched: evaluation.skills.matched,
            skills_missing: evaluation.skills.missing,
            strengths: analysis.strengths,
            improvement_areas: analysis.gaps,
            recommendations: analysis.recommendations,
            experience_years: parsed.experience_years,
        };

        match self.store.save_result(&new_result).await? {
            ResultWrite::Inserted { result, job: after } => {
                info!(
                    task_id = %task.id,
                    screening_job_id = %result.screening_job_id,
                    match_percentage = result.match_percentage,
                    "Screening result saved"
                );
                self.after_write(result.screening_job_id, after.as_ref())
                    .await;
                Ok(())
            }
            ResultWrite::Updated(result) => {
                debug!(task_id = %task.id, result_id = %result.id, "Existing result replaced");
                self.cache.invalidate_job(result.screening_job_id).await;
                Ok(())
            }
            ResultWrite::Fenced => Err(JobExecutionError::Cancelled(format!(
                "Screening job {} was deleted while scoring",
                task.screening_job_id
            ))),
        }
    }

    async fn on_failed(&self, task: &Task, reason: &str) {
        error!(
            task_id = %task.id,
            screening_job_id = %task.screening_job_id,
            attempts = task.attempts,
            error = reason,
            "Resume screening failed"
        );
        match self.store.increment_failed(task.screening_job_id).await {
            Ok(Some(job)) => self.after_write(job.id, Some(&job)).await,
            Ok(None) => debug!(task_id = %task.id, "Failed count not incremented"),
            Err(e) => error!(task_id = %task.id, error = %e, "Failed to record failed resume"),
        }
    }
}
