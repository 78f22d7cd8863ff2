//! In-memory [`ScreeningStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use screening_core::error::AppError;
use screening_core::result::AppResult;
use screening_entity::candidate::StagedResume;
use screening_entity::screening::{
    MatchBands, NewScreeningResult, ResultFilter, ResultPage, ResultSortBy, ScreeningAnalytics,
    ScreeningJob, ScreeningResult, ScreeningStatus,
};

use crate::store::{ResultWrite, ScreeningStore};

#[derive(Debug, Default)]
struct State {
    jobs: HashMap<Uuid, ScreeningJob>,
    resumes: HashMap<Uuid, StagedResume>,
    /// Insertion order doubles as the stable tie-breaker.
    results: Vec<ScreeningResult>,
}

impl State {
    fn increment_processed(&mut self, job_id: Uuid) -> Option<ScreeningJob> {
        let job = self.jobs.get_mut(&job_id)?;
        if job.processed_count + job.failed_count >= job.total_resumes {
            return None;
        }
        job.processed_count += 1;
        if job.remaining() == 0 {
            job.status = ScreeningStatus::Completed;
        }
        job.updated_at = Utc::now();
        Some(job.clone())
    }

    fn increment_failed(&mut self, job_id: Uuid) -> Option<ScreeningJob> {
        let job = self.jobs.get_mut(&job_id)?;
        if job.processed_count + job.failed_count >= job.total_resumes {
            return None;
        }
        job.failed_count += 1;
        job.status = job.derived_status();
        job.updated_at = Utc::now();
        Some(job.clone())
    }
}

/// [`ScreeningStore`] kept in process memory behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryScreeningStore {
    state: RwLock<State>,
}

impl MemoryScreeningStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScreeningStore for MemoryScreeningStore {
    async fn create_job(
        &self,
        job: &ScreeningJob,
        resumes: &[StagedResume],
    ) -> AppResult<ScreeningJob> {
        let mut state = self.state.write().await;
        if state.jobs.contains_key(&job.id) {
            return Err(AppError::conflict(format!("Screening job {} already exists", job.id)));
        }
        state.jobs.insert(job.id, job.clone());
        for resume in resumes {
            state.resumes.insert(resume.id, resume.clone());
        }
        Ok(job.clone())
    }

    async fn find_job(&self, id: Uuid) -> AppResult<Option<ScreeningJob>> {
        Ok(self.state.read().await.jobs.get(&id).cloned())
    }

    async fn list_jobs(
        &self,
        employer_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<(Vec<ScreeningJob>, u64)> {
        let state = self.state.read().await;
        let mut jobs: Vec<ScreeningJob> = state
            .jobs
            .values()
            .filter(|j| j.employer_id == employer_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = jobs.len() as u64;
        let page = jobs
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn delete_job(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.jobs.remove(&id).is_none() {
            return Ok(false);
        }
        state.resumes.retain(|_, r| r.screening_job_id != id);
        state.results.retain(|r| r.screening_job_id != id);
        Ok(true)
    }

    async fn find_resume(&self, id: Uuid) -> AppResult<Option<StagedResume>> {
        Ok(self.state.read().await.resumes.get(&id).cloned())
    }

    async fn save_result(&self, data: &NewScreeningResult) -> AppResult<ResultWrite> {
        let mut state = self.state.write().await;
        let current = state
            .jobs
            .get(&data.screening_job_id)
            .is_some_and(|job| job.generation == data.job_generation);
        if !current {
            return Ok(ResultWrite::Fenced);
        }

        let existing = state.results.iter_mut().find(|r| {
            r.screening_job_id == data.screening_job_id && r.candidate_id == data.candidate_id
        });
        if let Some(existing) = existing {
            existing.filename = data.filename.clone();
            existing.match_percentage = data.match_percentage.clamp(0, 100);
            existing.skills_matched = data.skills_matched.clone();
            existing.skills_missing = data.skills_missing.clone();
            existing.strengths = data.strengths.clone();
            existing.improvement_areas = data.improvement_areas.clone();
            existing.recommendations = data.recommendations.clone();
            existing.experience_years = data.experience_years;
            existing.updated_at = Utc::now();
            return Ok(ResultWrite::Updated(existing.clone()));
        }

        let result = data.clone().into_result();
        state.results.push(result.clone());
        let job = state.increment_processed(data.screening_job_id);
        Ok(ResultWrite::Inserted { result, job })
    }

    async fn increment_processed(&self, job_id: Uuid) -> AppResult<Option<ScreeningJob>> {
        Ok(self.state.write().await.increment_processed(job_id))
    }

    async fn increment_failed(&self, job_id: Uuid) -> AppResult<Option<ScreeningJob>> {
        Ok(self.state.write().await.increment_failed(job_id))
    }

    async fn find_results(&self, job_id: Uuid, filter: &ResultFilter) -> AppResult<ResultPage> {
        let state = self.state.read().await;
        let min = i32::from(filter.min_match_percentage.unwrap_or(0));
        let mut matching: Vec<&ScreeningResult> = state
            .results
            .iter()
            .filter(|r| r.screening_job_id == job_id && r.match_percentage >= min)
            .collect();

        let descending = filter.descending();
        match filter.sort_column() {
            ResultSortBy::Match => matching.sort_by(|a, b| {
                let ord = a.match_percentage.cmp(&b.match_percentage);
                if descending { ord.reverse() } else { ord }
            }),
            ResultSortBy::Created => matching.sort_by(|a, b| {
                let ord = a.created_at.cmp(&b.created_at);
                if descending { ord.reverse() } else { ord }
            }),
        }

        let total = matching.len() as u64;
        let results = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect();
        Ok(ResultPage { results, total })
    }

    async fn all_results(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>> {
        let state = self.state.read().await;
        Ok(state
            .results
            .iter()
            .filter(|r| r.screening_job_id == job_id)
            .cloned()
            .collect())
    }

    async fn shortlist(&self, job_id: Uuid, result_ids: &[Uuid]) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut updated = 0;
        for result in state
            .results
            .iter_mut()
            .filter(|r| r.screening_job_id == job_id && result_ids.contains(&r.id))
        {
            result.shortlisted = true;
            result.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn shortlisted(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>> {
        let state = self.state.read().await;
        let mut results: Vec<ScreeningResult> = state
            .results
            .iter()
            .filter(|r| r.screening_job_id == job_id && r.shortlisted)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
        Ok(results)
    }

    async fn analytics(&self, job_id: Uuid, bands: MatchBands) -> AppResult<ScreeningAnalytics> {
        let state = self.state.read().await;
        let scores = state
            .results
            .iter()
            .filter(|r| r.screening_job_id == job_id)
            .map(|r| r.match_percentage);
        Ok(ScreeningAnalytics::from_scores(scores, bands))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
