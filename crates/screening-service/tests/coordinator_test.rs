//! Coordinator behaviour over the in-memory store, queue and cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use screening_cache::ScreeningCache;
use screening_cache::memory::MemoryCacheProvider;
use screening_core::config::{CacheTtlConfig, MemoryCacheConfig, ScreeningConfig};
use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_database::{MemoryScreeningStore, MemoryTaskQueue, ScreeningStore, TaskQueue};
use screening_entity::candidate::ResumeUpload;
use screening_entity::screening::{
    MatchCategory, NewScreeningResult, ResultFilter, ScreeningJob,
};
use screening_entity::task::{NewTask, QueueStats, Task};
use screening_service::{RequestContext, ScreeningCoordinator};

const LOCK: Duration = Duration::from_secs(30);

struct Harness {
    store: Arc<MemoryScreeningStore>,
    queue: Arc<MemoryTaskQueue>,
    cache: ScreeningCache,
    coordinator: ScreeningCoordinator,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryScreeningStore::new());
    let queue = Arc::new(MemoryTaskQueue::new());
    let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default());
    let cache = ScreeningCache::new(Arc::new(provider), CacheTtlConfig::default());
    let coordinator = ScreeningCoordinator::new(
        store.clone(),
        queue.clone(),
        cache.clone(),
        ScreeningConfig::default(),
    );
    Harness {
        store,
        queue,
        cache,
        coordinator,
    }
}

fn uploads(n: usize) -> Vec<ResumeUpload> {
    (0..n)
        .map(|i| ResumeUpload::new(format!("candidate-{i}.pdf"), format!("resume {i}").into_bytes()))
        .collect()
}

fn result_for(job: &ScreeningJob, task: &Task, score: i32) -> NewScreeningResult {
    NewScreeningResult {
        screening_job_id: job.id,
        job_generation: task.job_generation,
        candidate_id: task.candidate_id,
        filename: format!("{}.pdf", task.candidate_id),
        match_percentage: score,
        skills_matched: vec!["Rust".into()],
        skills_missing: vec![],
        strengths: vec![],
        improvement_areas: vec![],
        recommendations: vec![],
        experience_years: 4.0,
    }
}

/// Submit a batch and score each task with the given scores, in queue order.
async fn screened(h: &Harness, employer_id: Uuid, scores: &[i32]) -> ScreeningJob {
    let job = h
        .coordinator
        .initiate_bulk_screening(employer_id, Uuid::new_v4(), uploads(scores.len()))
        .await
        .unwrap();
    for score in scores {
        let task = h.queue.dequeue("test-worker", LOCK).await.unwrap().unwrap();
        h.store
            .save_result(&result_for(&job, &task, *score))
            .await
            .unwrap();
        assert!(h.queue.complete(task.id, "test-worker").await.unwrap());
    }
    job
}

#[tokio::test]
async fn test_batch_size_is_validated_before_anything_is_queued() {
    let h = harness();
    let employer = Uuid::new_v4();

    let err = h
        .coordinator
        .initiate_bulk_screening(employer, Uuid::new_v4(), vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = h
        .coordinator
        .initiate_bulk_screening(employer, Uuid::new_v4(), uploads(501))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert_eq!(h.queue.stats().await.unwrap().total(), 0);
}

#[tokio::test]
async fn test_initiate_creates_job_and_one_task_per_resume() {
    let h = harness();
    let job = h
        .coordinator
        .initiate_bulk_screening(Uuid::new_v4(), Uuid::new_v4(), uploads(7))
        .await
        .unwrap();

    assert_eq!(job.total_resumes, 7);
    assert_eq!(job.processed_count, 0);
    assert_eq!(h.queue.stats().await.unwrap().pending, 7);

    let task = h.queue.dequeue("w", LOCK).await.unwrap().unwrap();
    assert_eq!(task.screening_job_id, job.id);
    assert_eq!(task.max_attempts, 3);
    assert_eq!(task.base_delay_ms, 2000);
    let resume = h.store.find_resume(task.resume_id).await.unwrap().unwrap();
    assert_eq!(resume.candidate_id, task.candidate_id);
}

#[tokio::test]
async fn test_cached_results_match_store_results() {
    let h = harness();
    let employer = Uuid::new_v4();
    let job = screened(&h, employer, &[40, 90, 65]).await;
    let ctx = RequestContext::employer(employer);
    let filter = ResultFilter::default();

    let from_store = h
        .coordinator
        .get_screening_results(&ctx, job.id, &filter)
        .await
        .unwrap();
    let from_cache = h
        .coordinator
        .get_screening_results(&ctx, job.id, &filter)
        .await
        .unwrap();

    assert_eq!(from_store, from_cache);
    assert_eq!(from_store.total, 3);
    let scores: Vec<i32> = from_store
        .results
        .iter()
        .map(|r| r.match_percentage)
        .collect();
    assert_eq!(scores, vec![90, 65, 40]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_page_written_back_after_invalidation_expires() {
    let h = harness();
    let employer = Uuid::new_v4();
    let ctx = RequestContext::employer(employer);
    let filter = ResultFilter::default();
    let job = h
        .coordinator
        .initiate_bulk_screening(employer, Uuid::new_v4(), uploads(2))
        .await
        .unwrap();

    let first = h.queue.dequeue("test-worker", LOCK).await.unwrap().unwrap();
    h.store.save_result(&result_for(&job, &first, 60)).await.unwrap();
    let stale = h
        .coordinator
        .get_screening_results(&ctx, job.id, &filter)
        .await
        .unwrap();
    assert_eq!(stale.total, 1);

    // A worker stores the second result and invalidates, then a reader
    // that loaded the first page before that write stores it again.
    let second = h.queue.dequeue("test-worker", LOCK).await.unwrap().unwrap();
    h.store.save_result(&result_for(&job, &second, 80)).await.unwrap();
    h.cache.invalidate_job(job.id).await;
    h.cache.put_results_page(job.id, &filter, &stale).await;

    let replay = CacheTtlConfig::default().invalidation_replay().unwrap();
    tokio::time::sleep(replay + Duration::from_millis(10)).await;

    let fresh = h
        .coordinator
        .get_screening_results(&ctx, job.id, &filter)
        .await
        .unwrap();
    assert_eq!(fresh.total, 2);
}

#[tokio::test]
async fn test_results_filter_is_validated() {
    let h = harness();
    let employer = Uuid::new_v4();
    let job = screened(&h, employer, &[50]).await;
    let filter = ResultFilter {
        limit: 0,
        ..ResultFilter::default()
    };
    let err = h
        .coordinator
        .get_screening_results(&RequestContext::employer(employer), job.id, &filter)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_shortlist_marks_exactly_the_given_results() {
    let h = harness();
    let employer = Uuid::new_v4();
    let job = screened(&h, employer, &[80, 70, 60, 50]).await;
    let ctx = RequestContext::employer(employer);
    let filter = ResultFilter::default();

    let err = h
        .coordinator
        .save_shortlist(&ctx, job.id, &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    // Warm the cache so the shortlist has something to invalidate.
    let before = h
        .coordinator
        .get_screening_results(&ctx, job.id, &filter)
        .await
        .unwrap();
    let chosen: Vec<Uuid> = before.results.iter().take(2).map(|r| r.id).collect();

    let updated = h
        .coordinator
        .save_shortlist(&ctx, job.id, &chosen)
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let after = h
        .coordinator
        .get_screening_results(&ctx, job.id, &filter)
        .await
        .unwrap();
    for result in &after.results {
        assert_eq!(result.shortlisted, chosen.contains(&result.id));
    }

    let shortlisted = h.coordinator.get_shortlisted(&ctx, job.id).await.unwrap();
    assert_eq!(shortlisted.len(), 2);
}

#[tokio::test]
async fn test_analytics_and_ranking() {
    let h = harness();
    let employer = Uuid::new_v4();
    let job = screened(&h, employer, &[45, 85, 70, 55]).await;
    let ctx = RequestContext::employer(employer);

    let analytics = h
        .coordinator
        .get_screening_analytics(&ctx, job.id)
        .await
        .unwrap();
    assert_eq!(analytics.total_screened, 4);
    assert_eq!(analytics.strong_matches, 2);
    assert_eq!(analytics.moderate_matches, 1);
    assert_eq!(analytics.weak_matches, 1);
    assert!((analytics.average_match - 63.75).abs() < f64::EPSILON);

    let ranked = h
        .coordinator
        .get_ranked_candidates(&ctx, job.id, Some(3))
        .await
        .unwrap();
    let summary: Vec<(usize, i32, MatchCategory)> =
        ranked.iter().map(|r| (r.rank, r.score, r.category)).collect();
    assert_eq!(
        summary,
        vec![
            (1, 85, MatchCategory::Strong),
            (2, 70, MatchCategory::Strong),
            (3, 55, MatchCategory::Moderate),
        ]
    );
}

#[tokio::test]
async fn test_foreign_employer_sees_not_found() {
    let h = harness();
    let job = screened(&h, Uuid::new_v4(), &[60]).await;
    let stranger = RequestContext::employer(Uuid::new_v4());

    let err = h
        .coordinator
        .get_screening_job(&stranger, job.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = h
        .coordinator
        .delete_screening_job(&stranger, job.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    assert!(
        h.coordinator
            .get_screening_job(&RequestContext::operator(), job.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_delete_cascades_and_cancels_pending_tasks() {
    let h = harness();
    let employer = Uuid::new_v4();
    let ctx = RequestContext::employer(employer);
    let job = screened(&h, employer, &[75, 35]).await;
    let pending = h
        .coordinator
        .initiate_bulk_screening(employer, Uuid::new_v4(), uploads(3))
        .await
        .unwrap();

    h.coordinator
        .delete_screening_job(&ctx, job.id)
        .await
        .unwrap();
    h.coordinator
        .delete_screening_job(&ctx, pending.id)
        .await
        .unwrap();

    let err = h
        .coordinator
        .get_screening_results(&ctx, job.id, &ResultFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(h.store.all_results(job.id).await.unwrap().is_empty());

    let stats = h.coordinator.queue_stats().await.unwrap();
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.cancelled, 3);
    assert_eq!(stats.pending, 0);
}

#[tokio::test]
async fn test_list_is_scoped_to_employer() {
    let h = harness();
    let employer = Uuid::new_v4();
    screened(&h, employer, &[50]).await;
    screened(&h, employer, &[60]).await;
    screened(&h, Uuid::new_v4(), &[70]).await;

    let page = h
        .coordinator
        .list_screening_jobs(employer, 10, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.jobs.iter().all(|j| j.employer_id == employer));
}

#[derive(Debug)]
struct RejectingQueue;

#[async_trait]
impl TaskQueue for RejectingQueue {
    async fn enqueue_batch(&self, _tasks: Vec<NewTask>) -> AppResult<Vec<Task>> {
        Err(AppError::dependency("queue unavailable"))
    }
    async fn dequeue(&self, _worker_id: &str, _lock: Duration) -> AppResult<Option<Task>> {
        Ok(None)
    }
    async fn reap_expired(&self) -> AppResult<Vec<Task>> {
        Ok(Vec::new())
    }
    async fn renew_lock(&self, _task_id: Uuid, _worker_id: &str, _lock: Duration) -> AppResult<bool> {
        Ok(false)
    }
    async fn complete(&self, _task_id: Uuid, _worker_id: &str) -> AppResult<bool> {
        Ok(false)
    }
    async fn retry(
        &self,
        _task_id: Uuid,
        _worker_id: &str,
        _delay: Duration,
        _error: &str,
    ) -> AppResult<bool> {
        Ok(false)
    }
    async fn fail(&self, _task_id: Uuid, _worker_id: &str, _error: &str) -> AppResult<bool> {
        Ok(false)
    }
    async fn cancel(&self, _task_id: Uuid, _worker_id: &str, _reason: &str) -> AppResult<bool> {
        Ok(false)
    }
    async fn cancel_for_job(&self, _screening_job_id: Uuid, _reason: &str) -> AppResult<u64> {
        Ok(0)
    }
    async fn find(&self, _task_id: Uuid) -> AppResult<Option<Task>> {
        Ok(None)
    }
    async fn stats(&self) -> AppResult<QueueStats> {
        Ok(QueueStats::default())
    }
}

#[tokio::test]
async fn test_failed_enqueue_removes_the_job() {
    let store = Arc::new(MemoryScreeningStore::new());
    let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default());
    let coordinator = ScreeningCoordinator::new(
        store.clone(),
        Arc::new(RejectingQueue),
        ScreeningCache::new(Arc::new(provider), CacheTtlConfig::default()),
        ScreeningConfig::default(),
    );
    let employer = Uuid::new_v4();

    let err = coordinator
        .initiate_bulk_screening(employer, Uuid::new_v4(), uploads(2))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Dependency);

    let (jobs, total) = store.list_jobs(employer, 10, 0).await.unwrap();
    assert!(jobs.is_empty());
    assert_eq!(total, 0);
}
