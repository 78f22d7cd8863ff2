//! End-to-end task processing over in-memory collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use screening_cache::ScreeningCache;
use screening_cache::memory::MemoryCacheProvider;
use screening_core::config::{
    CacheTtlConfig, MemoryCacheConfig, RetryConfig, ScreeningConfig, WorkerConfig,
};
use screening_core::error::AppError;
use screening_core::result::AppResult;
use screening_database::{MemoryScreeningStore, MemoryTaskQueue, ScreeningStore, TaskQueue};
use screening_entity::candidate::{ParsedResume, ResumeAnalysis, ResumeUpload};
use screening_entity::requirements::JobRequirements;
use screening_entity::screening::{ScreeningJob, ScreeningStatus};
use screening_entity::task::TaskStatus;
use screening_service::{
    RankingEngine, RequirementsService, RequirementsSource, ResumeAnalyzer, ResumeParser,
    ScreeningCoordinator,
};
use screening_worker::{ScreeningJobHandler, TaskResolution, WorkerRunner};

#[derive(Debug, Default)]
struct FakeParser {
    failures_left: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl ResumeParser for FakeParser {
    async fn parse(&self, _filename: &str, _content: &[u8]) -> AppResult<ParsedResume> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.failures_left) {
            return Err(AppError::dependency("parser unavailable"));
        }
        Ok(ParsedResume {
            skills: vec!["rust".into(), "PostgreSQL".into()],
            experience_years: 5.0,
            full_text: "Five years building Rust services on PostgreSQL".into(),
        })
    }
}

#[derive(Debug, Default)]
struct FakeAnalyzer {
    failures_left: AtomicUsize,
    calls: AtomicUsize,
    stall: Option<Duration>,
}

#[async_trait]
impl ResumeAnalyzer for FakeAnalyzer {
    async fn analyze(
        &self,
        _full_text: &str,
        _job_title: &str,
        _description: &str,
    ) -> AppResult<ResumeAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        if take_failure(&self.failures_left) {
            return Err(AppError::timeout("analyzer timed out"));
        }
        Ok(ResumeAnalysis {
            strengths: vec!["Strong Rust ownership".into()],
            gaps: vec!["No Kubernetes".into()],
            recommendations: vec!["Pair with platform team".into()],
            overall_match: Some(80.0),
        })
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Answers every posting id with the same requirements, or with nothing.
#[derive(Debug)]
struct Postings {
    exists: bool,
}

#[async_trait]
impl RequirementsSource for Postings {
    async fn find_requirements(&self, job_id: Uuid) -> AppResult<Option<JobRequirements>> {
        Ok(self.exists.then(|| JobRequirements {
            job_id,
            title: "Backend Engineer".into(),
            description: "Rust and PostgreSQL".into(),
            skills_required: vec!["Rust".into(), "PostgreSQL".into(), "Kubernetes".into()],
            nice_to_have_skills: vec!["Redis".into()],
            experience_required_years: 3.0,
            expected_strengths: vec!["rust".into()],
        }))
    }
}

struct Harness {
    store: Arc<MemoryScreeningStore>,
    queue: Arc<MemoryTaskQueue>,
    coordinator: ScreeningCoordinator,
    runner: WorkerRunner,
    parser: Arc<FakeParser>,
    analyzer: Arc<FakeAnalyzer>,
}

fn test_worker() -> WorkerConfig {
    WorkerConfig {
        poll_interval_ms: 10,
        shutdown_grace_seconds: 5,
        ..WorkerConfig::default()
    }
}

fn harness_with(parser: FakeParser, analyzer: FakeAnalyzer, postings_exist: bool) -> Harness {
    let retry = RetryConfig {
        base_delay_ms: 0,
        ..RetryConfig::default()
    };
    build_harness(parser, analyzer, postings_exist, retry, test_worker())
}

fn build_harness(
    parser: FakeParser,
    analyzer: FakeAnalyzer,
    postings_exist: bool,
    retry: RetryConfig,
    worker: WorkerConfig,
) -> Harness {
    let store = Arc::new(MemoryScreeningStore::new());
    let queue = Arc::new(MemoryTaskQueue::new());
    let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default());
    let cache = ScreeningCache::new(Arc::new(provider), CacheTtlConfig::default());
    let screening = ScreeningConfig {
        retry,
        ..ScreeningConfig::default()
    };
    let coordinator =
        ScreeningCoordinator::new(store.clone(), queue.clone(), cache.clone(), screening);

    let parser = Arc::new(parser);
    let analyzer = Arc::new(analyzer);
    let handler = ScreeningJobHandler::new(
        store.clone(),
        parser.clone(),
        analyzer.clone(),
        RequirementsService::new(
            Arc::new(Postings {
                exists: postings_exist,
            }),
            cache.clone(),
        ),
        cache,
        RankingEngine::default(),
    );
    let runner = WorkerRunner::new(queue.clone(), Arc::new(handler), worker, "worker-test");

    Harness {
        store,
        queue,
        coordinator,
        runner,
        parser,
        analyzer,
    }
}

fn harness() -> Harness {
    harness_with(FakeParser::default(), FakeAnalyzer::default(), true)
}

async fn submit(h: &Harness, count: usize) -> ScreeningJob {
    let resumes = (0..count)
        .map(|i| ResumeUpload::new(format!("cv-{i}.pdf"), b"%PDF-1.7 resume".to_vec()))
        .collect();
    h.coordinator
        .initiate_bulk_screening(Uuid::new_v4(), Uuid::new_v4(), resumes)
        .await
        .unwrap()
}

async fn job(h: &Harness, id: Uuid) -> ScreeningJob {
    h.store.find_job(id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_batch_is_scored_and_job_completes() {
    let h = harness();
    let submitted = submit(&h, 3).await;

    for _ in 0..3 {
        assert_eq!(
            h.runner.process_next().await.unwrap(),
            Some(TaskResolution::Completed)
        );
    }
    assert_eq!(h.runner.process_next().await.unwrap(), None);

    let done = job(&h, submitted.id).await;
    assert_eq!(done.processed_count, 3);
    assert_eq!(done.status, ScreeningStatus::Completed);

    let results = h.store.all_results(submitted.id).await.unwrap();
    assert_eq!(results.len(), 3);
    for result in &results {
        // skills 53.33 * 0.6 + experience 100 * 0.2 + strengths 100 * 0.1 + overall 80 * 0.1
        assert_eq!(result.match_percentage, 70);
        assert_eq!(result.skills_matched, vec!["Rust", "PostgreSQL"]);
        assert_eq!(result.skills_missing, vec!["Kubernetes"]);
        assert_eq!(result.improvement_areas, vec!["No Kubernetes"]);
    }
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let h = harness_with(
        FakeParser {
            failures_left: AtomicUsize::new(1),
            ..FakeParser::default()
        },
        FakeAnalyzer::default(),
        true,
    );
    let submitted = submit(&h, 1).await;

    assert_eq!(
        h.runner.process_next().await.unwrap(),
        Some(TaskResolution::Retrying(Duration::ZERO))
    );
    assert_eq!(
        h.runner.process_next().await.unwrap(),
        Some(TaskResolution::Completed)
    );
    assert_eq!(job(&h, submitted.id).await.processed_count, 1);
    assert_eq!(h.parser.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_exhausted_retries_fail_only_that_resume() {
    let h = harness_with(
        FakeParser {
            failures_left: AtomicUsize::new(usize::MAX),
            ..FakeParser::default()
        },
        FakeAnalyzer::default(),
        true,
    );
    let submitted = submit(&h, 1).await;

    let mut outcomes = Vec::new();
    while let Some(outcome) = h.runner.process_next().await.unwrap() {
        outcomes.push(outcome);
    }
    assert_eq!(
        outcomes,
        vec![
            TaskResolution::Retrying(Duration::ZERO),
            TaskResolution::Retrying(Duration::ZERO),
            TaskResolution::Failed,
        ]
    );

    let failed = job(&h, submitted.id).await;
    assert_eq!(failed.failed_count, 1);
    assert_eq!(failed.processed_count, 0);
    assert_eq!(failed.status, ScreeningStatus::Failed);
    assert_eq!(h.queue.stats().await.unwrap().failed, 1);
}

#[tokio::test]
async fn test_missing_requirements_fail_without_retry() {
    let h = harness_with(FakeParser::default(), FakeAnalyzer::default(), false);
    let submitted = submit(&h, 2).await;

    assert_eq!(
        h.runner.process_next().await.unwrap(),
        Some(TaskResolution::Failed)
    );
    assert_eq!(
        h.runner.process_next().await.unwrap(),
        Some(TaskResolution::Failed)
    );
    assert_eq!(h.runner.process_next().await.unwrap(), None);
    assert_eq!(h.analyzer.calls.load(Ordering::SeqCst), 0);

    let failed = job(&h, submitted.id).await;
    assert_eq!(failed.failed_count, 2);
    assert_eq!(failed.status, ScreeningStatus::Failed);
}

#[tokio::test]
async fn test_partial_failure_still_completes_job() {
    let h = harness_with(
        FakeParser::default(),
        FakeAnalyzer {
            failures_left: AtomicUsize::new(3),
            ..FakeAnalyzer::default()
        },
        true,
    );
    let submitted = submit(&h, 2).await;

    while h.runner.process_next().await.unwrap().is_some() {}

    let finished = job(&h, submitted.id).await;
    assert_eq!(finished.processed_count + finished.failed_count, 2);
    assert_eq!(finished.status, ScreeningStatus::Completed);
}

#[tokio::test]
async fn test_parse_is_reused_across_retries() {
    let h = harness_with(
        FakeParser::default(),
        FakeAnalyzer {
            failures_left: AtomicUsize::new(1),
            ..FakeAnalyzer::default()
        },
        true,
    );
    submit(&h, 1).await;

    assert!(matches!(
        h.runner.process_next().await.unwrap(),
        Some(TaskResolution::Retrying(_))
    ));
    assert_eq!(
        h.runner.process_next().await.unwrap(),
        Some(TaskResolution::Completed)
    );
    assert_eq!(h.parser.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.analyzer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_task_for_deleted_job_is_cancelled() {
    let h = harness();
    let submitted = submit(&h, 1).await;
    let task = h
        .queue
        .dequeue(h.runner.worker_id(), Duration::from_secs(30))
        .await
        .unwrap()
        .unwrap();

    assert!(h.store.delete_job(submitted.id).await.unwrap());

    assert_eq!(h.runner.process(task).await, TaskResolution::Cancelled);
    assert!(h.store.all_results(submitted.id).await.unwrap().is_empty());
    assert_eq!(h.queue.stats().await.unwrap().cancelled, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_collaborator_times_out() {
    let h = harness_with(
        FakeParser::default(),
        FakeAnalyzer {
            stall: Some(Duration::from_secs(600)),
            ..FakeAnalyzer::default()
        },
        true,
    );
    submit(&h, 1).await;

    assert!(matches!(
        h.runner.process_next().await.unwrap(),
        Some(TaskResolution::Retrying(_))
    ));
}

#[tokio::test]
async fn test_runner_drains_queue_and_stops_on_shutdown() {
    let h = harness();
    let submitted = submit(&h, 12).await;

    let (tx, rx) = watch::channel(false);
    let runner = h.runner.clone();
    let handle = tokio::spawn(async move { runner.run(rx).await });

    let mut finished = false;
    for _ in 0..500 {
        if job(&h, submitted.id).await.status.is_terminal() {
            finished = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(finished, "screening job did not finish");

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    let done = job(&h, submitted.id).await;
    assert_eq!(done.processed_count, 12);
    assert_eq!(h.queue.stats().await.unwrap().completed, 12);
}

#[tokio::test]
async fn test_dead_holder_on_final_attempt_fails_the_resume() {
    let retry = RetryConfig {
        max_attempts: 1,
        base_delay_ms: 0,
        ..RetryConfig::default()
    };
    let h = build_harness(
        FakeParser::default(),
        FakeAnalyzer::default(),
        true,
        retry,
        test_worker(),
    );
    let submitted = submit(&h, 1).await;

    // A worker claims the only attempt and dies without settling it.
    let task = h
        .queue
        .dequeue("crashed-worker", Duration::ZERO)
        .await
        .unwrap()
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert_eq!(h.runner.process_next().await.unwrap(), None);
    assert_eq!(h.parser.calls.load(Ordering::SeqCst), 0);

    let stored = h.queue.find(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Failed);
    let done = job(&h, submitted.id).await;
    assert_eq!(done.failed_count, 1);
    assert_eq!(done.status, ScreeningStatus::Failed);

    // Reaping twice does not count the resume twice.
    assert_eq!(h.runner.process_next().await.unwrap(), None);
    assert_eq!(job(&h, submitted.id).await.failed_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_lost_lock_leaves_outcome_unrecorded() {
    let worker = WorkerConfig {
        lock_duration_seconds: 30,
        lock_renewal_seconds: 1,
        task_timeout_seconds: 60,
        ..test_worker()
    };
    let h = build_harness(
        FakeParser::default(),
        FakeAnalyzer {
            stall: Some(Duration::from_secs(10)),
            ..FakeAnalyzer::default()
        },
        true,
        RetryConfig::default(),
        worker,
    );
    let submitted = submit(&h, 1).await;
    let task = h
        .queue
        .dequeue(h.runner.worker_id(), Duration::from_secs(30))
        .await
        .unwrap()
        .unwrap();

    let runner = h.runner.clone();
    let running = tokio::spawn(async move { runner.process(task).await });

    // Take the task away between two renewals.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(
        h.queue.cancel_for_job(submitted.id, "taken over").await.unwrap(),
        1
    );

    assert_eq!(running.await.unwrap(), TaskResolution::Unrecorded);
    let stats = h.queue.stats().await.unwrap();
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.completed, 0);
}
