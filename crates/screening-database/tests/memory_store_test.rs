//! Behaviour of the in-memory screening store.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use uuid::Uuid;

use screening_database::{MemoryScreeningStore, ResultWrite, ScreeningStore};
use screening_entity::candidate::StagedResume;
use screening_entity::screening::{
    MatchBands, NewScreeningResult, ResultFilter, ResultSortBy, ScreeningJob, ScreeningStatus,
};

fn staged(job: &ScreeningJob, name: &str) -> StagedResume {
    StagedResume {
        id: Uuid::new_v4(),
        screening_job_id: job.id,
        candidate_id: Uuid::new_v4(),
        filename: name.to_string(),
        content: b"resume".to_vec(),
        size_bytes: 6,
        created_at: Utc::now(),
    }
}

fn scored(job: &ScreeningJob, candidate_id: Uuid, score: i32) -> NewScreeningResult {
    NewScreeningResult {
        screening_job_id: job.id,
        job_generation: job.generation,
        candidate_id,
        filename: format!("{candidate_id}.pdf"),
        match_percentage: score,
        skills_matched: vec!["Rust".to_string()],
        skills_missing: vec![],
        strengths: vec![],
        improvement_areas: vec![],
        recommendations: vec![],
        experience_years: 3.0,
    }
}

async fn store_with_job(total: i32) -> (MemoryScreeningStore, ScreeningJob) {
    let store = MemoryScreeningStore::new();
    let job = ScreeningJob::new(Uuid::new_v4(), Uuid::new_v4(), total);
    let resumes: Vec<StagedResume> = (0..total).map(|i| staged(&job, &format!("{i}.pdf"))).collect();
    let job = store.create_job(&job, &resumes).await.unwrap();
    (store, job)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_are_not_lost() {
    let (store, job) = store_with_job(50).await;
    let store = Arc::new(store);
    let job_id = job.id;

    let mut set = JoinSet::new();
    for _ in 0..50 {
        let store = Arc::clone(&store);
        set.spawn(async move { store.increment_processed(job_id).await });
    }
    while let Some(joined) = set.join_next().await {
        assert!(joined.unwrap().unwrap().is_some());
    }

    let job = store.find_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.processed_count, 50);
    assert_eq!(job.status, ScreeningStatus::Completed);
}

#[tokio::test]
async fn test_processed_count_never_exceeds_total() {
    let (store, job) = store_with_job(1).await;
    assert!(store.increment_processed(job.id).await.unwrap().is_some());
    assert!(store.increment_processed(job.id).await.unwrap().is_none());
    let job = store.find_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.processed_count, 1);
}

#[tokio::test]
async fn test_all_failed_marks_job_failed() {
    let (store, job) = store_with_job(2).await;
    store.increment_failed(job.id).await.unwrap();
    let job = store.increment_failed(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, ScreeningStatus::Failed);
}

#[tokio::test]
async fn test_save_result_upserts_per_candidate() {
    let (store, job) = store_with_job(2).await;
    let candidate = Uuid::new_v4();

    let first = store.save_result(&scored(&job, candidate, 40)).await.unwrap();
    assert!(matches!(first, ResultWrite::Inserted { .. }));
    let second = store.save_result(&scored(&job, candidate, 80)).await.unwrap();
    assert!(matches!(second, ResultWrite::Updated(ref r) if r.match_percentage == 80));

    let results = store.all_results(job.id).await.unwrap();
    assert_eq!(results.len(), 1);
    let job = store.find_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.processed_count, 1);
}

#[tokio::test]
async fn test_save_result_is_fenced_after_delete() {
    let (store, job) = store_with_job(1).await;
    assert!(store.delete_job(job.id).await.unwrap());
    let write = store.save_result(&scored(&job, Uuid::new_v4(), 90)).await.unwrap();
    assert!(matches!(write, ResultWrite::Fenced));
    assert!(store.all_results(job.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_result_is_fenced_by_generation() {
    let (store, job) = store_with_job(1).await;
    let mut stale = scored(&job, Uuid::new_v4(), 90);
    stale.job_generation = Uuid::new_v4();
    assert!(matches!(store.save_result(&stale).await.unwrap(), ResultWrite::Fenced));
}

#[tokio::test]
async fn test_delete_cascades_results_and_resumes() {
    let (store, job) = store_with_job(2).await;
    store.save_result(&scored(&job, Uuid::new_v4(), 70)).await.unwrap();
    store.save_result(&scored(&job, Uuid::new_v4(), 30)).await.unwrap();

    assert!(store.delete_job(job.id).await.unwrap());
    assert!(store.find_job(job.id).await.unwrap().is_none());
    assert!(store.all_results(job.id).await.unwrap().is_empty());
    let page = store.find_results(job.id, &ResultFilter::default()).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(!store.delete_job(job.id).await.unwrap());
}

#[tokio::test]
async fn test_find_results_filters_sorts_and_pages() {
    let (store, job) = store_with_job(4).await;
    for score in [55, 90, 20, 75] {
        store.save_result(&scored(&job, Uuid::new_v4(), score)).await.unwrap();
    }

    let filter = ResultFilter {
        min_match_percentage: Some(50),
        limit: 2,
        ..ResultFilter::default()
    };
    let page = store.find_results(job.id, &filter).await.unwrap();
    assert_eq!(page.total, 3);
    let scores: Vec<i32> = page.results.iter().map(|r| r.match_percentage).collect();
    assert_eq!(scores, vec![90, 75]);

    let ascending = ResultFilter {
        sort_by: Some(ResultSortBy::Match),
        sort_desc: Some(false),
        offset: 1,
        limit: 10,
        ..ResultFilter::default()
    };
    let page = store.find_results(job.id, &ascending).await.unwrap();
    let scores: Vec<i32> = page.results.iter().map(|r| r.match_percentage).collect();
    assert_eq!(scores, vec![55, 75, 90]);
}

#[tokio::test]
async fn test_shortlist_touches_only_given_ids() {
    let (store, job) = store_with_job(3).await;
    for score in [10, 20, 30] {
        store.save_result(&scored(&job, Uuid::new_v4(), score)).await.unwrap();
    }
    let results = store.all_results(job.id).await.unwrap();
    let chosen = vec![results[0].id, results[2].id];

    let updated = store.shortlist(job.id, &chosen).await.unwrap();
    assert_eq!(updated, 2);

    for result in store.all_results(job.id).await.unwrap() {
        assert_eq!(result.shortlisted, chosen.contains(&result.id));
    }
    let shortlisted = store.shortlisted(job.id).await.unwrap();
    assert_eq!(shortlisted.len(), 2);
    assert_eq!(shortlisted[0].match_percentage, 30);
}

#[tokio::test]
async fn test_shortlist_ignores_other_jobs_results() {
    let (store, job) = store_with_job(1).await;
    store.save_result(&scored(&job, Uuid::new_v4(), 10)).await.unwrap();
    let foreign = store.all_results(job.id).await.unwrap()[0].id;
    assert_eq!(store.shortlist(Uuid::new_v4(), &[foreign]).await.unwrap(), 0);
}

#[tokio::test]
async fn test_analytics_counts_bands() {
    let (store, job) = store_with_job(3).await;
    for score in [80, 60, 10] {
        store.save_result(&scored(&job, Uuid::new_v4(), score)).await.unwrap();
    }
    let analytics = store.analytics(job.id, MatchBands::default()).await.unwrap();
    assert_eq!(analytics.total_screened, 3);
    assert_eq!(analytics.strong_matches, 1);
    assert_eq!(analytics.moderate_matches, 1);
    assert_eq!(analytics.weak_matches, 1);
    assert!((analytics.average_match - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_list_jobs_scoped_to_employer() {
    let store = MemoryScreeningStore::new();
    let employer = Uuid::new_v4();
    for _ in 0..3 {
        let job = ScreeningJob::new(employer, Uuid::new_v4(), 1);
        store.create_job(&job, &[]).await.unwrap();
    }
    let other = ScreeningJob::new(Uuid::new_v4(), Uuid::new_v4(), 1);
    store.create_job(&other, &[]).await.unwrap();

    let (jobs, total) = store.list_jobs(employer, 2, 0).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.employer_id == employer));
}
