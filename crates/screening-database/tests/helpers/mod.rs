//! Shared setup for the PostgreSQL integration tests.
//!
//! These tests run only when `DATABASE_URL` points at a disposable
//! database; without it every test returns early.

#![allow(dead_code)]

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use screening_core::config::DatabaseConfig;
use screening_database::{DatabasePool, PgScreeningStore, ScreeningStore, migration};
use screening_entity::candidate::StagedResume;
use screening_entity::screening::{NewScreeningResult, ScreeningJob};
use screening_entity::task::{NewTask, RetryPolicy};

/// Migrated connection to the test database.
pub struct TestDb {
    /// Pool for stores, queues and direct queries
    pub pool: PgPool,
}

impl TestDb {
    /// Connect and migrate, or `None` when `DATABASE_URL` is unset.
    pub async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };
        let config = DatabaseConfig {
            url,
            max_connections: 20,
            ..DatabaseConfig::default()
        };
        let database = DatabasePool::connect(&config)
            .await
            .expect("Failed to connect to test database");
        migration::run_migrations(database.pool())
            .await
            .expect("Failed to run migrations");
        Some(Self {
            pool: database.pool().clone(),
        })
    }

    /// Store over this database.
    pub fn store(&self) -> PgScreeningStore {
        PgScreeningStore::new(self.pool.clone())
    }

    /// Remove every queued task so dequeue only sees the calling test's work.
    pub async fn clear_tasks(&self) {
        sqlx::query("DELETE FROM screening_tasks")
            .execute(&self.pool)
            .await
            .expect("Failed to clear tasks");
    }

    /// Count rows of a table belonging to a screening job.
    pub async fn count_for_job(&self, table: &str, screening_job_id: Uuid) -> i64 {
        let query = format!("SELECT COUNT(*) FROM {table} WHERE screening_job_id = $1");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(screening_job_id)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count rows");
        count
    }
}

/// Stage a job with `total` resumes.
pub async fn create_job(
    store: &PgScreeningStore,
    total: i32,
) -> (ScreeningJob, Vec<StagedResume>) {
    let job = ScreeningJob::new(Uuid::new_v4(), Uuid::new_v4(), total);
    let resumes: Vec<StagedResume> = (0..total)
        .map(|i| StagedResume {
            id: Uuid::new_v4(),
            screening_job_id: job.id,
            candidate_id: Uuid::new_v4(),
            filename: format!("candidate-{i}.pdf"),
            content: b"%PDF-1.7 resume".to_vec(),
            size_bytes: 15,
            created_at: Utc::now(),
        })
        .collect();
    let job = store
        .create_job(&job, &resumes)
        .await
        .expect("Failed to create screening job");
    (job, resumes)
}

/// One queued task per staged resume.
pub fn tasks_for(job: &ScreeningJob, resumes: &[StagedResume], retry: RetryPolicy) -> Vec<NewTask> {
    resumes
        .iter()
        .map(|resume| NewTask {
            screening_job_id: job.id,
            job_generation: job.generation,
            resume_id: resume.id,
            candidate_id: resume.candidate_id,
            job_id: job.job_id,
            priority: 0,
            retry,
        })
        .collect()
}

/// A scored result for a candidate of `job`.
pub fn scored(job: &ScreeningJob, candidate_id: Uuid, score: i32) -> NewScreeningResult {
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
        experience_years: 4.0,
    }
}
