//! Screening task repository (the durable queue table).

use std::time::Duration;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::task::{QueueStats, Task, TaskStatus};

/// Repository for queued screening tasks.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return a reference to the pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a task by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM screening_tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to find task", e))
    }

    /// Insert a pending task inside an open transaction.
    pub async fn insert(tx: &mut Transaction<'_, Postgres>, task: &Task) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO screening_tasks \
             (id, screening_job_id, job_generation, resume_id, candidate_id, job_id, status, \
              priority, attempts, max_attempts, base_delay_ms, backoff_multiplier, max_delay_ms, \
              available_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING *",
        )
        .bind(task.id)
        .bind(task.screening_job_id)
        .bind(task.job_generation)
        .bind(task.resume_id)
        .bind(task.candidate_id)
        .bind(task.job_id)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.attempts)
        .bind(task.max_attempts)
        .bind(task.base_delay_ms)
        .bind(task.backoff_multiplier)
        .bind(task.max_delay_ms)
        .bind(task.available_at)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to enqueue task", e))
    }

    /// Claim the next ready task (SKIP LOCKED for concurrency).
    ///
    /// Ready means pending and past `available_at`, or running with an
    /// expired lock (the previous holder is presumed dead) and attempts
    /// left. Expired tasks without attempts left go through
    /// [`TaskRepository::reap_expired`] instead.
    pub async fn dequeue(&self, worker_id: &str, lock: Duration) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>(
            "UPDATE screening_tasks SET status = 'running', locked_by = $1, \
             locked_until = NOW() + make_interval(secs => $2), \
             attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                SELECT id FROM screening_tasks \
                WHERE (status = 'pending' AND available_at <= NOW()) \
                   OR (status = 'running' AND locked_until < NOW() \
                       AND attempts < max_attempts) \
                ORDER BY priority ASC, available_at ASC \
                FOR UPDATE SKIP LOCKED \
                LIMIT 1 \
             ) RETURNING *",
        )
        .bind(worker_id)
        .bind(lock.as_secs_f64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to dequeue task", e))
    }

    /// Extend the lock of a task this worker still holds.
    pub async fn renew_lock(&self, id: Uuid, worker_id: &str, lock: Duration) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE screening_tasks SET locked_until = NOW() + make_interval(secs => $3), \
             updated_at = NOW() \
             WHERE id = $1 AND locked_by = $2 AND status = 'running'",
        )
        .bind(id)
        .bind(worker_id)
        .bind(lock.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to renew task lock", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Mark a held task completed.
    pub async fn complete(&self, id: Uuid, worker_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE screening_tasks SET status = 'completed', locked_by = NULL, \
             locked_until = NULL, last_error = NULL, updated_at = NOW() \
             WHERE id = $1 AND locked_by = $2 AND status = 'running'",
        )
        .bind(id)
        .bind(worker_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to complete task", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Release a held task back to pending after `delay`.
    pub async fn retry(
        &self,
        id: Uuid,
        worker_id: &str,
        delay: Duration,
        error: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE screening_tasks SET status = 'pending', locked_by = NULL, \
             locked_until = NULL, available_at = NOW() + make_interval(secs => $3), \
             last_error = $4, updated_at = NOW() \
             WHERE id = $1 AND locked_by = $2 AND status = 'running'",
        )
        .bind(id)
        .bind(worker_id)
        .bind(delay.as_secs_f64())
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to reschedule task", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Move a held task to a terminal failure state.
    pub async fn finish(
        &self,
        id: Uuid,
        worker_id: &str,
        status: TaskStatus,
        error: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE screening_tasks SET status = $3, locked_by = NULL, locked_until = NULL, \
             last_error = $4, updated_at = NOW() \
             WHERE id = $1 AND locked_by = $2 AND status = 'running'",
        )
        .bind(id)
        .bind(worker_id)
        .bind(status)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to finish task", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Fail running tasks whose lock expired on their last attempt and
    /// return them. Each row is returned to exactly one caller.
    pub async fn reap_expired(&self, error: &str) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "UPDATE screening_tasks SET status = 'failed', locked_by = NULL, \
             locked_until = NULL, last_error = $1, updated_at = NOW() \
             WHERE status = 'running' AND locked_until < NOW() \
               AND attempts >= max_attempts \
             RETURNING *",
        )
        .bind(error)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to reap expired tasks", e)
        })
    }

    /// Cancel every non-terminal task of a screening job.
    pub async fn cancel_for_job(&self, screening_job_id: Uuid, reason: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE screening_tasks SET status = 'cancelled', locked_by = NULL, \
             locked_until = NULL, last_error = $2, updated_at = NOW() \
             WHERE screening_job_id = $1 AND status IN ('pending', 'running')",
        )
        .bind(screening_job_id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to cancel tasks", e))?;
        Ok(result.rows_affected())
    }

    /// Count tasks per status.
    pub async fn stats(&self) -> AppResult<QueueStats> {
        let rows: Vec<(TaskStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM screening_tasks GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Dependency, "Failed to count tasks", e)
                })?;

        let mut stats = QueueStats::default();
        for (status, count) in rows {
            stats.record(status, count.max(0) as u64);
        }
        Ok(stats)
    }
}
