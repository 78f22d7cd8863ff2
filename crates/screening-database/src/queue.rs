//! Durable at-least-once task queue.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::task::{NewTask, QueueStats, Task, TaskStatus};

use crate::repositories::TaskRepository;

/// Error recorded on tasks failed by [`TaskQueue::reap_expired`].
pub const LOCK_EXPIRED_ON_FINAL_ATTEMPT: &str = "Lock expired on the final attempt";

/// Queue delivering one task per resume to the worker pool.
///
/// Delivery is at-least-once: a task whose lock expires is handed to the
/// next caller of [`TaskQueue::dequeue`] while it has attempts left, and to
/// [`TaskQueue::reap_expired`] once it has none. State transitions taken by a
/// worker only apply while it still holds the lock; they return `false`
/// once ownership was lost.
#[async_trait]
pub trait TaskQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Enqueue tasks, all or nothing.
    async fn enqueue_batch(&self, tasks: Vec<NewTask>) -> AppResult<Vec<Task>>;

    /// Claim the next ready task and lock it for `lock`.
    async fn dequeue(&self, worker_id: &str, lock: Duration) -> AppResult<Option<Task>>;

    /// Fail tasks whose lock expired on their final attempt and return
    /// them, each to exactly one caller.
    async fn reap_expired(&self) -> AppResult<Vec<Task>>;

    /// Extend a held lock; `false` if the lock was lost.
    async fn renew_lock(&self, task_id: Uuid, worker_id: &str, lock: Duration)
    -> AppResult<bool>;

    /// Mark a held task completed.
    async fn complete(&self, task_id: Uuid, worker_id: &str) -> AppResult<bool>;

    /// Put a held task back after `delay`.
    async fn retry(
        &self,
        task_id: Uuid,
        worker_id: &str,
        delay: Duration,
        error: &str,
    ) -> AppResult<bool>;

    /// Mark a held task failed for good.
    async fn fail(&self, task_id: Uuid, worker_id: &str, error: &str) -> AppResult<bool>;

    /// Mark a held task cancelled.
    async fn cancel(&self, task_id: Uuid, worker_id: &str, reason: &str) -> AppResult<bool>;

    /// Cancel every outstanding task of a screening job.
    async fn cancel_for_job(&self, screening_job_id: Uuid, reason: &str) -> AppResult<u64>;

    /// Find a task by ID.
    async fn find(&self, task_id: Uuid) -> AppResult<Option<Task>>;

    /// Task counts per status.
    async fn stats(&self) -> AppResult<QueueStats>;
}

/// [`TaskQueue`] backed by the `screening_tasks` table.
#[derive(Debug, Clone)]
pub struct PgTaskQueue {
    tasks: TaskRepository,
}

impl PgTaskQueue {
    /// Create a queue over the task repository.
    pub fn new(tasks: TaskRepository) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl TaskQueue for PgTaskQueue {
    async fn enqueue_batch(&self, tasks: Vec<NewTask>) -> AppResult<Vec<Task>> {
        let mut tx = self.tasks.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to begin transaction", e)
        })?;

        let mut enqueued = Vec::with_capacity(tasks.len());
        for new_task in tasks {
            let task = new_task.into_task();
            enqueued.push(TaskRepository::insert(&mut tx, &task).await?);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to commit enqueued tasks", e)
        })?;
        info!(count = enqueued.len(), "Tasks enqueued");
        Ok(enqueued)
    }

    async fn dequeue(&self, worker_id: &str, lock: Duration) -> AppResult<Option<Task>> {
        let task = self.tasks.dequeue(worker_id, lock).await?;
        if let Some(task) = &task {
            debug!(task_id = %task.id, attempt = task.attempts, worker_id, "Task claimed");
        }
        Ok(task)
    }

    async fn reap_expired(&self) -> AppResult<Vec<Task>> {
        let reaped = self.tasks.reap_expired(LOCK_EXPIRED_ON_FINAL_ATTEMPT).await?;
        if !reaped.is_empty() {
            warn!(count = reaped.len(), "Failed tasks whose lock expired on their final attempt");
        }
        Ok(reaped)
    }

    async fn renew_lock(
        &self,
        task_id: Uuid,
        worker_id: &str,
        lock: Duration,
    ) -> AppResult<bool> {
        self.tasks.renew_lock(task_id, worker_id, lock).await
    }

    async fn complete(&self, task_id: Uuid, worker_id: &str) -> AppResult<bool> {
        self.tasks.complete(task_id, worker_id).await
    }

    async fn retry(
        &self,
        task_id: Uuid,
        worker_id: &str,
        delay: Duration,
        error: &str,
    ) -> AppResult<bool> {
        self.tasks.retry(task_id, worker_id, delay, error).await
    }

    async fn fail(&self, task_id: Uuid, worker_id: &str, error: &str) -> AppResult<bool> {
        self.tasks
            .finish(task_id, worker_id, TaskStatus::Failed, error)
            .await
    }

    async fn cancel(&self, task_id: Uuid, worker_id: &str, reason: &str) -> AppResult<bool> {
        self.tasks
            .finish(task_id, worker_id, TaskStatus::Cancelled, reason)
            .await
    }

    async fn cancel_for_job(&self, screening_job_id: Uuid, reason: &str) -> AppResult<u64> {
        self.tasks.cancel_for_job(screening_job_id, reason).await
    }

    async fn find(&self, task_id: Uuid) -> AppResult<Option<Task>> {
        self.tasks.find_by_id(task_id).await
    }

    async fn stats(&self) -> AppResult<QueueStats> {
        self.tasks.stats().await
    }
}
