//! In-memory [`TaskQueue`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use screening_core::result::AppResult;
use screening_entity::task::{NewTask, QueueStats, Task, TaskStatus};

use crate::queue::{LOCK_EXPIRED_ON_FINAL_ATTEMPT, TaskQueue};

/// [`TaskQueue`] kept in process memory, with the same locking and
/// redelivery rules as the Postgres queue.
#[derive(Debug, Default)]
pub struct MemoryTaskQueue {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }
}

fn deadline(from: DateTime<Utc>, after: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(after)
        .ok()
        .and_then(|d| from.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn is_ready(task: &Task, now: DateTime<Utc>) -> bool {
    match task.status {
        TaskStatus::Pending => task.available_at <= now,
        TaskStatus::Running => is_expired(task, now) && task.attempts < task.max_attempts,
        _ => false,
    }
}

fn is_expired(task: &Task, now: DateTime<Utc>) -> bool {
    task.status == TaskStatus::Running && task.locked_until.is_some_and(|until| until < now)
}

fn held_by<'a>(tasks: &'a mut [Task], task_id: Uuid, worker_id: &str) -> Option<&'a mut Task> {
    tasks.iter_mut().find(|t| {
        t.id == task_id && t.status == TaskStatus::Running && t.locked_by.as_deref() == Some(worker_id)
    })
}

fn release(task: &mut Task, status: TaskStatus, error: Option<&str>) {
    task.status = status;
    task.locked_by = None;
    task.locked_until = None;
    task.last_error = error.map(str::to_string);
    task.updated_at = Utc::now();
}

#[async_trait]
impl TaskQueue for MemoryTaskQueue {
    async fn enqueue_batch(&self, tasks: Vec<NewTask>) -> AppResult<Vec<Task>> {
        let created: Vec<Task> = tasks.into_iter().map(NewTask::into_task).collect();
        self.tasks.lock().await.extend(created.iter().cloned());
        Ok(created)
    }

    async fn dequeue(&self, worker_id: &str, lock: Duration) -> AppResult<Option<Task>> {
        let mut tasks = self.tasks.lock().await;
        let now = Utc::now();
        let next = tasks
            .iter_mut()
            .filter(|t| is_ready(t, now))
            .min_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then(a.available_at.cmp(&b.available_at))
            });

        Ok(next.map(|task| {
            task.status = TaskStatus::Running;
            task.locked_by = Some(worker_id.to_string());
            task.locked_until = Some(deadline(now, lock));
            task.attempts += 1;
            task.updated_at = now;
            task.clone()
        }))
    }

    async fn reap_expired(&self) -> AppResult<Vec<Task>> {
        let mut tasks = self.tasks.lock().await;
        let now = Utc::now();
        let mut reaped = Vec::new();
        for task in tasks
            .iter_mut()
            .filter(|t| is_expired(t, now) && t.attempts >= t.max_attempts)
        {
            release(task, TaskStatus::Failed, Some(LOCK_EXPIRED_ON_FINAL_ATTEMPT));
            reaped.push(task.clone());
        }
        Ok(reaped)
    }

    async fn renew_lock(
        &self,
        task_id: Uuid,
        worker_id: &str,
        lock: Duration,
    ) -> AppResult<bool> {
        let mut tasks = self.tasks.lock().await;
        Ok(match held_by(&mut tasks, task_id, worker_id) {
            Some(task) => {
                let now = Utc::now();
                task.locked_until = Some(deadline(now, lock));
                task.updated_at = now;
                true
            }
            None => false,
        })
    }

    async fn complete(&self, task_id: Uuid, worker_id: &str) -> AppResult<bool> {
        let mut tasks = self.tasks.lock().await;
        Ok(match held_by(&mut tasks, task_id, worker_id) {
            Some(task) => {
                release(task, TaskStatus::Completed, None);
                true
            }
            None => false,
        })
    }

    async fn retry(
        &self,
        task_id: Uuid,
        worker_id: &str,
        delay: Duration,
        error: &str,
    ) -> AppResult<bool> {
        let mut tasks = self.tasks.lock().await;
        Ok(match held_by(&mut tasks, task_id, worker_id) {
            Some(task) => {
                release(task, TaskStatus::Pending, Some(error));
                task.available_at = deadline(Utc::now(), delay);
                true
            }
            None => false,
        })
    }

    async fn fail(&self, task_id: Uuid, worker_id: &str, error: &str) -> AppResult<bool> {
        let mut tasks = self.tasks.lock().await;
        Ok(match held_by(&mut tasks, task_id, worker_id) {
            Some(task) => {
                release(task, TaskStatus::Failed, Some(error));
                true
            }
            None => false,
        })
    }

    async fn cancel(&self, task_id: Uuid, worker_id: &str, reason: &str) -> AppResult<bool> {
        let mut tasks = self.tasks.lock().await;
        Ok(match held_by(&mut tasks, task_id, worker_id) {
            Some(task) => {
                release(task, TaskStatus::Cancelled, Some(reason));
                true
            }
            None => false,
        })
    }

    async fn cancel_for_job(&self, screening_job_id: Uuid, reason: &str) -> AppResult<u64> {
        let mut tasks = self.tasks.lock().await;
        let mut cancelled = 0;
        for task in tasks.iter_mut().filter(|t| {
            t.screening_job_id == screening_job_id
                && matches!(t.status, TaskStatus::Pending | TaskStatus::Running)
        }) {
            release(task, TaskStatus::Cancelled, Some(reason));
            cancelled += 1;
        }
        Ok(cancelled)
    }

    async fn find(&self, task_id: Uuid) -> AppResult<Option<Task>> {
        Ok(self
            .tasks
            .lock()
            .await
            .iter()
            .find(|t| t.id == task_id)
            .cloned())
    }

    async fn stats(&self) -> AppResult<QueueStats> {
        let tasks = self.tasks.lock().await;
        let mut stats = QueueStats::default();
        for task in tasks.iter() {
            stats.record(task.status, 1);
        }
        Ok(stats)
    }
}
