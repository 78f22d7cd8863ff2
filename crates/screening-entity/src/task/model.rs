//! Task entity model.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::retry::RetryPolicy;
use super::status::TaskStatus;

/// One resume's unit of work in the durable queue.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique task identifier.
    pub id: Uuid,
    /// Screening job the resume belongs to.
    pub screening_job_id: Uuid,
    /// Generation token of the job at enqueue time.
    pub job_generation: Uuid,
    /// Staged resume payload.
    pub resume_id: Uuid,
    /// Candidate the resume describes.
    pub candidate_id: Uuid,
    /// Job posting to score against.
    pub job_id: Uuid,
    /// Current status.
    pub status: TaskStatus,
    /// Lower values are dequeued first.
    pub priority: i32,
    /// Deliveries so far.
    pub attempts: i32,
    /// Maximum deliveries.
    pub max_attempts: i32,
    /// First retry delay in milliseconds.
    pub base_delay_ms: i64,
    /// Backoff factor.
    pub backoff_multiplier: f64,
    /// Retry delay ceiling in milliseconds.
    pub max_delay_ms: i64,
    /// Not dequeued before this instant.
    pub available_at: DateTime<Utc>,
    /// Worker holding the lock.
    pub locked_by: Option<String>,
    /// Lock expiry; a running task past this is redelivered.
    pub locked_until: Option<DateTime<Utc>>,
    /// Last failure message.
    pub last_error: Option<String>,
    /// When the task was enqueued.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Retry policy the task was enqueued with.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1) as u32,
            base_delay: Duration::from_millis(self.base_delay_ms.max(0) as u64),
            backoff_multiplier: self.backoff_multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms.max(0) as u64),
        }
    }

    /// Whether another delivery is allowed after the current one fails.
    pub fn can_retry(&self) -> bool {
        self.retry_policy().should_retry(self.attempts.max(0) as u32)
    }

    /// Delay before the next delivery.
    pub fn next_delay(&self) -> Duration {
        self.retry_policy()
            .delay_for_attempt(self.attempts.max(1) as u32)
    }
}

/// Data required to enqueue a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    /// Screening job.
    pub screening_job_id: Uuid,
    /// Job generation token.
    pub job_generation: Uuid,
    /// Staged resume.
    pub resume_id: Uuid,
    /// Candidate.
    pub candidate_id: Uuid,
    /// Job posting.
    pub job_id: Uuid,
    /// Priority.
    pub priority: i32,
    /// Retry policy.
    pub retry: RetryPolicy,
}

impl NewTask {
    /// Materialise a pending task row.
    pub fn into_task(self) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            screening_job_id: self.screening_job_id,
            job_generation: self.job_generation,
            resume_id: self.resume_id,
            candidate_id: self.candidate_id,
            job_id: self.job_id,
            status: TaskStatus::Pending,
            priority: self.priority,
            attempts: 0,
            max_attempts: self.retry.max_attempts.min(i32::MAX as u32) as i32,
            base_delay_ms: self.retry.base_delay.as_millis().min(i64::MAX as u128) as i64,
            backoff_multiplier: self.retry.backoff_multiplier,
            max_delay_ms: self.retry.max_delay.as_millis().min(i64::MAX as u128) as i64,
            available_at: now,
            locked_by: None,
            locked_until: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Task counts per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QueueStats {
    /// Waiting tasks.
    pub pending: u64,
    /// Locked tasks.
    pub running: u64,
    /// Finished tasks.
    pub completed: u64,
    /// Failed tasks.
    pub failed: u64,
    /// Cancelled tasks.
    pub cancelled: u64,
}

impl QueueStats {
    /// Add `count` tasks of `status`.
    pub fn record(&mut self, status: TaskStatus, count: u64) {
        match status {
            TaskStatus::Pending => self.pending += count,
            TaskStatus::Running => self.running += count,
            TaskStatus::Completed => self.completed += count,
            TaskStatus::Failed => self.failed += count,
            TaskStatus::Cancelled => self.cancelled += count,
        }
    }

    /// Total tasks.
    pub fn total(&self) -> u64 {
        self.pending + self.running + self.completed + self.failed + self.cancelled
    }
}
