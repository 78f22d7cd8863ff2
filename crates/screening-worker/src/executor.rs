//! Task handler contract and failure classification.

use async_trait::async_trait;

use screening_core::error::{AppError, ErrorKind};
use screening_entity::task::Task;

/// Processes one claimed task.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Run the task to completion.
    async fn execute(&self, task: &Task) -> Result<(), JobExecutionError>;

    /// Called once after the queue records the task as failed for good.
    async fn on_failed(&self, task: &Task, error: &str);
}

/// Error from task execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent task failure: {0}")]
    Permanent(String),

    /// Transient failure, retry per the task's policy
    #[error("Transient task failure: {0}")]
    Transient(String),

    /// The work no longer applies (its job was deleted or replaced)
    #[error("Task cancelled: {0}")]
    Cancelled(String),
}

impl JobExecutionError {
    /// Whether the runner should consider another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<AppError> for JobExecutionError {
    fn from(err: AppError) -> Self {
        let message = err.to_string();
        match err.kind {
            ErrorKind::Dependency | ErrorKind::Timeout | ErrorKind::Serialization => {
                Self::Transient(message)
            }
            ErrorKind::NotFound
            | ErrorKind::Validation
            | ErrorKind::Conflict
            | ErrorKind::Configuration
            | ErrorKind::Internal => Self::Permanent(message),
        }
    }
}
