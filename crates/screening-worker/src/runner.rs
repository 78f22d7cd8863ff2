//! Worker runner: claims tasks and runs them under a concurrency limit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing::{debug, error, info, trace, warn};

use screening_core::config::WorkerConfig;
use screening_core::result::AppResult;
use screening_database::TaskQueue;
use screening_database::queue::LOCK_EXPIRED_ON_FINAL_ATTEMPT;
use screening_entity::task::Task;

use crate::executor::{JobExecutionError, JobHandler};
use crate::lock::LockRenewer;

/// Where a processed task ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResolution {
    /// Handler succeeded and the task was completed.
    Completed,
    /// Transient failure; the task is queued again after the delay.
    Retrying(Duration),
    /// Permanent failure or retries exhausted.
    Failed,
    /// The task's job disappeared.
    Cancelled,
    /// The outcome could not be recorded (lock lost or queue unreachable);
    /// the task is redelivered once its lock expires.
    Unrecorded,
}

/// Polls the queue and executes tasks
#[derive(Debug, Clone)]
pub struct WorkerRunner {
    /// Durable task queue
    queue: Arc<dyn TaskQueue>,
    /// Task handler
    handler: Arc<dyn JobHandler>,
    /// Worker configuration
    config: WorkerConfig,
    /// Worker identifier recorded as lock owner
    worker_id: String,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        handler: Arc<dyn JobHandler>,
        config: WorkerConfig,
        worker_id: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            handler,
            config,
            worker_id: worker_id.into(),
        }
    }

    /// Lock owner name of this runner.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Run until the shutdown signal flips to `true`, then wait up to the
    /// grace period for in-flight tasks.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            worker_id = %self.worker_id,
            concurrency = self.config.concurrency,
            poll_interval_ms = self.config.poll_interval_ms,
            "Worker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let poll_interval = self.config.poll_interval();

        loop {
            if *shutdown.borrow() {
                break;
            }
            let permit = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            match self.queue.dequeue(&self.worker_id, self.config.lock_duration()).await {
                Ok(Some(task)) => {
                    let runner = self.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        runner.process(task).await;
                    });
                    continue;
                }
                Ok(None) => {
                    drop(permit);
                    trace!("No tasks available");
                    self.reap_expired().await;
                }
                Err(e) => {
                    drop(permit);
                    error!(worker_id = %self.worker_id, error = %e, "Failed to dequeue task");
                }
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = time::sleep(poll_interval) => {}
            }
        }

        info!(worker_id = %self.worker_id, "Worker waiting for in-flight tasks");
        let permits = u32::try_from(self.config.concurrency).unwrap_or(u32::MAX);
        match time::timeout(self.config.shutdown_grace(), semaphore.acquire_many(permits)).await {
            Ok(_) => info!(worker_id = %self.worker_id, "Worker shut down"),
            Err(_) => warn!(
                worker_id = %self.worker_id,
                "Shutdown grace period elapsed with tasks still running"
            ),
        }
    }

    /// Claim and process one task inline. `None` when nothing is ready.
    pub async fn process_next(&self) -> AppResult<Option<TaskResolution>> {
        self.reap_expired().await;
        match self
            .queue
            .dequeue(&self.worker_id, self.config.lock_duration())
            .await?
        {
            Some(task) => Ok(Some(self.process(task).await)),
            None => Ok(None),
        }
    }

    /// Execute a claimed task and record the outcome in the queue.
    pub async fn process(&self, task: Task) -> TaskResolution {
        debug!(
            task_id = %task.id,
            screening_job_id = %task.screening_job_id,
            attempt = task.attempts,
            max_attempts = task.max_attempts,
            "Processing task"
        );

        let renewer = LockRenewer::start(
            Arc::clone(&self.queue),
            self.worker_id.clone(),
            task.id,
            self.config.lock_duration(),
            self.config.lock_renewal(),
        );
        let timeout = self.config.task_timeout();
        let outcome = match time::timeout(timeout, self.handler.execute(&task)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(JobExecutionError::Transient(format!(
                "Task timed out after {}s",
                timeout.as_secs()
            ))),
        };
        if renewer.stop() {
            warn!(
                task_id = %task.id,
                worker_id = %self.worker_id,
                "Task lock lost during processing, outcome left to the next holder"
            );
            return TaskResolution::Unrecorded;
        }

        match self.settle(&task, outcome).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!(task_id = %task.id, error = %e, "Failed to record task outcome");
                TaskResolution::Unrecorded
            }
        }
    }

    /// Fail tasks whose holder died on their final attempt and count them
    /// against their jobs.
    async fn reap_expired(&self) {
        let reaped = match self.queue.reap_expired().await {
            Ok(reaped) => reaped,
            Err(e) => {
                error!(worker_id = %self.worker_id, error = %e, "Failed to reap expired tasks");
                return;
            }
        };
        for task in reaped {
            let reason = task
                .last_error
                .clone()
                .unwrap_or_else(|| LOCK_EXPIRED_ON_FINAL_ATTEMPT.to_string());
            self.handler.on_failed(&task, &reason).await;
        }
    }

    async fn settle(
        &self,
        task: &Task,
        outcome: Result<(), JobExecutionError>,
    ) -> AppResult<TaskResolution> {
        let worker = self.worker_id.as_str();
        let (recorded, resolution) = match outcome {
            Ok(()) => (
                self.queue.complete(task.id, worker).await?,
                TaskResolution::Completed,
            ),
            Err(JobExecutionError::Cancelled(reason)) => {
                info!(task_id = %task.id, reason = %reason, "Task cancelled");
                (
                    self.queue.cancel(task.id, worker, &reason).await?,
                    TaskResolution::Cancelled,
                )
            }
            Err(JobExecutionError::Transient(message)) if task.can_retry() => {
                let delay = task.next_delay();
                warn!(
                    task_id = %task.id,
                    attempt = task.attempts,
                    max_attempts = task.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "Task failed, retrying"
                );
                (
                    self.queue.retry(task.id, worker, delay, &message).await?,
                    TaskResolution::Retrying(delay),
                )
            }
            Err(JobExecutionError::Transient(message) | JobExecutionError::Permanent(message)) => {
                let failed = self.queue.fail(task.id, worker, &message).await?;
                if failed {
                    self.handler.on_failed(task, &message).await;
                }
                (failed, TaskResolution::Failed)
            }
        };

        if !recorded {
            warn!(
                task_id = %task.id,
                worker_id = worker,
                "Task lock lost before its outcome was recorded"
            );
            return Ok(TaskResolution::Unrecorded);
        }
        debug!(task_id = %task.id, ?resolution, "Task settled");
        Ok(resolution)
    }
}
