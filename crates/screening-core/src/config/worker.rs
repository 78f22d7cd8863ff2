//! Worker pool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Screening worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker pool runs inside this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of tasks processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Delay in milliseconds between queue polls when idle.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How long a dequeued task stays locked to one worker.
    #[serde(default = "default_lock_duration")]
    pub lock_duration_seconds: u64,
    /// How often an in-flight task's lock is extended.
    #[serde(default = "default_lock_renewal")]
    pub lock_renewal_seconds: u64,
    /// Upper bound for processing one task, collaborator calls included.
    #[serde(default = "default_task_timeout")]
    pub task_timeout_seconds: u64,
    /// How long shutdown waits for in-flight tasks.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            poll_interval_ms: default_poll_interval(),
            lock_duration_seconds: default_lock_duration(),
            lock_renewal_seconds: default_lock_renewal(),
            task_timeout_seconds: default_task_timeout(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

impl WorkerConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Lock duration as a [`Duration`].
    pub fn lock_duration(&self) -> Duration {
        Duration::from_secs(self.lock_duration_seconds)
    }

    /// Lock renewal interval as a [`Duration`].
    pub fn lock_renewal(&self) -> Duration {
        Duration::from_secs(self.lock_renewal_seconds)
    }

    /// Per-task timeout as a [`Duration`].
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_seconds)
    }

    /// Shutdown grace period as a [`Duration`].
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    5
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_lock_duration() -> u64 {
    30
}

fn default_lock_renewal() -> u64 {
    15
}

fn default_task_timeout() -> u64 {
    120
}

fn default_shutdown_grace() -> u64 {
    30
}
