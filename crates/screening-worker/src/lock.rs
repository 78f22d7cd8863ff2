//! Keeps a claimed task's lock alive while it is being processed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

use screening_database::TaskQueue;

/// Background renewal of one task's lock. Stops when dropped.
#[derive(Debug)]
pub struct LockRenewer {
    handle: JoinHandle<()>,
    lost: Arc<AtomicBool>,
}

impl LockRenewer {
    /// Start renewing `task_id` for `lock` every `interval`.
    pub fn start(
        queue: Arc<dyn TaskQueue>,
        worker_id: String,
        task_id: Uuid,
        lock: Duration,
        interval: Duration,
    ) -> Self {
        let lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&lost);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match queue.renew_lock(task_id, &worker_id, lock).await {
                    Ok(true) => debug!(%task_id, "Task lock renewed"),
                    Ok(false) => {
                        warn!(%task_id, %worker_id, "Task lock lost, another worker may redeliver it");
                        flag.store(true, Ordering::SeqCst);
                        break;
                    }
                    Err(e) => warn!(%task_id, error = %e, "Task lock renewal failed"),
                }
            }
        });

        Self { handle, lost }
    }

    /// Whether a renewal found the lock taken away.
    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    /// Stop renewing and report whether the lock was lost meanwhile.
    pub fn stop(self) -> bool {
        self.handle.abort();
        self.is_lost()
    }
}

impl Drop for LockRenewer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
