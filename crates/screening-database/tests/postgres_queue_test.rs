//! Task queue behaviour against PostgreSQL.
//!
//! Dequeue sees the whole table, so these tests clear it and run one at a
//! time.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use screening_database::repositories::TaskRepository;
use screening_database::{PgTaskQueue, TaskQueue};
use screening_entity::task::{RetryPolicy, TaskStatus};

use helpers::TestDb;

const LOCK: Duration = Duration::from_secs(30);

static SERIAL: Mutex<()> = Mutex::const_new(());

fn queue(db: &TestDb) -> Arc<PgTaskQueue> {
    Arc::new(PgTaskQueue::new(TaskRepository::new(db.pool.clone())))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_workers_never_claim_the_same_task() {
    let _serial = SERIAL.lock().await;
    let Some(db) = TestDb::connect().await else {
        return;
    };
    db.clear_tasks().await;
    let queue = queue(&db);
    let (job, resumes) = helpers::create_job(&db.store(), 12).await;
    queue
        .enqueue_batch(helpers::tasks_for(&job, &resumes, RetryPolicy::default()))
        .await
        .unwrap();

    let mut set = JoinSet::new();
    for worker in 0..4 {
        let queue = Arc::clone(&queue);
        set.spawn(async move {
            let worker_id = format!("worker-{worker}");
            let mut claimed = Vec::new();
            while let Some(task) = queue.dequeue(&worker_id, LOCK).await.unwrap() {
                assert_eq!(task.locked_by.as_deref(), Some(worker_id.as_str()));
                claimed.push(task.id);
            }
            claimed
        });
    }

    let mut seen = HashSet::new();
    while let Some(joined) = set.join_next().await {
        for id in joined.unwrap() {
            assert!(seen.insert(id), "task {id} claimed twice");
        }
    }
    assert_eq!(seen.len(), 12);
    assert_eq!(queue.stats().await.unwrap().running, 12);
}

#[tokio::test]
async fn test_expired_lock_is_reclaimed_and_old_holder_fenced() {
    let _serial = SERIAL.lock().await;
    let Some(db) = TestDb::connect().await else {
        return;
    };
    db.clear_tasks().await;
    let queue = queue(&db);
    let (job, resumes) = helpers::create_job(&db.store(), 1).await;
    queue
        .enqueue_batch(helpers::tasks_for(&job, &resumes, RetryPolicy::default()))
        .await
        .unwrap();

    let first = queue.dequeue("w1", Duration::ZERO).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let again = queue.dequeue("w2", LOCK).await.unwrap().unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.attempts, 2);

    assert!(!queue.renew_lock(first.id, "w1", LOCK).await.unwrap());
    assert!(!queue.complete(first.id, "w1").await.unwrap());
    assert!(queue.complete(first.id, "w2").await.unwrap());
    assert_eq!(
        queue.find(first.id).await.unwrap().unwrap().status,
        TaskStatus::Completed
    );
}

#[tokio::test]
async fn test_expired_final_attempt_is_reaped_once() {
    let _serial = SERIAL.lock().await;
    let Some(db) = TestDb::connect().await else {
        return;
    };
    db.clear_tasks().await;
    let queue = queue(&db);
    let (job, resumes) = helpers::create_job(&db.store(), 1).await;
    let single = RetryPolicy {
        max_attempts: 1,
        ..RetryPolicy::default()
    };
    queue
        .enqueue_batch(helpers::tasks_for(&job, &resumes, single))
        .await
        .unwrap();

    let claimed = queue.dequeue("w1", Duration::ZERO).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(queue.dequeue("w2", LOCK).await.unwrap().is_none());

    let reaped = queue.reap_expired().await.unwrap();
    assert_eq!(reaped.len(), 1);
    assert_eq!(reaped[0].id, claimed.id);
    assert_eq!(reaped[0].status, TaskStatus::Failed);
    assert!(queue.reap_expired().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_retry_delay_and_cancel_for_job() {
    let _serial = SERIAL.lock().await;
    let Some(db) = TestDb::connect().await else {
        return;
    };
    db.clear_tasks().await;
    let queue = queue(&db);
    let (job, resumes) = helpers::create_job(&db.store(), 3).await;
    queue
        .enqueue_batch(helpers::tasks_for(&job, &resumes, RetryPolicy::default()))
        .await
        .unwrap();

    let task = queue.dequeue("w1", LOCK).await.unwrap().unwrap();
    assert!(queue
        .retry(task.id, "w1", Duration::from_secs(60), "parser down")
        .await
        .unwrap());
    let delayed = queue.find(task.id).await.unwrap().unwrap();
    assert_eq!(delayed.status, TaskStatus::Pending);
    assert_eq!(delayed.last_error.as_deref(), Some("parser down"));

    let other = queue.dequeue("w1", LOCK).await.unwrap().unwrap();
    assert_ne!(other.id, task.id);

    assert_eq!(queue.cancel_for_job(job.id, "job deleted").await.unwrap(), 3);
    assert!(queue.dequeue("w1", LOCK).await.unwrap().is_none());
    assert!(!queue.complete(other.id, "w1").await.unwrap());
    assert_eq!(queue.stats().await.unwrap().cancelled, 3);
}
