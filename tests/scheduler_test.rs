//! `Scheduler` resurrection and bounded-concurrency draining, against a
//! mocked HTTP origin.

use std::sync::Arc;

use scansuite::config::ScanConfig;
use scansuite::store::models::{JobMode, JobStatus};
use scansuite::{EventBusConfig, ScanStore, Scheduler, TaskEventBus};

async fn in_memory_store() -> Arc<ScanStore> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite pool");
    Arc::new(ScanStore::from_pool(pool).await.expect("run migrations"))
}

#[tokio::test]
async fn enqueued_jobs_drain_to_completion() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html><head><title>Hi</title></head><body><h1>Hi</h1></body></html>")
        .create_async()
        .await;

    let store = in_memory_store().await;
    let config = Arc::new(ScanConfig::default().with_use_browser(false).with_max_concurrency(2));
    let events = Arc::new(TaskEventBus::with_config(EventBusConfig::default()));

    let job_a = store.jobs().insert(&server.url(), JobMode::Single, None).await.expect("insert job a");
    let job_b = store.jobs().insert(&server.url(), JobMode::Single, None).await.expect("insert job b");

    let scheduler = Scheduler::new(Arc::clone(&store), config, events, None);
    scheduler.enqueue(job_a.id.clone()).await;
    scheduler.enqueue(job_b.id.clone()).await;

    scheduler.drain().await;

    let a = store.jobs().get(&job_a.id).await.unwrap().unwrap();
    let b = store.jobs().get(&job_b.id).await.unwrap().unwrap();
    assert_eq!(a.status, JobStatus::Completed);
    assert_eq!(b.status, JobStatus::Completed);

    let state = scheduler.state().await;
    assert!(state.queued.is_empty());
    assert!(state.running.is_empty());
}

#[tokio::test]
async fn start_resurrects_unfinished_jobs() {
    let store = in_memory_store().await;
    let config = Arc::new(ScanConfig::default().with_use_browser(false));
    let events = Arc::new(TaskEventBus::with_config(EventBusConfig::default()));

    let job = store.jobs().insert("https://example.test/never-run", JobMode::Single, None).await.unwrap();

    let scheduler = Scheduler::new(Arc::clone(&store), config, events, None);
    scheduler.start().await.expect("resurrect unfinished jobs");

    let state = scheduler.state().await;
    assert_eq!(state.queued, vec![job.id]);
}
