//! End-to-end coverage of a single-page job through `JobExecutor`, against
//! a mocked HTTP origin so no real network access is required.

use scansuite::config::ScanConfig;
use scansuite::store::models::{JobMode, JobStatus};
use scansuite::{EventBusConfig, JobExecutor, ScanStore, TaskEventBus};

async fn in_memory_store() -> ScanStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite pool");
    ScanStore::from_pool(pool).await.expect("run migrations")
}

const PAGE_HTML: &str = r#"
<html lang="en">
<head>
  <title>Example Domain For Testing SEO Checks</title>
  <meta name="description" content="A reasonably long description used purely to exercise the SEO analyzer length scoring heuristics end to end.">
  <link rel="canonical" href="https://example.test/" />
</head>
<body>
  <main>
    <h1>Welcome to the Example Testing Domain</h1>
    <p>Some content.</p>
    <a href="https://example.test/about?utm_source=newsletter&utm_medium=email">About</a>
    <a href="https://external.test/partner">Partner</a>
  </main>
</body>
</html>
"#;

#[tokio::test]
async fn single_page_job_completes_and_persists_metrics() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server.mock("GET", "/").with_status(200).with_body(PAGE_HTML).create_async().await;

    let store = in_memory_store().await;
    let config = ScanConfig::default().with_use_browser(false);
    let events = TaskEventBus::with_config(EventBusConfig::default());

    let job = store.jobs().insert(&server.url(), JobMode::Single, None).await.expect("insert job");

    let executor = JobExecutor::new(&store, &config, &events, None);
    executor.run(&job, || false).await.expect("job run succeeds");

    let reloaded = store.jobs().get(&job.id).await.expect("get job").expect("job exists");
    assert_eq!(reloaded.status, JobStatus::Completed);
    assert_eq!(reloaded.pages_finished, 1);

    let (pages, _) = store
        .pages()
        .list_for_job(&job.id, &scansuite::store::PageFilter::default())
        .await
        .expect("list pages");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].status, scansuite::store::models::PageStatus::Completed);
}

#[tokio::test]
async fn failed_fetch_marks_job_and_page_failed() {
    let store = in_memory_store().await;
    let config = ScanConfig::default().with_use_browser(false);
    let events = TaskEventBus::with_config(EventBusConfig::default());

    let job = store
        .jobs()
        .insert("http://127.0.0.1:1/unreachable", JobMode::Single, None)
        .await
        .expect("insert job");

    let executor = JobExecutor::new(&store, &config, &events, None);
    let result = executor.run(&job, || false).await;
    assert!(result.is_err());

    let reloaded = store.jobs().get(&job.id).await.expect("get job").expect("job exists");
    assert_eq!(reloaded.status, JobStatus::Failed);
    assert!(reloaded.error.is_some());
}
