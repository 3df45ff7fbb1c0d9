//! `SiteCrawler` BFS traversal across a two-page mocked site.

use scansuite::config::ScanConfig;
use scansuite::store::models::JobMode;
use scansuite::ScanStore;

async fn in_memory_store() -> ScanStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite pool");
    ScanStore::from_pool(pool).await.expect("run migrations")
}

#[tokio::test]
async fn crawl_follows_internal_links_within_depth() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let home = format!(
        "<html><head><title>Home</title></head><body><h1>Home</h1><a href=\"{base}/about\">About</a></body></html>"
    );
    let about = "<html><head><title>About</title></head><body><h1>About</h1></body></html>".to_string();

    let _home_mock = server.mock("GET", "/").with_status(200).with_body(home).create_async().await;
    let _about_mock = server.mock("GET", "/about").with_status(200).with_body(about).create_async().await;
    let _sitemap = server.mock("GET", "/sitemap.xml").with_status(404).create_async().await;

    let store = in_memory_store().await;
    let config = ScanConfig::default().with_use_browser(false).with_max_pages(10);

    let job = store.jobs().insert(&base, JobMode::Site, None).await.expect("insert job");

    let crawler = scansuite::crawler::SiteCrawler::new(&store, &config, None);
    let summary = crawler
        .scan_site(&job.id, &base, 2, |_outcome| async { Ok::<(), scansuite::ScanError>(()) }, || false)
        .await
        .expect("crawl completes");

    assert_eq!(summary.pages_analyzed, 2);

    let (pages, _) = store
        .pages()
        .list_for_job(&job.id, &scansuite::store::PageFilter::default())
        .await
        .expect("list pages");
    assert_eq!(pages.len(), 2);
}
