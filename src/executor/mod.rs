//! Job Executor: runs one job end to end, driving either the Page Pipeline
//! (single-page mode) or the Site Crawler (site mode), publishing lifecycle
//! events and keeping `scan_jobs` progress fields current (spec.md §4.5).

use serde_json::json;

use crate::browser::BrowserWorker;
use crate::config::ScanConfig;
use crate::error::ScanResult;
use crate::events::{TaskEventBus, TaskEventKind};
use crate::pipeline::PagePipeline;
use crate::store::models::{Job, JobMode};
use crate::store::ScanStore;

/// Runs a single job to completion (or failure/cancellation), mutating the
/// `scan_jobs` row and publishing `TaskEvent`s as it goes.
pub struct JobExecutor<'a> {
    store: &'a ScanStore,
    config: &'a ScanConfig,
    events: &'a TaskEventBus,
    browser: Option<&'a BrowserWorker>,
}

impl<'a> JobExecutor<'a> {
    #[must_use]
    pub fn new(
        store: &'a ScanStore,
        config: &'a ScanConfig,
        events: &'a TaskEventBus,
        browser: Option<&'a BrowserWorker>,
    ) -> Self {
        Self { store, config, events, browser }
    }

    /// Run `job` to a terminal state. `is_cancelled` is polled cooperatively
    /// between pages; a `true` mid-run stops the crawl and marks the job
    /// `failed` with `ScanError::Cancelled`'s message rather than `completed`.
    pub async fn run(&self, job: &Job, is_cancelled: impl Fn() -> bool + Clone) -> ScanResult<()> {
        self.store.jobs().mark_running(&job.id).await?;
        self.publish(&job.id, TaskEventKind::Started, json!({ "targetUrl": job.target_url })).await;

        let result = match job.mode {
            JobMode::Single => self.run_single(job).await,
            JobMode::Site => self.run_site(job, is_cancelled.clone()).await,
        };

        match result {
            Ok(summary) => {
                self.store.jobs().mark_completed(&job.id, job_pages_total(self.store, &job.id).await, self.pages_finished(&job.id).await, summary).await?;
                self.publish(&job.id, TaskEventKind::Completed, json!({})).await;
                Ok(())
            }
            Err(e) if e.is_cancelled() => {
                self.store.jobs().mark_failed(&job.id, &e.user_message()).await?;
                self.publish(&job.id, TaskEventKind::Cancelled, json!({ "reason": e.user_message() })).await;
                Err(e)
            }
            Err(e) => {
                self.store.jobs().mark_failed(&job.id, &e.user_message()).await?;
                self.publish(&job.id, TaskEventKind::Failed, json!({ "error": e.user_message() })).await;
                Err(e)
            }
        }
    }

    async fn run_single(&self, job: &Job) -> ScanResult<serde_json::Value> {
        self.store.jobs().set_pages_total(&job.id, 1).await?;

        let pipeline = PagePipeline::new(self.store, self.config, self.browser);
        let device_profile = self.config.device_profiles().first().copied().unwrap_or(crate::config::DeviceProfile::Desktop);
        let outcome = pipeline.scan_single_page(&job.id, &job.target_url, device_profile).await?;

        self.store.jobs().set_pages_finished(&job.id, 1).await?;
        self.publish(&job.id, TaskEventKind::PageCompleted, json!({ "pageId": outcome.page.id, "url": outcome.page.url })).await;

        let summary = outcome
            .issue_summary
            .map(|s| serde_json::to_value(s).unwrap_or(serde_json::Value::Null))
            .unwrap_or(serde_json::Value::Null);
        Ok(summary)
    }

    async fn run_site(&self, job: &Job, is_cancelled: impl Fn() -> bool) -> ScanResult<serde_json::Value> {
        let crawler = crate::crawler::SiteCrawler::new(self.store, self.config, self.browser);
        let max_depth = self.config.default_site_depth();

        let job_id = job.id.clone();
        let store = self.store;
        let events = self.events;
        let mut pages_finished = 0i64;

        let summary = crawler
            .scan_site(
                &job_id,
                &job.target_url,
                max_depth,
                |outcome| {
                    pages_finished += 1;
                    let page_id = outcome.page.id.clone();
                    let url = outcome.page.url.clone();
                    let finished = pages_finished;
                    let job_id = job_id.clone();
                    async move {
                        store.jobs().set_pages_finished(&job_id, finished).await?;
                        store.jobs().set_pages_total(&job_id, finished).await?;
                        let _ = events.publish(store, &job_id, TaskEventKind::PageCompleted, json!({ "pageId": page_id, "url": url })).await;
                        Ok(())
                    }
                },
                is_cancelled,
            )
            .await?;

        Ok(serde_json::to_value(summary).unwrap_or(serde_json::Value::Null))
    }

    async fn publish(&self, job_id: &str, kind: TaskEventKind, payload: serde_json::Value) {
        if let Err(e) = self.events.publish(self.store, job_id, kind, payload).await {
            log::debug!("event publish skipped for job {job_id}: {e}");
        }
    }

    async fn pages_finished(&self, job_id: &str) -> i64 {
        self.store.jobs().get(job_id).await.ok().flatten().map(|j| j.pages_finished).unwrap_or(0)
    }
}

async fn job_pages_total(store: &ScanStore, job_id: &str) -> i64 {
    store.jobs().get(job_id).await.ok().flatten().map(|j| j.pages_total).unwrap_or(0)
}
