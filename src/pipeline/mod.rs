//! Page Pipeline: the six-step sequence that turns one URL into a
//! persisted `scan_pages` row plus its metrics and tracking events
//! (spec.md §4.3).
//!
//! 1. Insert the page in `processing` state.
//! 2. Fetch (static HTTP, or a live browser visit per device profile).
//! 3. Run every pure analyzer over the resulting HTML.
//! 4. Reconcile static tracking detections with anything the browser
//!    observed firing.
//! 5. Persist metrics/tracking rows.
//! 6. Mark the page `completed` (or `failed`, which must survive even if
//!    the metrics/tracking inserts above it rolled back).

pub mod fetch;

use serde_json::Value;

use crate::analyzer::{self, IssueSummary, TrackingEvent, TrackingStatus, UtmSummary};
use crate::browser::BrowserWorker;
use crate::config::{DeviceProfile, ScanConfig};
use crate::error::ScanResult;
use crate::store::models::{LinkMetricsRow, Page, SeoMetricsRow};
use crate::store::ScanStore;

use fetch::FetchedPage;

/// Everything the pipeline produced for one page, besides the persisted
/// `Page` row itself. Returned to the crawler so it can discover outbound
/// links for the next BFS frontier without re-parsing HTML.
pub struct PageOutcome {
    pub page: Page,
    pub internal_links: Vec<String>,
    pub issue_summary: Option<IssueSummary>,
}

pub struct PagePipeline<'a> {
    store: &'a ScanStore,
    config: &'a ScanConfig,
    http: reqwest::Client,
    browser: Option<&'a BrowserWorker>,
}

impl<'a> PagePipeline<'a> {
    #[must_use]
    pub fn new(store: &'a ScanStore, config: &'a ScanConfig, browser: Option<&'a BrowserWorker>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()
            .unwrap_or_default();
        Self { store, config, http, browser }
    }

    pub async fn scan_single_page(&self, job_id: &str, url: &str, device_profile: DeviceProfile) -> ScanResult<PageOutcome> {
        let page = self.store.pages().insert_processing(job_id, url).await?;

        match self.run(job_id, url, &page.id, device_profile).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // The page's failed state must be visible even if everything
                // else below this point never committed.
                self.store.pages().mark_failed(&page.id, &e.user_message()).await?;
                Err(e)
            }
        }
    }

    async fn run(&self, job_id: &str, url: &str, page_id: &str, device_profile: DeviceProfile) -> ScanResult<PageOutcome> {
        let (fetched, fired_events): (FetchedPage, Vec<TrackingEvent>) = if self.config.use_browser() {
            if let Some(browser) = self.browser {
                fetch::fetch_rendered(browser, url, device_profile, self.config).await?
            } else {
                (fetch::fetch_static(&self.http, url, self.config).await?, Vec::new())
            }
        } else {
            (fetch::fetch_static(&self.http, url, self.config).await?, Vec::new())
        };

        let seo = analyzer::analyze_seo(&fetched.html);
        let mut links = analyzer::analyze_links(&fetched.html, url);
        let static_tracking = analyzer::analyze_tracking(&fetched.html);
        let json_ld = analyzer::analyze_json_ld(&fetched.html);
        let structure = analyzer::analyze_html_structure(&fetched.html);

        let tracking_events = reconcile_tracking(static_tracking, fired_events, device_profile);

        links.broken_links = 0;
        links.redirects = 0;

        let issue_summary = analyzer::build_issue_summary(&seo, &links, &tracking_events, &json_ld);

        let seo_row = SeoMetricsRow {
            id: String::new(),
            page_id: page_id.to_string(),
            title: seo.title.clone(),
            meta_description: seo.meta_description.clone(),
            canonical: seo.canonical.clone(),
            h1: seo.h1.clone(),
            robots_txt_blocked: seo.robots_noindex,
            schema_org: (!json_ld.types.is_empty()).then(|| serde_json::to_value(&json_ld.types).unwrap_or(Value::Null)),
            score: seo.score,
            json_ld_score: Some(json_ld.score),
            json_ld_types: (!json_ld.types.is_empty()).then(|| serde_json::to_value(&json_ld.types).unwrap_or(Value::Null)),
            json_ld_issues: (!json_ld.issues.is_empty()).then(|| serde_json::to_value(&json_ld.issues).unwrap_or(Value::Null)),
            html_structure_score: Some(structure.score),
            html_structure_issues: (!structure.issues.is_empty())
                .then(|| serde_json::to_value(&structure.issues).unwrap_or(Value::Null)),
        };
        self.store.metrics().insert_seo(page_id, &seo_row).await?;

        let link_row = LinkMetricsRow {
            id: String::new(),
            page_id: page_id.to_string(),
            internal_links: links.internal_links.len() as i64,
            external_links: links.external_links.len() as i64,
            utm_params: utm_summary_to_value(&links.utm),
            broken_links: links.broken_links,
            redirects: links.redirects,
        };
        self.store.metrics().insert_link(page_id, &link_row).await?;

        if !tracking_events.is_empty() {
            self.store.tracking().insert_batch(page_id, &tracking_events).await?;
        }

        let issue_counts = serde_json::to_value(&issue_summary).unwrap_or(Value::Null);
        self.store
            .pages()
            .mark_completed(page_id, fetched.http_status, Some(fetched.load_time_ms), &issue_counts, Some(device_profile.as_str()))
            .await?;

        let page = self
            .store
            .pages()
            .get_for_job(job_id, page_id)
            .await?
            .ok_or_else(|| crate::error::ScanError::Other(anyhow::anyhow!("page vanished after completion")))?;

        Ok(PageOutcome { page, internal_links: links.internal_links, issue_summary: Some(issue_summary) })
    }
}

/// Merge static tracking detections with live-fired events. A fired event
/// supersedes a static-only detection for the same platform, since it's
/// strictly more informative; static detections with no matching fire stay
/// `StaticOnly` rather than being silently dropped.
fn reconcile_tracking(
    static_events: Vec<TrackingEvent>,
    fired_events: Vec<TrackingEvent>,
    device_profile: DeviceProfile,
) -> Vec<TrackingEvent> {
    let mut merged = Vec::new();
    let fired_platforms: std::collections::HashSet<_> = fired_events.iter().map(|e| e.platform.as_str().to_string()).collect();

    for mut event in static_events {
        if !fired_platforms.contains(event.platform.as_str()) {
            event.device_variant = Some(device_profile);
            merged.push(event);
        }
    }

    for mut event in fired_events {
        event.device_variant = Some(device_profile);
        event.status = TrackingStatus::Fired;
        merged.push(event);
    }

    merged
}

fn utm_summary_to_value(utm: &UtmSummary) -> Value {
    serde_json::to_value(utm).unwrap_or(Value::Null)
}
