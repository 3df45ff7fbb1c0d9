//! Site Crawler: breadth-first traversal of one site, bounded by page count
//! and link depth, driving the Page Pipeline over every discovered URL
//! (spec.md §4.4).

pub mod sitemap;

use std::collections::{HashSet, VecDeque};
use std::future::Future;

use url::Url;

use crate::analyzer::{aggregate_summaries, AggregatedSummary};
use crate::browser::BrowserWorker;
use crate::config::{DeviceProfile, ScanConfig};
use crate::error::ScanResult;
use crate::pipeline::{PageOutcome, PagePipeline};
use crate::store::ScanStore;

pub struct SiteCrawler<'a> {
    store: &'a ScanStore,
    config: &'a ScanConfig,
    browser: Option<&'a BrowserWorker>,
}

impl<'a> SiteCrawler<'a> {
    #[must_use]
    pub fn new(store: &'a ScanStore, config: &'a ScanConfig, browser: Option<&'a BrowserWorker>) -> Self {
        Self { store, config, browser }
    }

    /// BFS-crawl `start_url` up to `max_depth` link hops and
    /// `ScanConfig::max_pages` pages, calling `on_page` after every
    /// successfully scanned page (used by the executor to update
    /// `pagesFinished` and publish `page_completed` events) and `is_cancelled`
    /// before starting each page (cooperative cancellation, spec.md §4.5).
    pub async fn scan_site<F, Fut>(
        &self,
        job_id: &str,
        start_url: &str,
        max_depth: u8,
        mut on_page: F,
        is_cancelled: impl Fn() -> bool,
    ) -> ScanResult<AggregatedSummary>
    where
        F: FnMut(&PageOutcome) -> Fut,
        Fut: Future<Output = ScanResult<()>>,
    {
        let pipeline = PagePipeline::new(self.store, self.config, self.browser);
        let device_profile = self.config.device_profiles().first().copied().unwrap_or(DeviceProfile::Desktop);

        let base = Url::parse(start_url).map_err(|e| crate::error::ScanError::Validation(format!("invalid start url: {e}")))?;
        let http = reqwest::Client::builder().user_agent(self.config.user_agent()).build().unwrap_or_default();

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, u8)> = VecDeque::new();

        visited.insert(normalize_for_visited(&base));
        queue.push_back((start_url.to_string(), 0));

        for seed in sitemap::discover_sitemap_urls(&http, start_url).await {
            if let Ok(seed_url) = Url::parse(&seed) {
                if seed_url.host_str() == base.host_str() {
                    let key = normalize_for_visited(&seed_url);
                    if visited.insert(key) {
                        queue.push_back((seed, 1.min(max_depth)));
                    }
                }
            }
        }

        let mut summaries = Vec::new();
        let mut scanned = 0usize;

        while let Some((url, depth)) = queue.pop_front() {
            if is_cancelled() {
                break;
            }
            if scanned >= self.config.max_pages() {
                break;
            }

            match pipeline.scan_single_page(job_id, &url, device_profile).await {
                Ok(outcome) => {
                    scanned += 1;
                    if let Some(summary) = &outcome.issue_summary {
                        summaries.push(summary.clone());
                    }

                    if depth < max_depth {
                        for link in &outcome.internal_links {
                            if scanned + queue.len() >= self.config.max_pages() {
                                break;
                            }
                            if let Ok(link_url) = Url::parse(link) {
                                let key = normalize_for_visited(&link_url);
                                if visited.insert(key) {
                                    queue.push_back((link.clone(), depth + 1));
                                }
                            }
                        }
                    }

                    on_page(&outcome).await?;
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    log::warn!("page scan failed for {url}: {e}");
                }
            }
        }

        Ok(aggregate_summaries(&summaries))
    }
}

fn normalize_for_visited(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    if normalized.path().len() > 1 && normalized.path().ends_with('/') {
        let trimmed = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&trimmed);
    }
    normalized.to_string()
}
