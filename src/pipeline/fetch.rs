//! Page fetch: static HTTP via `reqwest`, or a live browser visit when
//! `ScanConfig::use_browser` is set (spec.md §4.3).

use std::time::Instant;

use crate::browser::BrowserWorker;
use crate::config::{DeviceProfile, ScanConfig};
use crate::error::{ScanError, ScanResult};

/// One page fetch, static or rendered, normalized to a common shape so the
/// rest of the pipeline doesn't care which path produced it.
pub struct FetchedPage {
    pub html: String,
    pub http_status: Option<i64>,
    pub load_time_ms: i64,
}

pub async fn fetch_static(client: &reqwest::Client, url: &str, config: &ScanConfig) -> ScanResult<FetchedPage> {
    let start = Instant::now();
    let response = tokio::time::timeout(config.request_timeout(), client.get(url).send())
        .await
        .map_err(|_| ScanError::Fetch(format!("request to {url} timed out")))?
        .map_err(|e| ScanError::Fetch(e.to_string()))?;

    let http_status = Some(i64::from(response.status().as_u16()));
    let html = response.text().await.map_err(|e| ScanError::Fetch(e.to_string()))?;

    Ok(FetchedPage { html, http_status, load_time_ms: start.elapsed().as_millis() as i64 })
}

pub async fn fetch_rendered(
    browser: &BrowserWorker,
    url: &str,
    profile: DeviceProfile,
    config: &ScanConfig,
) -> ScanResult<(FetchedPage, Vec<crate::analyzer::TrackingEvent>)> {
    let result = browser.scan_page(url, profile, config).await?;
    let fetched = FetchedPage { html: result.html, http_status: None, load_time_ms: result.load_time_ms };
    Ok((fetched, result.fired_events))
}
