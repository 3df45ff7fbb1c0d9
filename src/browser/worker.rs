//! Headless-browser page visits: navigate under a given device profile,
//! install the tracking hook before any site script runs, and hand back
//! rendered HTML plus whatever tracking calls actually fired (spec.md
//! §4.2). Grounded on the donor's `enhance_page`/`process_single_page`
//! sequence (new_page → stealth/device setup → goto → wait_for_navigation).

use std::time::Instant;

use chromiumoxide::browser::BrowserConfigBuilder;
use chromiumoxide::{Browser, Page, cdp};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::analyzer::{Platform, TrackingEvent, TrackingStatus};
use crate::config::{DeviceProfile, ScanConfig};
use crate::error::{ScanError, ScanResult};

use super::hooks::{READ_FIRED_EVENTS_JS, STOP_HOOK_JS, TRACKING_HOOK_JS};

/// Result of one live browser visit.
pub struct BrowserPageResult {
    pub html: String,
    pub load_time_ms: i64,
    pub fired_events: Vec<TrackingEvent>,
}

/// Owns a single headless Chrome instance. Not pooled: the scan engine's
/// concurrency is bounded at the scheduler/executor level (spec.md §4.5,
/// §4.6), so one browser serving one page at a time per worker is enough.
pub struct BrowserWorker {
    browser: Browser,
    _handler: JoinHandle<()>,
}

impl BrowserWorker {
    pub async fn launch(config: &ScanConfig) -> ScanResult<Self> {
        let browser_config = BrowserConfigBuilder::default()
            .window_size(1440, 900)
            .request_timeout(config.browser_timeout())
            .build()
            .map_err(|e| ScanError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScanError::Browser(format!("failed to launch browser: {e}")))?;

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::warn!("browser handler error: {e}");
                }
            }
        });

        Ok(Self { browser, _handler: handler_task })
    }

    /// Visit `url` under `profile`, capturing rendered HTML and any
    /// tracking calls observed during the visit.
    pub async fn scan_page(&self, url: &str, profile: DeviceProfile, config: &ScanConfig) -> ScanResult<BrowserPageResult> {
        let start = Instant::now();

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScanError::Browser(format!("failed to open page: {e}")))?;

        install_tracking_hook(&page).await?;
        apply_device_profile(&page, profile).await?;

        page.goto(url).await.map_err(|e| ScanError::Browser(format!("navigation failed: {e}")))?;

        let nav_result = tokio::time::timeout(config.browser_timeout(), page.wait_for_navigation()).await;
        match nav_result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(ScanError::Browser(format!("page load failed: {e}"))),
            Err(_) => return Err(ScanError::Browser("page load timed out".to_string())),
        }

        let html = page.content().await.map_err(|e| ScanError::Browser(format!("failed to read content: {e}")))?;
        let fired_events = read_fired_events(&page).await;

        let _ = page.close().await;

        Ok(BrowserPageResult { html, load_time_ms: start.elapsed().as_millis() as i64, fired_events })
    }
}

async fn install_tracking_hook(page: &Page) -> ScanResult<()> {
    page.execute(cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
        source: TRACKING_HOOK_JS.to_string(),
        world_name: None,
        include_command_line_api: None,
        run_immediately: None,
    })
    .await
    .map_err(|e| ScanError::Browser(format!("failed to install tracking hook: {e}")))?;
    Ok(())
}

async fn apply_device_profile(page: &Page, profile: DeviceProfile) -> ScanResult<()> {
    let viewport = profile.viewport();
    page.execute(
        cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(1.0)
            .mobile(matches!(profile, DeviceProfile::Mobile))
            .build()
            .map_err(|e| ScanError::Browser(format!("invalid viewport override: {e}")))?,
    )
    .await
    .map_err(|e| ScanError::Browser(format!("failed to set viewport: {e}")))?;

    page.execute(cdp::browser_protocol::network::SetUserAgentOverrideParams {
        user_agent: profile.user_agent().to_string(),
        accept_language: None,
        platform: None,
        user_agent_metadata: None,
    })
    .await
    .map_err(|e| ScanError::Browser(format!("failed to set user agent: {e}")))?;

    Ok(())
}

async fn read_fired_events(page: &Page) -> Vec<TrackingEvent> {
    let _ = page.evaluate(STOP_HOOK_JS).await;
    let Ok(result) = page.evaluate(READ_FIRED_EVENTS_JS).await else {
        return Vec::new();
    };
    let Ok(raw) = result.into_value::<Vec<Value>>() else {
        return Vec::new();
    };

    raw.into_iter().filter_map(parse_fired_event).collect()
}

fn parse_fired_event(value: Value) -> Option<TrackingEvent> {
    let platform_str = value.get("platform")?.as_str()?;
    let platform = match platform_str {
        "ga4" => Platform::GoogleAnalytics4,
        "gtm" => Platform::GoogleTagManager,
        "facebook_pixel" => Platform::FacebookPixel,
        other => Platform::Unknown(other.to_string()),
    };
    let args = value.get("args").cloned();
    let event_name = args
        .as_ref()
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(TrackingEvent {
        element: None,
        trigger: "fired".to_string(),
        event_name,
        platform,
        device_variant: None,
        payload: args,
        status: TrackingStatus::Fired,
    })
}
