//! Static detection of analytics/tracking instrumentation (spec.md §4.1,
//! §4.2). This pass only sees markup and inline scripts; it cannot observe
//! whether an event actually fires at runtime. The browser worker's
//! injected hook (`crate::browser::hooks`) captures real firings during a
//! live page visit and the pipeline reconciles the two into the persisted
//! `tracking_events` rows (spec.md §4.3).

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::DeviceProfile;

/// Analytics/advertising platform a tracking call belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Platform {
    GoogleAnalytics4,
    UniversalAnalytics,
    GoogleTagManager,
    Mixpanel,
    FacebookPixel,
    LinkedInInsight,
    TikTokPixel,
    Unknown(String),
}

impl Platform {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::GoogleAnalytics4 => "ga4",
            Self::UniversalAnalytics => "universal_analytics",
            Self::GoogleTagManager => "gtm",
            Self::Mixpanel => "mixpanel",
            Self::FacebookPixel => "facebook_pixel",
            Self::LinkedInInsight => "linkedin_insight",
            Self::TikTokPixel => "tiktok_pixel",
            Self::Unknown(s) => s,
        }
    }
}

/// Where a tracking call stands relative to the live-capture pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackingStatus {
    /// Found in markup/inline script only; no live page visit confirmed it fires.
    StaticOnly,
    /// A platform SDK is referenced but no specific call could be parsed.
    Detected,
    /// Confirmed firing during a live browser visit.
    Fired,
    /// Declared (e.g. an `onclick` handler) but never observed firing.
    Missing,
}

impl TrackingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StaticOnly => "static_only",
            Self::Detected => "detected",
            Self::Fired => "fired",
            Self::Missing => "missing",
        }
    }
}

/// One detected or observed tracking call.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEvent {
    pub element: Option<String>,
    pub trigger: String,
    pub event_name: Option<String>,
    pub platform: Platform,
    pub device_variant: Option<DeviceProfile>,
    pub payload: Option<Value>,
    pub status: TrackingStatus,
}

lazy_static! {
    static ref GTM_CONTAINER: Regex = Regex::new(r"GTM-[A-Z0-9]+").unwrap();
    static ref GA4_MEASUREMENT: Regex = Regex::new(r"G-[A-Z0-9]{6,}").unwrap();
    static ref UA_PROPERTY: Regex = Regex::new(r"UA-\d{4,10}-\d{1,4}").unwrap();
    static ref GTAG_EVENT: Regex = Regex::new(r#"gtag\(\s*['"]event['"]\s*,\s*['"]([^'"]+)['"]"#).unwrap();
    static ref DATA_LAYER_PUSH: Regex = Regex::new(r#"dataLayer\.push\(\s*\{\s*['"]?event['"]?\s*:\s*['"]([^'"]+)['"]"#).unwrap();
    static ref FBQ_EVENT: Regex = Regex::new(r#"fbq\(\s*['"]track['"]\s*,\s*['"]([^'"]+)['"]"#).unwrap();
    static ref ONCLICK_HANDLER: Regex =
        Regex::new(r#"onclick\s*=\s*['"][^'"]*(gtag|fbq|dataLayer\.push)\([^'"]*['"]"#).unwrap();
    static ref MIXPANEL_TRACK: Regex = Regex::new(r#"mixpanel\.track\(\s*['"]([^'"]+)['"]"#).unwrap();
    static ref MIXPANEL_CALL: Regex = Regex::new(
        r"mixpanel\.(init|identify|alias|register|reset|time_event|track_links|track_forms|people\.set_once|people\.set|people\.increment)\s*\("
    )
    .unwrap();
    static ref MIXPANEL_REFERENCE: Regex = Regex::new(r"mixpanel").unwrap();
    static ref GA_REFERENCE: Regex = Regex::new(r"googletagmanager\.com|google-analytics\.com|gtag\(|dataLayer").unwrap();
}

/// Scan raw HTML (including inline `<script>` bodies) for tracking snippets.
#[must_use]
pub fn analyze_tracking(html: &str) -> Vec<TrackingEvent> {
    let mut events = Vec::new();

    if let Some(m) = GTM_CONTAINER.find(html) {
        events.push(static_event(None, "page_load", Some(m.as_str().to_string()), Platform::GoogleTagManager));
    }
    if let Some(m) = GA4_MEASUREMENT.find(html) {
        events.push(static_event(None, "page_load", Some(m.as_str().to_string()), Platform::GoogleAnalytics4));
    }
    if let Some(m) = UA_PROPERTY.find(html) {
        events.push(static_event(None, "page_load", Some(m.as_str().to_string()), Platform::UniversalAnalytics));
    }
    for cap in GTAG_EVENT.captures_iter(html) {
        events.push(static_event(None, "script", Some(cap[1].to_string()), Platform::GoogleAnalytics4));
    }
    for cap in DATA_LAYER_PUSH.captures_iter(html) {
        events.push(static_event(None, "script", Some(cap[1].to_string()), Platform::GoogleTagManager));
    }
    for cap in FBQ_EVENT.captures_iter(html) {
        events.push(static_event(None, "script", Some(cap[1].to_string()), Platform::FacebookPixel));
    }
    for cap in MIXPANEL_TRACK.captures_iter(html) {
        events.push(static_event(None, "script", Some(cap[1].to_string()), Platform::Mixpanel));
    }
    for _ in MIXPANEL_CALL.captures_iter(html) {
        events.push(static_event(None, "script", None, Platform::Mixpanel));
    }

    if ONCLICK_HANDLER.is_match(html) {
        for cap in ONCLICK_HANDLER.captures_iter(html) {
            let platform = match &cap[1] {
                "fbq" => Platform::FacebookPixel,
                "dataLayer.push" => Platform::GoogleTagManager,
                _ => Platform::GoogleAnalytics4,
            };
            events.push(TrackingEvent {
                element: Some("onclick".to_string()),
                trigger: "click".to_string(),
                event_name: None,
                platform,
                device_variant: None,
                payload: None,
                status: TrackingStatus::Missing,
            });
        }
    }

    // A platform SDK can be referenced (script src, bare identifier) without
    // any call this pass can parse; surface it once rather than staying silent.
    if MIXPANEL_REFERENCE.is_match(html) && !events.iter().any(|e| e.platform == Platform::Mixpanel) {
        events.push(TrackingEvent {
            element: None,
            trigger: "load".to_string(),
            event_name: None,
            platform: Platform::Mixpanel,
            device_variant: None,
            payload: None,
            status: TrackingStatus::Detected,
        });
    }
    let ga_seen = events
        .iter()
        .any(|e| matches!(e.platform, Platform::GoogleAnalytics4 | Platform::UniversalAnalytics | Platform::GoogleTagManager));
    if GA_REFERENCE.is_match(html) && !ga_seen {
        events.push(TrackingEvent {
            element: None,
            trigger: "load".to_string(),
            event_name: None,
            platform: Platform::GoogleAnalytics4,
            device_variant: None,
            payload: None,
            status: TrackingStatus::Detected,
        });
    }

    events
}

fn static_event(element: Option<String>, trigger: &str, event_name: Option<String>, platform: Platform) -> TrackingEvent {
    TrackingEvent {
        element,
        trigger: trigger.to_string(),
        event_name,
        platform,
        device_variant: None,
        payload: None,
        status: TrackingStatus::StaticOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gtm_container() {
        let html = r#"<script>(function(w,d,s,l,i){...})(window,document,'script','dataLayer','GTM-ABC123');</script>"#;
        let events = analyze_tracking(html);
        assert!(events.iter().any(|e| e.platform == Platform::GoogleTagManager));
    }

    #[test]
    fn detects_gtag_event_call() {
        let html = r#"<script>gtag('event', 'purchase', {value: 10});</script>"#;
        let events = analyze_tracking(html);
        let found = events.iter().find(|e| e.event_name.as_deref() == Some("purchase"));
        assert!(found.is_some());
        assert_eq!(found.unwrap().status, TrackingStatus::StaticOnly);
    }

    #[test]
    fn detects_mixpanel_track_call_with_event_name() {
        let html = r#"<script>mixpanel.track("Clicked");gtag('config','UA-123')</script>"#;
        let events = analyze_tracking(html);
        let found = events.iter().find(|e| e.platform == Platform::Mixpanel && e.event_name.as_deref() == Some("Clicked"));
        assert!(found.is_some());
    }

    #[test]
    fn detects_mixpanel_reference_without_parseable_call() {
        let html = r#"<script src="https://cdn.mxpnl.com/libs/mixpanel-2-latest.min.js"></script>"#;
        let events = analyze_tracking(html);
        let found = events.iter().find(|e| e.platform == Platform::Mixpanel);
        assert_eq!(found.map(|e| e.status), Some(TrackingStatus::Detected));
    }

    #[test]
    fn no_tracking_yields_empty() {
        assert!(analyze_tracking("<html><body>hi</body></html>").is_empty());
    }
}
