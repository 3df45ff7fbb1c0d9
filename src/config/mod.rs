//! Configuration for the scan engine.
//!
//! `ScanConfig` collects every `SCANNER_*` / `SCAN_WORKERS_*` environment
//! variable from the spec into one struct, the way the donor crate's
//! `CrawlConfig` collects its `CRAWL_*` knobs. Unlike the donor's typestate
//! builder (which exists because a crawl has two hard-required fields,
//! `storage_dir` and `start_url`), every field here has a sane default, so
//! a plain builder is enough.

mod device;

pub use device::DeviceProfile;

use std::time::Duration;

/// Process-wide configuration for the scan engine.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub(crate) database_url: String,
    pub(crate) max_concurrency: usize,
    pub(crate) max_pages: usize,
    pub(crate) default_site_depth: u8,
    pub(crate) user_agent: String,
    pub(crate) request_timeout_ms: u64,
    pub(crate) use_browser: bool,
    pub(crate) device_profiles: Vec<DeviceProfile>,
    pub(crate) browser_timeout_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_concurrency: 5,
            max_pages: 100,
            default_site_depth: 2,
            user_agent: "BunSEOChecker/1.0".to_string(),
            request_timeout_ms: 15_000,
            use_browser: true,
            device_profiles: vec![DeviceProfile::Desktop],
            browser_timeout_ms: 30_000,
        }
    }
}

impl ScanConfig {
    /// Build configuration from environment variables, falling back to
    /// [`ScanConfig::default`] for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_concurrency = env_usize("SCAN_WORKERS_MAX_CONCURRENCY", defaults.max_concurrency)
            .clamp(1, 50);
        let max_pages = env_usize("SCANNER_MAX_PAGES", defaults.max_pages).max(1);
        let default_site_depth = env_u8("SCANNER_DEFAULT_SITE_DEPTH", defaults.default_site_depth);
        let request_timeout_ms =
            env_u64("SCANNER_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms).clamp(1_000, 120_000);
        let browser_timeout_ms =
            env_u64("SCANNER_BROWSER_TIMEOUT_MS", defaults.browser_timeout_ms);

        let device_profiles = std::env::var("SCANNER_DEVICE_PROFILES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|s| DeviceProfile::parse(s.trim()))
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults.device_profiles.clone());

        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_concurrency,
            max_pages,
            default_site_depth,
            user_agent: std::env::var("SCANNER_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout_ms,
            use_browser: env_bool("SCANNER_USE_BROWSER", defaults.use_browser),
            device_profiles,
            browser_timeout_ms,
        }
    }

    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    #[must_use]
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.clamp(1, 50);
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, n: usize) -> Self {
        self.max_pages = n.max(1);
        self
    }

    #[must_use]
    pub fn with_use_browser(mut self, use_browser: bool) -> Self {
        self.use_browser = use_browser;
        self
    }

    #[must_use]
    pub fn with_device_profiles(mut self, profiles: Vec<DeviceProfile>) -> Self {
        if !profiles.is_empty() {
            self.device_profiles = profiles;
        }
        self
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    #[must_use]
    pub fn default_site_depth(&self) -> u8 {
        self.default_site_depth
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn use_browser(&self) -> bool {
        self.use_browser
    }

    #[must_use]
    pub fn device_profiles(&self) -> &[DeviceProfile] {
        &self.device_profiles
    }

    #[must_use]
    pub fn browser_timeout(&self) -> Duration {
        Duration::from_millis(self.browser_timeout_ms)
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u8(key: &str, default: u8) -> u8 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = ScanConfig::default();
        assert_eq!(c.max_concurrency(), 5);
        assert_eq!(c.max_pages(), 100);
        assert_eq!(c.default_site_depth(), 2);
        assert_eq!(c.user_agent(), "BunSEOChecker/1.0");
        assert_eq!(c.request_timeout_ms, 15_000);
        assert!(c.use_browser());
        assert_eq!(c.device_profiles(), &[DeviceProfile::Desktop]);
    }

    #[test]
    fn max_concurrency_is_clamped() {
        let c = ScanConfig::default().with_max_concurrency(999);
        assert_eq!(c.max_concurrency(), 50);
        let c = ScanConfig::default().with_max_concurrency(0);
        assert_eq!(c.max_concurrency(), 1);
    }
}
