//! Device profile table for the Browser Worker.
//!
//! Fixed viewport + user-agent table, analogous to the donor's
//! `BrowserPoolConfig` fixed defaults but keyed by device class instead of
//! pool size.

use serde::{Deserialize, Serialize};

/// A device class the Browser Worker can emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    Desktop,
    Tablet,
    Mobile,
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl DeviceProfile {
    /// Parse a device profile name from the `SCANNER_DEVICE_PROFILES` env var.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Some(Self::Desktop),
            "tablet" => Some(Self::Tablet),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }

    /// Viewport used when navigating under this profile.
    #[must_use]
    pub fn viewport(self) -> Viewport {
        match self {
            Self::Desktop => Viewport { width: 1440, height: 900 },
            Self::Tablet => Viewport { width: 768, height: 1024 },
            Self::Mobile => Viewport { width: 390, height: 844 },
        }
    }

    /// User-agent string sent when navigating under this profile.
    #[must_use]
    pub fn user_agent(self) -> &'static str {
        match self {
            Self::Desktop => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            }
            Self::Tablet => {
                "Mozilla/5.0 (iPad; CPU OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1"
            }
            Self::Mobile => {
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1"
            }
        }
    }

    /// Keyword set used to infer this variant from anchor class/data attributes.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Desktop => &["desktop", "laptop", "pc"],
            Self::Tablet => &["tablet", "ipad"],
            Self::Mobile => &["mobile", "phone", "iphone", "android"],
        }
    }

    /// Infer a device variant from a blob of class names and data-attribute values.
    ///
    /// Checked in a fixed order (desktop, tablet, mobile) so that a string
    /// matching more than one keyword set resolves deterministically.
    #[must_use]
    pub fn infer_from_text(haystack: &str) -> Option<Self> {
        let haystack = haystack.to_ascii_lowercase();
        for profile in [Self::Desktop, Self::Tablet, Self::Mobile] {
            if profile.keywords().iter().any(|kw| haystack.contains(kw)) {
                return Some(profile);
            }
        }
        None
    }
}
