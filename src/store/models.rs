//! Row types and small enums for the persisted schema (spec.md §3, §6).
//!
//! SQLite has no native enum or JSON column type, so enums round-trip as
//! `TEXT` (`Display`/`FromStr`, matched manually at the `Ops` layer rather
//! than via a `sqlx::Type` derive) and `jsonb` columns round-trip as `TEXT`
//! holding serialized `serde_json::Value`, the same convention the donor
//! crate uses for its `payload jsonb` columns via `serde_json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level scan mode: a single URL, or an entire site via BFS crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    Single,
    Site,
}

impl JobMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Site => "site",
        }
    }
}

impl std::str::FromStr for JobMode {
    type Err = crate::ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "site" => Ok(Self::Site),
            other => Err(crate::ScanError::Validation(format!("unknown job mode: {other}"))),
        }
    }
}

/// Job lifecycle state (spec.md §3 invariants govern transitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = crate::ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(crate::ScanError::Other(anyhow::anyhow!("unknown job status: {other}"))),
        }
    }
}

/// Page lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PageStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PageStatus {
    type Err = crate::ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(crate::ScanError::Other(anyhow::anyhow!("unknown page status: {other}"))),
        }
    }
}

/// `scan_jobs` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub target_url: String,
    pub mode: JobMode,
    pub status: JobStatus,
    pub pages_total: i64,
    pub pages_finished: i64,
    pub issues_summary: Option<Value>,
    pub options: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// `scan_pages` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub job_id: String,
    pub url: String,
    pub status: PageStatus,
    pub http_status: Option<i64>,
    pub load_time_ms: Option<i64>,
    pub issue_counts: Option<Value>,
    pub device_variant: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `seo_metrics` row (0..1 per page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoMetricsRow {
    pub id: String,
    pub page_id: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<String>,
    pub h1: Option<String>,
    pub robots_txt_blocked: bool,
    pub schema_org: Option<Value>,
    pub score: i64,
    pub json_ld_score: Option<f64>,
    pub json_ld_types: Option<Value>,
    pub json_ld_issues: Option<Value>,
    pub html_structure_score: Option<f64>,
    pub html_structure_issues: Option<Value>,
}

/// `link_metrics` row (0..1 per page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkMetricsRow {
    pub id: String,
    pub page_id: String,
    pub internal_links: i64,
    pub external_links: i64,
    pub utm_params: Value,
    pub broken_links: i64,
    pub redirects: i64,
}

/// `tracking_events` row (0..n per page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEventRow {
    pub id: String,
    pub page_id: String,
    pub element: Option<String>,
    pub trigger: String,
    pub event_name: Option<String>,
    pub platform: String,
    pub device_variant: Option<String>,
    pub payload: Option<Value>,
    pub status: String,
}

/// `task_events` row, append-only, totally ordered by `(created_at, id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEventRow {
    pub id: i64,
    pub job_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}
