//! Event type definitions for the task event bus (spec.md §4.7).

use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::store::models::TaskEventRow;

/// Reason the bus is shutting down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShutdownReason {
    AllJobsDrained,
    Error(String),
    Cancelled,
}

/// The fixed set of lifecycle events a job can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    Queued,
    Started,
    PageCompleted,
    Completed,
    Failed,
    Cancelled,
}

impl TaskEventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Started => "started",
            Self::PageCompleted => "page_completed",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for TaskEventKind {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "started" => Ok(Self::Started),
            "page_completed" => Ok(Self::PageCompleted),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ScanError::Validation(format!("unknown task event kind: {other}"))),
        }
    }
}

/// A task event as broadcast to live subscribers. Carries the persisted
/// row's assigned `id`/`created_at` so every subscriber sees the same total
/// order the store recorded (spec.md §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub id: i64,
    pub job_id: String,
    pub kind: TaskEventKind,
    pub payload: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TaskEvent {
    /// Build a live event from a freshly persisted row. Fails only if the
    /// row carries a `type` the bus doesn't recognize, which would mean the
    /// store and the bus have drifted out of sync.
    pub fn from_row(row: TaskEventRow) -> Result<Self, ScanError> {
        let kind = row.event_type.parse()?;
        Ok(Self { id: row.id, job_id: row.job_id, kind, payload: row.payload, created_at: row.created_at })
    }
}

/// Result of publishing a batch of events with best-effort delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPublishResult {
    pub total: usize,
    pub published: usize,
    pub failed: usize,
    pub max_subscribers: usize,
}

impl BatchPublishResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.published == self.total && self.failed == 0
    }

    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.published as f64 / self.total as f64) * 100.0
    }
}
