//! Crate-wide error type for the scan engine.
//!
//! Mirrors the shape of the donor crawler's `CrawlError`: one flat enum
//! covering every failure domain the engine can produce, with `From`
//! conversions at the seams (`sqlx`, `anyhow`) so call sites can use `?`.

use thiserror::Error;

/// Convenience alias for `Result<T, ScanError>`.
pub type ScanResult<T> = Result<T, ScanError>;

/// Error kinds produced by the scan engine.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Request body or parameters failed validation (maps to HTTP 400 in the adapter).
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist (maps to HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation is not legal for the entity's current state (maps to HTTP 409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transient network/HTTP failure while fetching a page or sitemap.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Headless-browser driver failure.
    #[error("browser error: {0}")]
    Browser(String),

    /// An analyzer degraded gracefully but wants the caller to know why.
    #[error("analyzer degraded: {0}")]
    AnalyzerDegraded(String),

    /// The job was cancelled by the user. Expected, non-fatal outcome for the executor.
    #[error("job was cancelled by user")]
    Cancelled,

    /// Underlying persistence failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catch-all for unexpected/fatal errors, preserving the source chain.
    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl ScanError {
    /// Human-readable message suitable for storing in `Job.error` / `Page.issueCounts.error`.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Cancelled => "Job was cancelled by user".to_string(),
            other => other.to_string(),
        }
    }

    /// True if this error represents cooperative cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
