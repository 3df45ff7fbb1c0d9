//! Persistence layer: a `sqlx::SqlitePool` plus one `*Ops` struct per
//! aggregate, grounded on the donor's `DbContext` + `ScrapeJobOps<'a>`
//! reference pattern (`other_examples/…-scrape_jobs.rs.rs`): a shared pool
//! wrapped by `ScanStore`, with narrow typed method groups borrowed off it
//! rather than one giant God object.

pub mod models;
mod migrations;

mod jobs;
mod metrics;
mod pages;
mod task_events;
mod tracking;

pub use jobs::{JobFilter, JobOps, JobSort};
pub use metrics::MetricsOps;
pub use pages::{PageFilter, PageOps, PageSort};
pub use task_events::TaskEventOps;
pub use tracking::TrackingOps;

use sqlx::SqlitePool;

/// Sort direction shared by every listing query (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Pagination envelope returned alongside every listing query's rows.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Owns the connection pool; all reads/writes flow through its `*Ops` accessors.
#[derive(Debug, Clone)]
pub struct ScanStore {
    pool: SqlitePool,
}

impl ScanStore {
    /// Connect and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an already-open pool (tests construct one in a tempdir file or `:memory:`).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[must_use]
    pub fn jobs(&self) -> JobOps<'_> {
        JobOps::new(&self.pool)
    }

    #[must_use]
    pub fn pages(&self) -> PageOps<'_> {
        PageOps::new(&self.pool)
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsOps<'_> {
        MetricsOps::new(&self.pool)
    }

    #[must_use]
    pub fn tracking(&self) -> TrackingOps<'_> {
        TrackingOps::new(&self.pool)
    }

    #[must_use]
    pub fn task_events(&self) -> TaskEventOps<'_> {
        TaskEventOps::new(&self.pool)
    }
}
