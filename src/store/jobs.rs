//! Job aggregate: insert/read/update/delete + the listing query behind
//! `GET /api/scans`.

use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::{Pagination, SortDirection};
use crate::error::{ScanError, ScanResult};
use crate::store::models::{Job, JobMode, JobStatus};

/// Column to sort `GET /api/scans` results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSort {
    CreatedAt,
    StartedAt,
    CompletedAt,
    PagesTotal,
    PagesFinished,
}

impl JobSort {
    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::StartedAt => "started_at",
            Self::CompletedAt => "completed_at",
            Self::PagesTotal => "pages_total",
            Self::PagesFinished => "pages_finished",
        }
    }
}

/// Filters for the job listing query.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub limit: i64,
    pub offset: i64,
    pub search: Option<String>,
    pub mode: Option<JobMode>,
    pub status: Option<JobStatus>,
    pub sort: Option<JobSort>,
    pub direction: Option<SortDirection>,
}

pub struct JobOps<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobOps<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new `pending` job.
    pub async fn insert(
        &self,
        target_url: &str,
        mode: JobMode,
        options: Option<Value>,
    ) -> ScanResult<Job> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO scan_jobs (id, target_url, mode, status, pages_total, pages_finished, issues_summary, options, created_at, started_at, completed_at, error) \
             VALUES (?, ?, ?, 'pending', 0, 0, NULL, ?, ?, NULL, NULL, NULL)",
        )
        .bind(&id)
        .bind(target_url)
        .bind(mode.as_str())
        .bind(options.as_ref().map(std::string::ToString::to_string))
        .bind(now)
        .execute(self.pool)
        .await?;

        self.get(&id).await?.ok_or_else(|| {
            ScanError::Other(anyhow::anyhow!("job vanished immediately after insert"))
        })
    }

    pub async fn get(&self, id: &str) -> ScanResult<Option<Job>> {
        let row = sqlx::query("SELECT * FROM scan_jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(|r| parse_job(&r)).transpose()
    }

    pub async fn list(&self, filter: &JobFilter) -> ScanResult<(Vec<Job>, Pagination)> {
        let mut where_clauses = Vec::new();
        if filter.search.is_some() {
            where_clauses.push("target_url LIKE ?".to_string());
        }
        if filter.mode.is_some() {
            where_clauses.push("mode = ?".to_string());
        }
        if filter.status.is_some() {
            where_clauses.push("status = ?".to_string());
        }
        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", where_clauses.join(" AND "))
        };

        let sort_col = filter.sort.unwrap_or(JobSort::CreatedAt).column();
        let direction = filter.direction.unwrap_or(SortDirection::Desc).sql();

        let count_sql = format!("SELECT COUNT(*) as total FROM scan_jobs {where_sql}");
        let mut count_query = sqlx::query(&count_sql);
        count_query = bind_filter(count_query, filter);
        let total: i64 = count_query.fetch_one(self.pool).await?.try_get("total")?;

        let select_sql = format!(
            "SELECT * FROM scan_jobs {where_sql} ORDER BY {sort_col} {direction} LIMIT ? OFFSET ?"
        );
        let mut query = sqlx::query(&select_sql);
        query = bind_filter(query, filter);
        let rows = query
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        let jobs = rows.iter().map(parse_job).collect::<ScanResult<Vec<_>>>()?;
        Ok((
            jobs,
            Pagination {
                total,
                limit: filter.limit,
                offset: filter.offset,
            },
        ))
    }

    /// Transition `pending -> running`. Sets `started_at` and clears `error`.
    pub async fn mark_running(&self, id: &str) -> ScanResult<()> {
        sqlx::query(
            "UPDATE scan_jobs SET status = 'running', started_at = ?, error = NULL WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Set the progress proxy fields (`pagesTotal`, `pagesFinished ≤ pagesTotal`).
    pub async fn set_pages_total(&self, id: &str, pages_total: i64) -> ScanResult<()> {
        sqlx::query("UPDATE scan_jobs SET pages_total = ? WHERE id = ?")
            .bind(pages_total)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_pages_finished(&self, id: &str, pages_finished: i64) -> ScanResult<()> {
        sqlx::query("UPDATE scan_jobs SET pages_finished = ? WHERE id = ?")
            .bind(pages_finished)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Transition `running -> completed`. Writes the final aggregated summary.
    pub async fn mark_completed(
        &self,
        id: &str,
        pages_total: i64,
        pages_finished: i64,
        issues_summary: Value,
    ) -> ScanResult<()> {
        sqlx::query(
            "UPDATE scan_jobs SET status = 'completed', completed_at = ?, pages_total = ?, pages_finished = ?, issues_summary = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(pages_total)
        .bind(pages_finished)
        .bind(issues_summary.to_string())
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Transition `running -> failed` (covers both ordinary failure and cancellation).
    pub async fn mark_failed(&self, id: &str, error: &str) -> ScanResult<()> {
        sqlx::query("UPDATE scan_jobs SET status = 'failed', completed_at = ?, error = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(error)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a terminal job and cascade to its pages, metrics, tracking events and task events.
    ///
    /// Refuses (`Conflict`) if the job is `pending`/`running`, per spec.md §3.
    pub async fn delete(&self, id: &str) -> ScanResult<()> {
        let job = self
            .get(id)
            .await?
            .ok_or_else(|| ScanError::NotFound(format!("job {id}")))?;
        if !job.status.is_terminal() {
            return Err(ScanError::Conflict(format!(
                "job {id} is {} and cannot be deleted",
                job.status.as_str()
            )));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "DELETE FROM tracking_events WHERE page_id IN (SELECT id FROM scan_pages WHERE job_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM seo_metrics WHERE page_id IN (SELECT id FROM scan_pages WHERE job_id = ?)")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM link_metrics WHERE page_id IN (SELECT id FROM scan_pages WHERE job_id = ?)")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM scan_pages WHERE job_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM task_events WHERE job_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM scan_jobs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Reset a `failed` job back to `pending` so the scheduler can re-run it.
    ///
    /// Conflicts if the job is not currently `failed`.
    pub async fn retry(&self, id: &str) -> ScanResult<()> {
        let job = self
            .get(id)
            .await?
            .ok_or_else(|| ScanError::NotFound(format!("job {id}")))?;
        if job.status != JobStatus::Failed {
            return Err(ScanError::Conflict(format!(
                "job {id} is {} and cannot be retried",
                job.status.as_str()
            )));
        }
        sqlx::query(
            "UPDATE scan_jobs SET status = 'pending', error = NULL, completed_at = NULL, started_at = NULL, pages_finished = 0, issues_summary = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Every job whose status is `pending` or `running`, ordered by `createdAt`.
    /// Used by `Scheduler::start()` to resurrect interrupted work.
    pub async fn list_unfinished(&self) -> ScanResult<Vec<Job>> {
        let rows = sqlx::query(
            "SELECT * FROM scan_jobs WHERE status IN ('pending', 'running') ORDER BY created_at ASC",
        )
        .fetch_all(self.pool)
        .await?;
        rows.iter().map(parse_job).collect()
    }
}

fn bind_filter<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &'q JobFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(search) = &filter.search {
        query = query.bind(format!("%{search}%"));
    }
    if let Some(mode) = filter.mode {
        query = query.bind(mode.as_str());
    }
    if let Some(status) = filter.status {
        query = query.bind(status.as_str());
    }
    query
}

fn parse_job(row: &SqliteRow) -> ScanResult<Job> {
    let mode: String = row.try_get("mode")?;
    let status: String = row.try_get("status")?;
    let issues_summary: Option<String> = row.try_get("issues_summary")?;
    let options: Option<String> = row.try_get("options")?;
    Ok(Job {
        id: row.try_get("id")?,
        target_url: row.try_get("target_url")?,
        mode: mode.parse()?,
        status: status.parse()?,
        pages_total: row.try_get("pages_total")?,
        pages_finished: row.try_get("pages_finished")?,
        issues_summary: issues_summary.map(|s| serde_json::from_str(&s)).transpose().map_err(|e| ScanError::Other(e.into()))?,
        options: options.map(|s| serde_json::from_str(&s)).transpose().map_err(|e| ScanError::Other(e.into()))?,
        created_at: row.try_get("created_at")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        error: row.try_get("error")?,
    })
}
