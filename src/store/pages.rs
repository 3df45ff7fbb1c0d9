//! Page aggregate: insert/read/update + the listing query behind
//! `GET /api/scans/:id/pages`, joined against `seo_metrics`/`link_metrics`
//! per spec.md §4.8.

use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::{Pagination, SortDirection};
use crate::error::{ScanError, ScanResult};
use crate::store::models::{Page, PageStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSort {
    CreatedAt,
    Url,
    HttpStatus,
    LoadTimeMs,
    SeoScore,
}

impl PageSort {
    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "p.created_at",
            Self::Url => "p.url",
            Self::HttpStatus => "p.http_status",
            Self::LoadTimeMs => "p.load_time_ms",
            Self::SeoScore => "s.score",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    pub limit: i64,
    pub offset: i64,
    pub search: Option<String>,
    pub status: Option<PageStatus>,
    pub sort: Option<PageSort>,
    pub direction: Option<SortDirection>,
}

pub struct PageOps<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PageOps<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a page row in `processing` state. First step of the Page Pipeline.
    pub async fn insert_processing(&self, job_id: &str, url: &str) -> ScanResult<Page> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO scan_pages (id, job_id, url, status, created_at) VALUES (?, ?, ?, 'processing', ?)",
        )
        .bind(&id)
        .bind(job_id)
        .bind(url)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| ScanError::Other(anyhow::anyhow!("page vanished immediately after insert")))
    }

    pub async fn mark_completed(
        &self,
        id: &str,
        http_status: Option<i64>,
        load_time_ms: Option<i64>,
        issue_counts: &Value,
        device_variant: Option<&str>,
    ) -> ScanResult<()> {
        sqlx::query(
            "UPDATE scan_pages SET status = 'completed', http_status = ?, load_time_ms = ?, issue_counts = ?, device_variant = ? WHERE id = ?",
        )
        .bind(http_status)
        .bind(load_time_ms)
        .bind(issue_counts.to_string())
        .bind(device_variant)
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: &str, error: &str) -> ScanResult<()> {
        let issue_counts = serde_json::json!({ "error": error });
        sqlx::query("UPDATE scan_pages SET status = 'failed', issue_counts = ? WHERE id = ?")
            .bind(issue_counts.to_string())
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> ScanResult<Option<Page>> {
        let row = sqlx::query("SELECT * FROM scan_pages WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(|r| parse_page(&r)).transpose()
    }

    /// `getPageForJob(jobId, pageId)`.
    pub async fn get_for_job(&self, job_id: &str, page_id: &str) -> ScanResult<Option<Page>> {
        let row = sqlx::query("SELECT * FROM scan_pages WHERE job_id = ? AND id = ?")
            .bind(job_id)
            .bind(page_id)
            .fetch_optional(self.pool)
            .await?;
        row.map(|r| parse_page(&r)).transpose()
    }

    /// `listPagesForJob`.
    pub async fn list_for_job(
        &self,
        job_id: &str,
        filter: &PageFilter,
    ) -> ScanResult<(Vec<Page>, Pagination)> {
        let mut where_clauses = vec!["p.job_id = ?".to_string()];
        if filter.search.is_some() {
            where_clauses.push("p.url LIKE ?".to_string());
        }
        if filter.status.is_some() {
            where_clauses.push("p.status = ?".to_string());
        }
        let where_sql = format!("WHERE {}", where_clauses.join(" AND "));
        let sort_col = filter.sort.unwrap_or(PageSort::CreatedAt).column();
        let direction = filter.direction.unwrap_or(SortDirection::Desc).sql();

        let count_sql = format!(
            "SELECT COUNT(*) as total FROM scan_pages p LEFT JOIN seo_metrics s ON s.page_id = p.id {where_sql}"
        );
        let mut count_query = sqlx::query(&count_sql).bind(job_id);
        count_query = bind_page_filter(count_query, filter);
        let total: i64 = count_query.fetch_one(self.pool).await?.try_get("total")?;

        let select_sql = format!(
            "SELECT p.* FROM scan_pages p LEFT JOIN seo_metrics s ON s.page_id = p.id {where_sql} ORDER BY {sort_col} {direction} LIMIT ? OFFSET ?"
        );
        let mut query = sqlx::query(&select_sql).bind(job_id);
        query = bind_page_filter(query, filter);
        let rows = query
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        let pages = rows.iter().map(parse_page).collect::<ScanResult<Vec<_>>>()?;
        Ok((
            pages,
            Pagination {
                total,
                limit: filter.limit,
                offset: filter.offset,
            },
        ))
    }
}

fn bind_page_filter<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &'q PageFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(search) = &filter.search {
        query = query.bind(format!("%{search}%"));
    }
    if let Some(status) = filter.status {
        query = query.bind(status.as_str());
    }
    query
}

fn parse_page(row: &SqliteRow) -> ScanResult<Page> {
    let status: String = row.try_get("status")?;
    let issue_counts: Option<String> = row.try_get("issue_counts")?;
    Ok(Page {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        url: row.try_get("url")?,
        status: status.parse()?,
        http_status: row.try_get("http_status")?,
        load_time_ms: row.try_get("load_time_ms")?,
        issue_counts: issue_counts.map(|s| serde_json::from_str(&s)).transpose().map_err(|e| ScanError::Other(e.into()))?,
        device_variant: row.try_get("device_variant")?,
        created_at: row.try_get("created_at")?,
    })
}
