//! `seo_metrics` / `link_metrics` insert (0..1 row per page, spec.md §3).

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::ScanResult;
use crate::store::models::{LinkMetricsRow, SeoMetricsRow};

pub struct MetricsOps<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MetricsOps<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_seo(&self, page_id: &str, row: &SeoMetricsRow) -> ScanResult<()> {
        sqlx::query(
            "INSERT INTO seo_metrics (id, page_id, title, meta_description, canonical, h1, robots_txt_blocked, schema_org, score, json_ld_score, json_ld_types, json_ld_issues, html_structure_score, html_structure_issues) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(page_id)
        .bind(&row.title)
        .bind(&row.meta_description)
        .bind(&row.canonical)
        .bind(&row.h1)
        .bind(row.robots_txt_blocked)
        .bind(row.schema_org.as_ref().map(std::string::ToString::to_string))
        .bind(row.score)
        .bind(row.json_ld_score)
        .bind(row.json_ld_types.as_ref().map(std::string::ToString::to_string))
        .bind(row.json_ld_issues.as_ref().map(std::string::ToString::to_string))
        .bind(row.html_structure_score)
        .bind(row.html_structure_issues.as_ref().map(std::string::ToString::to_string))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_link(&self, page_id: &str, row: &LinkMetricsRow) -> ScanResult<()> {
        sqlx::query(
            "INSERT INTO link_metrics (id, page_id, internal_links, external_links, utm_params, broken_links, redirects) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(page_id)
        .bind(row.internal_links)
        .bind(row.external_links)
        .bind(row.utm_params.to_string())
        .bind(row.broken_links)
        .bind(row.redirects)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
