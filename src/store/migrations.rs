//! Embedded schema for the `scan_*` tables (spec.md §6).
//!
//! Executed as a single batch of `CREATE TABLE IF NOT EXISTS` statements at
//! startup, the way the donor's search index opens its Tantivy directory
//! idempotently. DB-engine choice is free per spec.md §1; SQLite is used
//! here since it's already the donor's `sqlx` feature.

use sqlx::SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scan_jobs (
    id TEXT PRIMARY KEY,
    target_url TEXT NOT NULL,
    mode TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_total INTEGER NOT NULL DEFAULT 0,
    pages_finished INTEGER NOT NULL DEFAULT 0,
    issues_summary TEXT,
    options TEXT,
    created_at TEXT NOT NULL,
    started_at TEXT,
    completed_at TEXT,
    error TEXT
);

CREATE TABLE IF NOT EXISTS scan_pages (
    id TEXT PRIMARY KEY,
    job_id TEXT NOT NULL REFERENCES scan_jobs(id),
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    http_status INTEGER,
    load_time_ms INTEGER,
    issue_counts TEXT,
    device_variant TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scan_pages_job_id ON scan_pages(job_id);

CREATE TABLE IF NOT EXISTS seo_metrics (
    id TEXT PRIMARY KEY,
    page_id TEXT NOT NULL UNIQUE REFERENCES scan_pages(id),
    title TEXT,
    meta_description TEXT,
    canonical TEXT,
    h1 TEXT,
    robots_txt_blocked INTEGER NOT NULL DEFAULT 0,
    schema_org TEXT,
    score INTEGER NOT NULL,
    json_ld_score REAL,
    json_ld_types TEXT,
    json_ld_issues TEXT,
    html_structure_score REAL,
    html_structure_issues TEXT
);

CREATE TABLE IF NOT EXISTS link_metrics (
    id TEXT PRIMARY KEY,
    page_id TEXT NOT NULL UNIQUE REFERENCES scan_pages(id),
    internal_links INTEGER NOT NULL DEFAULT 0,
    external_links INTEGER NOT NULL DEFAULT 0,
    utm_params TEXT NOT NULL,
    broken_links INTEGER NOT NULL DEFAULT 0,
    redirects INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS tracking_events (
    id TEXT PRIMARY KEY,
    page_id TEXT NOT NULL REFERENCES scan_pages(id),
    element TEXT,
    trigger TEXT NOT NULL,
    event_name TEXT,
    platform TEXT NOT NULL,
    device_variant TEXT,
    payload TEXT,
    status TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tracking_events_page_id ON tracking_events(page_id);

CREATE TABLE IF NOT EXISTS task_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id TEXT NOT NULL REFERENCES scan_jobs(id),
    type TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_task_events_job_id ON task_events(job_id);
"#;

/// Run the embedded schema against `pool`. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
