//! Append-only `task_events` log, totally ordered by `(created_at, id)`
//! (spec.md §3, §5).

use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::error::ScanResult;
use crate::store::models::TaskEventRow;

pub struct TaskEventOps<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskEventOps<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one event and return the row with its assigned `id`/`created_at`.
    pub async fn insert(&self, job_id: &str, event_type: &str, payload: Value) -> ScanResult<TaskEventRow> {
        let now = Utc::now();
        let id = sqlx::query("INSERT INTO task_events (job_id, type, payload, created_at) VALUES (?, ?, ?, ?)")
            .bind(job_id)
            .bind(event_type)
            .bind(payload.to_string())
            .bind(now)
            .execute(self.pool)
            .await?
            .last_insert_rowid();

        Ok(TaskEventRow {
            id,
            job_id: job_id.to_string(),
            event_type: event_type.to_string(),
            payload,
            created_at: now,
        })
    }

    /// Last `limit` events across all jobs, in chronological order. Used to
    /// prime new live subscribers.
    pub async fn list_recent(&self, limit: i64) -> ScanResult<Vec<TaskEventRow>> {
        let rows = sqlx::query("SELECT * FROM task_events ORDER BY created_at DESC, id DESC LIMIT ?")
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        let mut events = rows.iter().map(parse_row).collect::<ScanResult<Vec<_>>>()?;
        events.reverse();
        Ok(events)
    }

    pub async fn list_for_job(&self, job_id: &str) -> ScanResult<Vec<TaskEventRow>> {
        let rows = sqlx::query("SELECT * FROM task_events WHERE job_id = ? ORDER BY created_at ASC, id ASC")
            .bind(job_id)
            .fetch_all(self.pool)
            .await?;
        rows.iter().map(parse_row).collect()
    }
}

fn parse_row(row: &SqliteRow) -> ScanResult<TaskEventRow> {
    let payload: String = row.try_get("payload")?;
    Ok(TaskEventRow {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        event_type: row.try_get("type")?,
        payload: serde_json::from_str(&payload).map_err(|e| crate::error::ScanError::Other(e.into()))?,
        created_at: row.try_get("created_at")?,
    })
}
