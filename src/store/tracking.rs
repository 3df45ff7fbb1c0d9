//! `tracking_events` insert + the batch-fetch-and-group read used by
//! `listPagesForJob` (spec.md §4.8: "a second query batch-fetches
//! TrackingEvents for the page-id set and groups them per page").

use std::collections::HashMap;

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use crate::error::ScanResult;
use crate::store::models::TrackingEventRow;

pub struct TrackingOps<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TrackingOps<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_batch(&self, page_id: &str, events: &[crate::analyzer::TrackingEvent]) -> ScanResult<()> {
        for event in events {
            sqlx::query(
                "INSERT INTO tracking_events (id, page_id, element, trigger, event_name, platform, device_variant, payload, status) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(page_id)
            .bind(&event.element)
            .bind(&event.trigger)
            .bind(&event.event_name)
            .bind(event.platform.as_str())
            .bind(event.device_variant.map(crate::config::DeviceProfile::as_str))
            .bind(event.payload.as_ref().map(std::string::ToString::to_string))
            .bind(event.status.as_str())
            .execute(self.pool)
            .await?;
        }
        Ok(())
    }

    /// Batch-fetch tracking events for a set of page ids, grouped per page.
    pub async fn list_for_pages(
        &self,
        page_ids: &[String],
    ) -> ScanResult<HashMap<String, Vec<TrackingEventRow>>> {
        let mut grouped: HashMap<String, Vec<TrackingEventRow>> = HashMap::new();
        if page_ids.is_empty() {
            return Ok(grouped);
        }
        let placeholders = page_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("SELECT * FROM tracking_events WHERE page_id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in page_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(self.pool).await?;
        for row in &rows {
            let event = parse_row(row)?;
            grouped.entry(event.page_id.clone()).or_default().push(event);
        }
        Ok(grouped)
    }
}

fn parse_row(row: &SqliteRow) -> ScanResult<TrackingEventRow> {
    Ok(TrackingEventRow {
        id: row.try_get("id")?,
        page_id: row.try_get("page_id")?,
        element: row.try_get("element")?,
        trigger: row.try_get("trigger")?,
        event_name: row.try_get("event_name")?,
        platform: row.try_get("platform")?,
        device_variant: row.try_get("device_variant")?,
        payload: row
            .try_get::<Option<String>, _>("payload")?
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| crate::error::ScanError::Other(e.into()))?,
        status: row.try_get("status")?,
    })
}
