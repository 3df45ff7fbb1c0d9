//! Subscription operations for the `TaskEventBus`.

use tokio::sync::broadcast;

use crate::error::ScanResult;
use crate::events::types::TaskEvent;
use crate::store::ScanStore;

use super::core::TaskEventBus;

impl TaskEventBus {
    /// Raw broadcast receiver. Most callers want [`Self::subscribe_primed`]
    /// instead, which also replays recent history.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let count = self.sender.receiver_count();
        if self.config.enable_metrics {
            self.metrics.update_subscriber_count(count);
        }
        count
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// Subscribe and return up to `config.replay_count` recent events for
    /// `job_id` so a newly connected client doesn't miss history published
    /// before it subscribed (spec.md §4.7).
    pub async fn subscribe_primed(&self, store: &ScanStore, job_id: &str) -> ScanResult<(Vec<TaskEvent>, broadcast::Receiver<TaskEvent>)> {
        let receiver = self.subscribe();
        let rows = store.task_events().list_for_job(job_id).await?;
        let replay = rows
            .into_iter()
            .rev()
            .take(self.config.replay_count.max(0) as usize)
            .rev()
            .filter_map(|row| TaskEvent::from_row(row).ok())
            .collect();
        Ok((replay, receiver))
    }

    /// The last `limit` events across every job, for the `init` frame of a
    /// queue-state snapshot. Unlike `subscribe_primed`, this doesn't scope to
    /// one job and doesn't open a live receiver.
    pub async fn recent_task_events(&self, store: &ScanStore, limit: i64) -> ScanResult<Vec<TaskEvent>> {
        let rows = store.task_events().list_recent(limit).await?;
        Ok(rows.into_iter().filter_map(|row| TaskEvent::from_row(row).ok()).collect())
    }
}
