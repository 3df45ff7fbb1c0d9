//! Persist-then-broadcast publishing for the `TaskEventBus`.

use serde_json::Value;

use crate::events::config::BackpressureMode;
use crate::events::errors::EventBusError;
use crate::events::types::{BatchPublishResult, TaskEvent, TaskEventKind};
use crate::store::ScanStore;

use super::core::TaskEventBus;

impl TaskEventBus {
    /// Persist `kind`/`payload` for `job_id` through `store`, then broadcast
    /// the resulting row to live subscribers. This is the only path that
    /// should be used outside tests: it guarantees every subscriber and the
    /// `task_events` table agree on event id and ordering.
    pub async fn publish(&self, store: &ScanStore, job_id: &str, kind: TaskEventKind, payload: Value) -> Result<usize, EventBusError> {
        if self.is_shutdown() {
            return Err(EventBusError::Shutdown);
        }

        if let BackpressureMode::Error = self.config.backpressure_mode {
            if self.sender.len() >= self.config.capacity {
                return Err(EventBusError::ChannelFull);
            }
        }

        let row = store.task_events().insert(job_id, kind.as_str(), payload).await?;
        let event = TaskEvent::from_row(row)?;
        self.broadcast(event)
    }

    /// Broadcast an already-persisted event without touching the store.
    /// Used by `list_recent`-style replay and by tests that don't wire a
    /// `ScanStore`.
    pub fn broadcast(&self, event: TaskEvent) -> Result<usize, EventBusError> {
        match self.sender.send(event) {
            Ok(count) => {
                if self.config.enable_metrics {
                    self.metrics.increment_published();
                    self.metrics.update_subscriber_count(count);
                    if count == 0 {
                        self.metrics.increment_dropped();
                    }
                }
                Ok(count)
            }
            Err(_) => {
                if self.config.enable_metrics {
                    self.metrics.increment_failed();
                }
                Err(EventBusError::NoSubscribers)
            }
        }
    }

    /// Publish several events best-effort; a missing subscriber on one
    /// event never stops the rest from being attempted.
    pub async fn publish_batch(
        &self,
        store: &ScanStore,
        job_id: &str,
        events: Vec<(TaskEventKind, Value)>,
    ) -> BatchPublishResult {
        let total = events.len();
        let mut published = 0;
        let mut failed = 0;
        let mut max_subscribers = 0;

        for (kind, payload) in events {
            match self.publish(store, job_id, kind, payload).await {
                Ok(count) => {
                    published += 1;
                    max_subscribers = max_subscribers.max(count);
                }
                Err(_) => failed += 1,
            }
        }

        BatchPublishResult { total, published, failed, max_subscribers }
    }
}
