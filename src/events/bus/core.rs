//! Core `TaskEventBus` struct definition and constructors.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize};

use tokio::sync::{Notify, broadcast};

use crate::events::config::EventBusConfig;
use crate::events::metrics::EventBusMetrics;
use crate::events::types::TaskEvent;

/// Durable, totally-ordered event log with a live broadcast fan-out
/// (spec.md §4.7). Every published event is persisted through `ScanStore`
/// before subscribers see it, so `task_events` is always the authoritative
/// replay source and the broadcast channel is purely a live-tail
/// convenience.
#[derive(Debug)]
pub struct TaskEventBus {
    pub(super) sender: broadcast::Sender<TaskEvent>,
    pub(super) config: Arc<EventBusConfig>,
    pub(super) metrics: EventBusMetrics,
    pub(super) shutdown: Arc<Notify>,
    pub(super) shutdown_flag: Arc<AtomicBool>,
    pub(super) num_instances: Arc<AtomicUsize>,
}

impl TaskEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(EventBusConfig { capacity, ..Default::default() })
    }

    #[must_use]
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity);
        Self {
            sender,
            config: Arc::new(config),
            metrics: EventBusMetrics::new(),
            shutdown: Arc::new(Notify::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            num_instances: Arc::new(AtomicUsize::new(1)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> &EventBusMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.sender.len()
    }

    #[must_use]
    pub fn pressure(&self) -> f64 {
        self.sender.len() as f64 / self.config.capacity as f64
    }
}
