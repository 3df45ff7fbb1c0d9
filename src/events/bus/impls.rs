//! Standard trait implementations for `TaskEventBus`.

use std::sync::atomic::Ordering;

use crate::events::config::EventBusConfig;

use super::core::TaskEventBus;

impl Default for TaskEventBus {
    fn default() -> Self {
        Self::with_config(EventBusConfig::default())
    }
}

impl Clone for TaskEventBus {
    fn clone(&self) -> Self {
        self.num_instances.fetch_add(1, Ordering::Relaxed);
        Self {
            sender: self.sender.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            shutdown: self.shutdown.clone(),
            shutdown_flag: self.shutdown_flag.clone(),
            num_instances: self.num_instances.clone(),
        }
    }
}

impl Drop for TaskEventBus {
    fn drop(&mut self) {
        if self.num_instances.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shutdown_flag.store(true, Ordering::SeqCst);
            self.shutdown.notify_waiters();
        }
    }
}
