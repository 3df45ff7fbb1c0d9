//! Shutdown operations for the `TaskEventBus`.

use std::sync::atomic::Ordering;

use super::core::TaskEventBus;

impl TaskEventBus {
    /// Signal shutdown to all subscribers. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
        log::debug!("task event bus shutdown signaled");
    }

    pub async fn wait_for_shutdown(&self) {
        self.shutdown.notified().await;
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }
}
