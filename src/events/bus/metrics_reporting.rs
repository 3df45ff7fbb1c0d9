//! Metrics reporting for the `TaskEventBus`.

use super::core::TaskEventBus;

impl TaskEventBus {
    #[must_use]
    pub fn get_metrics_report(&self) -> String {
        if !self.config.enable_metrics {
            return "metrics disabled".to_string();
        }
        let s = self.metrics.snapshot();
        format!(
            "published={} dropped={} failed={} lagged={} active_subscribers={} peak_subscribers={} success_rate={:.2}%",
            s.events_published,
            s.events_dropped,
            s.events_failed,
            s.lagged_subscribers,
            s.active_subscribers,
            s.peak_subscribers,
            s.success_rate(),
        )
    }
}
