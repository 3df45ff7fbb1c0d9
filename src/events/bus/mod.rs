//! Event bus implementation: persistence-backed publishing with a live
//! broadcast fan-out for subscribers (spec.md §4.7).

mod core;
mod impls;
mod metrics_reporting;
mod publishing;
mod shutdown;
mod subscription;

pub use core::TaskEventBus;

#[cfg(test)]
mod tests {
    use super::TaskEventBus;
    use crate::events::types::{TaskEvent, TaskEventKind};

    #[test]
    fn new_bus_has_no_subscribers() {
        let bus = TaskEventBus::new(16);
        assert!(!bus.has_subscribers());
    }

    #[test]
    fn broadcast_without_subscribers_reports_failure() {
        let bus = TaskEventBus::new(16);
        let event = TaskEvent {
            id: 1,
            job_id: "job-1".to_string(),
            kind: TaskEventKind::Queued,
            payload: serde_json::json!({}),
            created_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        };
        assert!(bus.broadcast(event).is_err());
    }

    #[test]
    fn broadcast_reaches_subscriber() {
        let bus = TaskEventBus::new(16);
        let mut rx = bus.subscribe();
        let event = TaskEvent {
            id: 1,
            job_id: "job-1".to_string(),
            kind: TaskEventKind::Started,
            payload: serde_json::json!({}),
            created_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        };
        assert_eq!(bus.broadcast(event).unwrap(), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn shutdown_is_idempotent_and_observable() {
        let bus = TaskEventBus::new(16);
        assert!(!bus.is_shutdown());
        bus.shutdown();
        bus.shutdown();
        assert!(bus.is_shutdown());
    }
}
