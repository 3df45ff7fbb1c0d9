//! Configuration for the task event bus (spec.md §4.7).

/// Strategy for handling channel saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackpressureMode {
    /// Drop the oldest buffered event; a lagging subscriber sees `RecvError::Lagged`.
    #[default]
    DropOldest,
    /// Return `ChannelFull` to the publisher instead of dropping anything.
    Error,
}

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Maximum number of events buffered for slow subscribers.
    pub capacity: usize,
    pub backpressure_mode: BackpressureMode,
    /// How many recent events a new subscriber is replayed on connect
    /// (spec.md §4.7: "subscribers are primed with recent history").
    pub replay_count: i64,
    pub enable_metrics: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { capacity: 1000, backpressure_mode: BackpressureMode::default(), replay_count: 50, enable_metrics: true }
    }
}
