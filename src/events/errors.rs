//! Error types for task event bus operations.

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("no active subscribers")]
    NoSubscribers,

    #[error("receiver lagged behind, missed {0} messages")]
    ReceiverLagged(u64),

    #[error("event bus shutdown")]
    Shutdown,

    #[error("event channel is full (capacity exceeded)")]
    ChannelFull,

    #[error(transparent)]
    Store(#[from] crate::error::ScanError),
}
