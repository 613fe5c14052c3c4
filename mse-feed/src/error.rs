use std::time::Duration;

pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("empty frame")]
    EmptyFrame,

    #[error("media fragment received before codec descriptor")]
    NotInitialized,

    #[error("codec descriptor {0:?} rejected, session already initialized")]
    DescriptorRejected(String),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("session failed earlier: {0}")]
    SessionFailed(String),

    #[error("sink stalled, no readiness signal for {0:?}")]
    Stalled(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

impl FeedError {
    /// Whether the session may continue after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FeedError::EmptyFrame)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink is busy")]
    Busy,

    #[error("sink not initialized")]
    NotInitialized,

    #[error("sink closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
