//! Event loop tying a transport, a [`FeedSession`] and its sink together.
//!
//! ```text
//! transport frames ──► handle_frame ──► queue ──► sink.submit
//!                                          ▲           │
//!                     on_sink_ready ◄── SinkSignal ◄───┘
//! ```

use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{FeedError, FeedResult, SinkError},
    session::FeedSession,
    sink::{MediaSink, SinkSignal},
};

pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug)]
pub struct DriverOptions {
    /// Maximum time the sink may stay busy without a readiness signal.
    /// `None` waits forever.
    pub stall_timeout: Option<Duration>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            stall_timeout: Some(DEFAULT_STALL_TIMEOUT),
        }
    }
}

/// How a session ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// Transport closed.
    Closed,
    Cancelled,
}

/// Pump frames and sink signals into `session` until the transport closes,
/// `cancel` fires or a fatal error occurs.
pub async fn run<St, S>(
    frames: St,
    session: &mut FeedSession<S>,
    signals: &mut mpsc::UnboundedReceiver<SinkSignal>,
    cancel: &CancellationToken,
    options: DriverOptions,
) -> FeedResult<SessionEnd>
where
    St: Stream<Item = FeedResult<Bytes>>,
    S: MediaSink,
{
    run_observed(frames, session, signals, cancel, options, |_| {}).await
}

/// Like [`run`], calling `observe` after every handled event.
pub async fn run_observed<St, S, F>(
    frames: St,
    session: &mut FeedSession<S>,
    signals: &mut mpsc::UnboundedReceiver<SinkSignal>,
    cancel: &CancellationToken,
    options: DriverOptions,
    mut observe: F,
) -> FeedResult<SessionEnd>
where
    St: Stream<Item = FeedResult<Bytes>>,
    S: MediaSink,
    F: FnMut(&FeedSession<S>),
{
    let mut frames = std::pin::pin!(frames);
    let mut was_busy = false;
    let mut last_progress = Instant::now();

    loop {
        let deadline = match options.stall_timeout {
            Some(timeout) if was_busy => Some(last_progress + timeout),
            _ => None,
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("Feed: cancelled");
                return Ok(SessionEnd::Cancelled);
            }
            frame = frames.next() => match frame {
                None => {
                    log::info!("Feed: transport closed");
                    return Ok(SessionEnd::Closed);
                }
                Some(Err(e)) => return Err(e),
                Some(Ok(data)) => match session.handle_frame(data) {
                    Ok(outcome) => log::trace!("Feed: frame handled: {:?}", outcome),
                    Err(e) if !e.is_fatal() => log::warn!("Feed: frame dropped: {}", e),
                    Err(e) => return Err(e),
                },
            },
            Some(signal) = signals.recv() => match signal {
                SinkSignal::Ready => {
                    last_progress = Instant::now();
                    session.on_sink_ready()?;
                }
                SinkSignal::Paused => {
                    session.on_pause();
                }
                SinkSignal::Failed(e) => return Err(FeedError::Sink(SinkError::Io(e))),
            },
            _ = stall_timer(deadline) => {
                // the sink may have finished just before the timer fired
                if session.is_sink_busy() {
                    let timeout = options.stall_timeout.unwrap_or_default();
                    log::error!("Feed: sink busy for {:?} without readiness", timeout);
                    return Err(FeedError::Stalled(timeout));
                }
            }
        }

        observe(session);
        let busy = session.is_sink_busy();
        if busy && !was_busy {
            last_progress = Instant::now();
        }
        was_busy = busy;
    }
}

async fn stall_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;
