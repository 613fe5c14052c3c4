use bytes::Bytes;

use crate::error::SinkError;

/// Downstream consumer that accepts one fragment at a time.
///
/// `submit` must only be called while `is_busy()` is false. The sink reports
/// completion by sending [`SinkSignal::Ready`] on its readiness channel.
pub trait MediaSink {
    fn initialize(&mut self, mime_type: &str) -> Result<(), SinkError>;

    fn submit(&mut self, fragment: Bytes) -> Result<(), SinkError>;

    fn is_busy(&self) -> bool;

    /// Playback surface attached to this sink, if any.
    fn surface(&mut self) -> Option<&mut dyn PlaybackSurface> {
        None
    }
}

/// Playback position and buffered range of whatever presents the media.
pub trait PlaybackSurface {
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, time: f64);

    /// End of the last buffered range, `None` when nothing is buffered.
    fn buffered_end(&self) -> Option<f64>;

    /// Whether the surface is currently not visible to the user.
    fn is_hidden(&self) -> bool;

    fn play(&mut self);
}

/// Notification sent by a sink to the session driving it.
#[derive(Debug)]
pub enum SinkSignal {
    /// Previous submission completed; the sink accepts the next one.
    Ready,
    /// Playback on the attached surface was paused.
    Paused,
    Failed(std::io::Error),
}
