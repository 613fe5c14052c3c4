//! Feeds tagged MSE frames from a WebSocket into a one-at-a-time media sink.
//!
//! Data Flow:
//! ```text
//!                       ┌─► tag 9: CodecDescriptor ─► sink.initialize (once)
//! WebSocket ─► Frame ───┤
//!                       └─► fragment ─► first? ─► sink.submit
//!                                         │
//!                                         └─► FragmentQueue ─► drain on ready ─► sink.submit
//! ```

pub mod driver;
pub mod error;
pub mod file_sink;
pub mod frame;
pub mod queue;
pub mod recovery;
pub mod session;
pub mod sink;
pub mod transport;

pub use error::{FeedError, FeedResult, SinkError};
pub use frame::{CodecDescriptor, Frame};
pub use session::{DescriptorPolicy, FeedSession, SessionOptions, SessionStats};
pub use sink::{MediaSink, PlaybackSurface, SinkSignal};
