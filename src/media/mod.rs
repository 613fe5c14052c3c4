//! Recording pipeline: one task per camera feed
//!
//! Data Flow:
//! ```text
//!  RTSPtoWeb MSE WebSocket ──► mse_feed::transport ──► FeedSession ──► FileSink ──► <id>-<ts>.mp4
//!            ▲                                              │
//!            └──────── reconnect with backoff ◄──── session end / error
//! ```

pub mod recording;
pub mod types;
