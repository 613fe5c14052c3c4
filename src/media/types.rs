use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Local};
use mse_feed::{SessionOptions, SessionStats, driver::DriverOptions};
use serde::Serialize;

// ============================================================================
// Configuration Types
// ============================================================================

/// Reconnect delay, doubled after every failed session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

impl BackoffConfig {
    pub fn next(&self, current: Duration) -> Duration {
        (current * 2).min(self.max)
    }
}

/// One camera feed recorded to disk
#[derive(Clone, Debug)]
pub struct RecordingConfig {
    pub id: String,
    /// MSE WebSocket endpoint
    pub url: String,
    pub output_dir: PathBuf,
    pub session: SessionOptions,
    pub driver: DriverOptions,
    pub backoff: BackoffConfig,
}

impl RecordingConfig {
    pub fn builder() -> RecordingConfigBuilder {
        RecordingConfigBuilder::default()
    }

    /// File for a session started at `at`: `<output_dir>/<id>-<timestamp>.mp4`
    pub fn output_path(&self, at: DateTime<Local>) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}.mp4", self.id, at.format("%Y%m%d-%H%M%S%.3f")))
    }
}

#[derive(Default)]
pub struct RecordingConfigBuilder {
    id: Option<String>,
    url: Option<String>,
    output_dir: Option<PathBuf>,
    session: SessionOptions,
    driver: DriverOptions,
    backoff: BackoffConfig,
}

impl RecordingConfigBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn session(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }

    pub fn driver(mut self, driver: DriverOptions) -> Self {
        self.driver = driver;
        self
    }

    pub fn backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn build(self) -> anyhow::Result<RecordingConfig> {
        let id = self.id.ok_or(anyhow::anyhow!("id is required"))?;
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(anyhow::anyhow!("invalid recording id: {:?}", id));
        }
        let url = self.url.ok_or(anyhow::anyhow!("url is required"))?;
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(anyhow::anyhow!("url must be ws:// or wss://: {}", url));
        }
        Ok(RecordingConfig {
            id,
            url,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("recordings")),
            session: self.session,
            driver: self.driver,
            backoff: self.backoff,
        })
    }
}

// ============================================================================
// Status Types
// ============================================================================

/// Snapshot of a recording, served by the status API
#[derive(Clone, Debug, Default, Serialize)]
pub struct RecordingStatus {
    pub id: String,
    pub url: String,
    pub started: bool,
    pub connected: bool,
    /// Number of sessions opened, including the current one
    pub sessions: u64,
    pub output: Option<PathBuf>,
    pub codec: Option<String>,
    pub frames_received: u64,
    pub fragments_submitted: u64,
    pub queue_depth: usize,
    pub peak_queue_depth: usize,
    pub bytes_written: u64,
    pub last_error: Option<String>,
    pub started_at: Option<DateTime<Local>>,
}

impl RecordingStatus {
    pub(crate) fn apply_stats(&mut self, stats: &SessionStats) {
        self.frames_received = stats.frames_received;
        self.fragments_submitted = stats.fragments_submitted;
        self.queue_depth = stats.queue_depth;
        self.peak_queue_depth = stats.peak_queue_depth;
    }
}
