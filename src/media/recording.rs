use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use mse_feed::{
    FeedSession,
    driver::{self, SessionEnd},
    file_sink::FileSink,
    transport,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::media::types::{RecordingConfig, RecordingStatus};

/// Recording: one MSE feed written to disk, reconnecting until cancelled
pub struct Recording {
    config: RecordingConfig,
    cancel: CancellationToken,
    started: AtomicBool,
    status: Mutex<RecordingStatus>,
    bytes_written: Mutex<Option<Arc<AtomicU64>>>,
}

impl Recording {
    pub fn new(config: RecordingConfig) -> Self {
        let status = RecordingStatus {
            id: config.id.clone(),
            url: config.url.clone(),
            ..Default::default()
        };
        Self {
            config,
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            status: Mutex::new(status),
            bytes_written: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if the recording has been started
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    /// Check if the recording has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn status(&self) -> RecordingStatus {
        let mut status = self.lock_status().clone();
        status.started = self.is_started();
        if let Some(written) = self.bytes_written.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            status.bytes_written = written.load(Ordering::Relaxed);
        }
        status
    }

    /// Run sessions until cancelled, with exponential backoff between them
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::Relaxed) {
            log::warn!("Recording: {} already started", self.config.id);
            return;
        }

        log::info!("Recording: {} starting from {}", self.config.id, self.config.url);
        self.lock_status().started_at = Some(chrono::Local::now());

        if let Err(e) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            log::error!(
                "Recording: {} cannot create {}: {}",
                self.config.id,
                self.config.output_dir.display(),
                e
            );
            self.lock_status().last_error = Some(e.to_string());
            self.started.store(false, Ordering::Relaxed);
            return;
        }

        let backoff_config = self.config.backoff;
        let mut backoff = backoff_config.initial;
        loop {
            match self.run_session().await {
                Ok(SessionEnd::Cancelled) => break,
                Ok(SessionEnd::Closed) => {
                    log::info!("Recording: {} session closed", self.config.id);
                    backoff = backoff_config.initial;
                }
                Err(e) => {
                    log::warn!("Recording: {} session failed: {:#}", self.config.id, e);
                    self.lock_status().last_error = Some(format!("{:#}", e));
                }
            }
            self.lock_status().connected = false;

            if self.cancel.is_cancelled() {
                break;
            }
            log::info!("Recording: {} reconnecting in {:?}", self.config.id, backoff);
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = backoff_config.next(backoff);
        }

        self.lock_status().connected = false;
        self.started.store(false, Ordering::Relaxed);
        log::info!("Recording: {} stopped", self.config.id);
    }

    /// One connection: fresh transport, sink and session state
    async fn run_session(&self) -> anyhow::Result<SessionEnd> {
        self.lock_status().sessions += 1;

        let frames = tokio::select! {
            _ = self.cancel.cancelled() => return Ok(SessionEnd::Cancelled),
            frames = transport::connect(&self.config.url) => frames?,
        };

        let path = self.config.output_path(chrono::Local::now());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = FileSink::create(&path, tx).await.map_err(|e| {
            anyhow::anyhow!("Failed to create {}: {}", path.display(), e)
        })?;
        *self.bytes_written.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(sink.bytes_written_handle());
        {
            let mut status = self.lock_status();
            status.connected = true;
            status.output = Some(path.clone());
            status.codec = None;
        }
        log::info!("Recording: {} writing {}", self.config.id, path.display());

        let mut session = FeedSession::new(sink, self.config.session);
        let end = driver::run_observed(
            frames,
            &mut session,
            &mut rx,
            &self.cancel,
            self.config.driver,
            |session| {
                let mut status = self.lock_status();
                status.apply_stats(&session.stats());
                status.codec = session.descriptor().map(|d| d.codecs().to_string());
            },
        )
        .await?;
        Ok(end)
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, RecordingStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "recording_test.rs"]
mod recording_test;
