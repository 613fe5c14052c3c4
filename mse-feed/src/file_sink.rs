use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use bytes::Bytes;
use tokio::{io::AsyncWriteExt as _, sync::mpsc};

use crate::{
    error::SinkError,
    sink::{MediaSink, SinkSignal},
};

enum WriteCmd {
    Codec(String),
    Fragment(Bytes),
}

/// Records the fragmented MP4 stream to a file.
///
/// Each submission stays busy until the writer task has flushed it, then a
/// [`SinkSignal::Ready`] is sent. The mime type goes to a `.codec` sidecar.
pub struct FileSink {
    path: PathBuf,
    tx: mpsc::UnboundedSender<WriteCmd>,
    busy: Arc<AtomicBool>,
    bytes_written: Arc<AtomicU64>,
    mime_type: Option<String>,
}

impl FileSink {
    pub async fn create(
        path: impl AsRef<Path>,
        signals: mpsc::UnboundedSender<SinkSignal>,
    ) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::File::create(&path).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        let busy = Arc::new(AtomicBool::new(false));
        let bytes_written = Arc::new(AtomicU64::new(0));

        tokio::spawn(write_loop(
            file,
            codec_path(&path),
            rx,
            signals,
            Arc::clone(&busy),
            Arc::clone(&bytes_written),
        ));

        Ok(Self {
            path,
            tx,
            busy,
            bytes_written,
            mime_type: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Shared counter, readable after the sink moved into a session.
    pub fn bytes_written_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.bytes_written)
    }
}

impl MediaSink for FileSink {
    fn initialize(&mut self, mime_type: &str) -> Result<(), SinkError> {
        self.tx
            .send(WriteCmd::Codec(mime_type.to_string()))
            .map_err(|_| SinkError::Closed)?;
        self.mime_type = Some(mime_type.to_string());
        Ok(())
    }

    fn submit(&mut self, fragment: Bytes) -> Result<(), SinkError> {
        if self.mime_type.is_none() {
            return Err(SinkError::NotInitialized);
        }
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(SinkError::Busy);
        }
        if self.tx.send(WriteCmd::Fragment(fragment)).is_err() {
            self.busy.store(false, Ordering::Release);
            return Err(SinkError::Closed);
        }
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// `camera.mp4` -> `camera.mp4.codec`
fn codec_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".codec");
    PathBuf::from(name)
}

async fn write_loop(
    mut file: tokio::fs::File,
    codec_path: PathBuf,
    mut rx: mpsc::UnboundedReceiver<WriteCmd>,
    signals: mpsc::UnboundedSender<SinkSignal>,
    busy: Arc<AtomicBool>,
    bytes_written: Arc<AtomicU64>,
) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WriteCmd::Codec(mime_type) => {
                if let Err(e) = tokio::fs::write(&codec_path, mime_type.as_bytes()).await {
                    log::error!("FileSink: write {} failed: {}", codec_path.display(), e);
                    let _ = signals.send(SinkSignal::Failed(e));
                }
            }
            WriteCmd::Fragment(data) => {
                let result = match file.write_all(&data).await {
                    Ok(()) => file.flush().await,
                    Err(e) => Err(e),
                };
                busy.store(false, Ordering::Release);
                let signal = match result {
                    Ok(()) => {
                        bytes_written.fetch_add(data.len() as u64, Ordering::Relaxed);
                        SinkSignal::Ready
                    }
                    Err(e) => {
                        log::error!("FileSink: write fragment failed: {}", e);
                        SinkSignal::Failed(e)
                    }
                };
                if signals.send(signal).is_err() {
                    break;
                }
            }
        }
    }

    if let Err(e) = file.sync_all().await {
        log::warn!("FileSink: sync failed: {}", e);
    }
}
