use bytes::Bytes;

use crate::{
    error::{FeedError, FeedResult},
    frame::{CodecDescriptor, Frame},
    queue::FragmentQueue,
    recovery::{RecoveryConfig, StallRecovery},
    sink::MediaSink,
};

/// What to do with a codec descriptor arriving after the sink was initialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DescriptorPolicy {
    /// Keep the first descriptor, count and log the repeat.
    #[default]
    Ignore,
    /// Initialize the sink again; queued fragments are kept.
    Reinitialize,
    /// Fail the session.
    Reject,
}

impl std::str::FromStr for DescriptorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "reinitialize" => Ok(Self::Reinitialize),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown descriptor policy: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SessionOptions {
    pub descriptor_policy: DescriptorPolicy,
    pub recovery: RecoveryConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// No fragment submitted yet; the next one bypasses the queue.
    NotStarted,
    Streaming,
}

/// Result of one drain step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Sink still processing; nothing submitted.
    Busy,
    /// Head of the queue submitted.
    Submitted,
    /// Sink idle and nothing pending.
    Idle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Initialized(CodecDescriptor),
    Reinitialized(CodecDescriptor),
    DescriptorIgnored,
    SubmittedDirect,
    Queued(DrainOutcome),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_received: u64,
    pub fragments_received: u64,
    pub fragments_submitted: u64,
    pub descriptors_ignored: u64,
    pub queue_depth: usize,
    pub peak_queue_depth: usize,
    pub nudges: u64,
    pub pause_corrections: u64,
}

/// Per-connection feed state: dispatches frames and drains the fragment
/// queue into the sink one submission at a time.
pub struct FeedSession<S> {
    sink: S,
    queue: FragmentQueue,
    stream: StreamState,
    descriptor: Option<CodecDescriptor>,
    policy: DescriptorPolicy,
    recovery: StallRecovery,
    stats: SessionStats,
    failure: Option<String>,
}

impl<S: MediaSink> FeedSession<S> {
    pub fn new(sink: S, options: SessionOptions) -> Self {
        Self {
            sink,
            queue: FragmentQueue::new(),
            stream: StreamState::NotStarted,
            descriptor: None,
            policy: options.descriptor_policy,
            recovery: StallRecovery::new(options.recovery),
            stats: SessionStats::default(),
            failure: None,
        }
    }

    /// Classify one transport frame and act on it.
    pub fn handle_frame(&mut self, data: Bytes) -> FeedResult<FrameOutcome> {
        self.ensure_alive()?;
        self.stats.frames_received += 1;
        let result = match Frame::parse(data) {
            Ok(Frame::Codec(descriptor)) => self.on_descriptor(descriptor),
            Ok(Frame::Fragment(fragment)) => self.submit_fragment(fragment),
            Err(e) => Err(e),
        };
        self.check(result)
    }

    /// Readiness signal from the sink: drain the next fragment, then keep a
    /// hidden surface near the buffered edge.
    pub fn on_sink_ready(&mut self) -> FeedResult<DrainOutcome> {
        self.ensure_alive()?;
        let result = self.drain();
        let outcome = self.check(result)?;

        if let Some(surface) = self.sink.surface() {
            if self.recovery.nudge_if_hidden(surface).is_some() {
                self.stats.nudges += 1;
            }
        }
        Ok(outcome)
    }

    /// Pause event from the surface. Returns the corrected position, if any.
    pub fn on_pause(&mut self) -> Option<f64> {
        let surface = self.sink.surface()?;
        let corrected = self.recovery.correct_pause_overrun(surface);
        if corrected.is_some() {
            self.stats.pause_corrections += 1;
        }
        corrected
    }

    fn on_descriptor(&mut self, descriptor: CodecDescriptor) -> FeedResult<FrameOutcome> {
        if self.descriptor.is_none() {
            let mime_type = descriptor.mime_type();
            self.sink.initialize(&mime_type)?;
            log::info!("Feed: sink initialized with {}", mime_type);
            self.descriptor = Some(descriptor.clone());
            return Ok(FrameOutcome::Initialized(descriptor));
        }

        match self.policy {
            DescriptorPolicy::Ignore => {
                self.stats.descriptors_ignored += 1;
                log::warn!("Feed: ignoring repeated codec descriptor {}", descriptor);
                Ok(FrameOutcome::DescriptorIgnored)
            }
            DescriptorPolicy::Reinitialize => {
                let mime_type = descriptor.mime_type();
                self.sink.initialize(&mime_type)?;
                log::info!("Feed: sink reinitialized with {}", mime_type);
                self.descriptor = Some(descriptor.clone());
                Ok(FrameOutcome::Reinitialized(descriptor))
            }
            DescriptorPolicy::Reject => {
                Err(FeedError::DescriptorRejected(descriptor.codecs().to_string()))
            }
        }
    }

    fn submit_fragment(&mut self, fragment: Bytes) -> FeedResult<FrameOutcome> {
        if self.descriptor.is_none() {
            return Err(FeedError::NotInitialized);
        }
        self.stats.fragments_received += 1;

        match self.stream {
            StreamState::NotStarted => {
                self.sink.submit(fragment)?;
                self.stats.fragments_submitted += 1;
                self.stream = StreamState::Streaming;
                log::debug!("Feed: first fragment submitted");
                Ok(FrameOutcome::SubmittedDirect)
            }
            StreamState::Streaming => {
                self.queue.push(fragment);
                Ok(FrameOutcome::Queued(self.drain()?))
            }
        }
    }

    /// The single queue transition, shared by submission and readiness.
    fn drain(&mut self) -> FeedResult<DrainOutcome> {
        if self.sink.is_busy() {
            return Ok(DrainOutcome::Busy);
        }
        match self.queue.pop() {
            Some(fragment) => {
                self.sink.submit(fragment)?;
                self.stats.fragments_submitted += 1;
                Ok(DrainOutcome::Submitted)
            }
            None => Ok(DrainOutcome::Idle),
        }
    }

    fn ensure_alive(&self) -> FeedResult<()> {
        match &self.failure {
            Some(reason) => Err(FeedError::SessionFailed(reason.clone())),
            None => Ok(()),
        }
    }

    fn check<T>(&mut self, result: FeedResult<T>) -> FeedResult<T> {
        if let Err(e) = &result {
            if e.is_fatal() {
                let dropped = self.queue.clear();
                log::error!("Feed: session failed: {}, dropped {} queued fragments", e, dropped);
                self.failure = Some(e.to_string());
            }
        }
        result
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            queue_depth: self.queue.len(),
            peak_queue_depth: self.queue.peak(),
            ..self.stats
        }
    }

    pub fn descriptor(&self) -> Option<&CodecDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn stream_state(&self) -> StreamState {
        self.stream
    }

    pub fn is_sink_busy(&self) -> bool {
        self.sink.is_busy()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
