// ============================================================================
// FeedSession Tests
// ============================================================================

use bytes::Bytes;

use super::{DescriptorPolicy, DrainOutcome, FeedSession, FrameOutcome, SessionOptions, StreamState};
use crate::{
    error::{FeedError, SinkError},
    frame::{CODEC_TAG, FRAGMENT_TAG},
    sink::{MediaSink, PlaybackSurface},
};

#[derive(Default)]
struct TestSurface {
    time: f64,
    end: Option<f64>,
    hidden: bool,
    plays: usize,
}

impl PlaybackSurface for TestSurface {
    fn current_time(&self) -> f64 {
        self.time
    }
    fn set_current_time(&mut self, time: f64) {
        self.time = time;
    }
    fn buffered_end(&self) -> Option<f64> {
        self.end
    }
    fn is_hidden(&self) -> bool {
        self.hidden
    }
    fn play(&mut self) {
        self.plays += 1;
    }
}

/// Behaves like a source buffer: busy from submit until `complete`.
#[derive(Default)]
struct TestSink {
    mime_types: Vec<String>,
    submitted: Vec<Bytes>,
    busy: bool,
    in_flight: usize,
    max_in_flight: usize,
    fail_submit: bool,
    surface: Option<TestSurface>,
}

impl TestSink {
    fn complete(&mut self) {
        self.busy = false;
        self.in_flight = 0;
    }
}

impl MediaSink for TestSink {
    fn initialize(&mut self, mime_type: &str) -> Result<(), SinkError> {
        self.mime_types.push(mime_type.to_string());
        Ok(())
    }

    fn submit(&mut self, fragment: Bytes) -> Result<(), SinkError> {
        if self.fail_submit {
            return Err(SinkError::Closed);
        }
        assert!(!self.busy, "submit while busy");
        self.busy = true;
        self.in_flight += 1;
        self.max_in_flight = self.max_in_flight.max(self.in_flight);
        self.submitted.push(fragment);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn surface(&mut self) -> Option<&mut dyn PlaybackSurface> {
        self.surface.as_mut().map(|s| s as &mut dyn PlaybackSurface)
    }
}

fn codec_frame(codecs: &str) -> Bytes {
    let mut raw = vec![CODEC_TAG];
    raw.extend_from_slice(codecs.as_bytes());
    Bytes::from(raw)
}

fn fragment(n: u8) -> Bytes {
    Bytes::from(vec![FRAGMENT_TAG, n, n, n])
}

fn new_session() -> FeedSession<TestSink> {
    FeedSession::new(TestSink::default(), SessionOptions::default())
}

// ------------------------------------------------------------------------
// Dispatch
// ------------------------------------------------------------------------

#[test]
fn test_codec_frame_initializes_sink() {
    let mut session = new_session();
    let outcome = session.handle_frame(codec_frame("avc1.64001f")).unwrap();

    assert!(matches!(outcome, FrameOutcome::Initialized(_)));
    assert_eq!(session.sink().mime_types, vec!["video/mp4; codecs=\"avc1.64001f\""]);
    assert_eq!(session.descriptor().unwrap().codecs(), "avc1.64001f");
    assert_eq!(session.stream_state(), StreamState::NotStarted);
}

#[test]
fn test_fragment_before_descriptor_fails_session() {
    let mut session = new_session();
    let err = session.handle_frame(fragment(1)).unwrap_err();
    assert!(matches!(err, FeedError::NotInitialized));
    assert!(session.sink().submitted.is_empty());

    let err = session.handle_frame(codec_frame("avc1.64001f")).unwrap_err();
    assert!(matches!(err, FeedError::SessionFailed(_)));
    assert!(session.sink().mime_types.is_empty());
}

#[test]
fn test_empty_frame_is_not_fatal() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    let err = session.handle_frame(Bytes::new()).unwrap_err();
    assert!(matches!(err, FeedError::EmptyFrame));
    assert!(session.failure().is_none());

    session.handle_frame(fragment(1)).unwrap();
    assert_eq!(session.sink().submitted, vec![fragment(1)]);
}

// ------------------------------------------------------------------------
// Submission and drain
// ------------------------------------------------------------------------

#[test]
fn test_first_fragment_submitted_directly() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();

    let outcome = session.handle_frame(fragment(1)).unwrap();
    assert_eq!(outcome, FrameOutcome::SubmittedDirect);
    assert_eq!(session.sink().submitted, vec![fragment(1)]);
    assert_eq!(session.stream_state(), StreamState::Streaming);
    assert_eq!(session.stats().queue_depth, 0);
}

#[test]
fn test_descriptor_then_five_fragments_same_batch() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    for n in 1..=5 {
        session.handle_frame(fragment(n)).unwrap();
    }

    // fragment 1 went straight through, the rest wait behind it
    assert_eq!(session.sink().submitted, vec![fragment(1)]);
    assert_eq!(session.stats().queue_depth, 4);

    for n in 2..=5 {
        session.sink_mut().complete();
        assert_eq!(session.on_sink_ready().unwrap(), DrainOutcome::Submitted);
        assert_eq!(session.sink().submitted.last().unwrap(), &fragment(n));
    }

    session.sink_mut().complete();
    assert_eq!(session.on_sink_ready().unwrap(), DrainOutcome::Idle);

    let expected: Vec<Bytes> = (1..=5).map(fragment).collect();
    assert_eq!(session.sink().submitted, expected);
    assert_eq!(session.sink().max_in_flight, 1);
    assert_eq!(session.stats().peak_queue_depth, 4);
}

#[test]
fn test_ready_while_busy_is_noop() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    session.handle_frame(fragment(1)).unwrap();
    session.handle_frame(fragment(2)).unwrap();

    assert_eq!(session.on_sink_ready().unwrap(), DrainOutcome::Busy);
    assert_eq!(session.sink().submitted.len(), 1);
}

#[test]
fn test_fragment_drained_immediately_when_sink_idle() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    session.handle_frame(fragment(1)).unwrap();
    session.sink_mut().complete();
    assert_eq!(session.on_sink_ready().unwrap(), DrainOutcome::Idle);

    // queue empty and sink idle: the stream stays started, the fragment
    // goes through the queue and straight out again
    let outcome = session.handle_frame(fragment(2)).unwrap();
    assert_eq!(outcome, FrameOutcome::Queued(DrainOutcome::Submitted));
    assert_eq!(session.stream_state(), StreamState::Streaming);
    assert_eq!(session.sink().submitted, vec![fragment(1), fragment(2)]);
}

#[test]
fn test_fifo_across_mixed_readiness_timing() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();

    // deterministic interleaving of arrivals and completions
    let pattern = [1, 3, 0, 2, 1, 0, 0, 4, 1, 2];
    let mut next = 0u8;
    for burst in pattern {
        for _ in 0..burst {
            session.handle_frame(fragment(next)).unwrap();
            next += 1;
        }
        session.sink_mut().complete();
        session.on_sink_ready().unwrap();
    }
    while session.stats().queue_depth > 0 {
        session.sink_mut().complete();
        session.on_sink_ready().unwrap();
    }

    let expected: Vec<Bytes> = (0..next).map(fragment).collect();
    assert_eq!(session.sink().submitted, expected);
    assert_eq!(session.sink().max_in_flight, 1);
    assert_eq!(session.stats().fragments_submitted, next as u64);
}

#[test]
fn test_sink_failure_is_fatal() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    session.handle_frame(fragment(1)).unwrap();
    session.handle_frame(fragment(2)).unwrap();
    session.sink_mut().fail_submit = true;
    session.sink_mut().complete();

    let err = session.on_sink_ready().unwrap_err();
    assert!(matches!(err, FeedError::Sink(SinkError::Closed)));
    assert!(session.failure().is_some());
    assert_eq!(session.stats().queue_depth, 0);

    let err = session.handle_frame(fragment(3)).unwrap_err();
    assert!(matches!(err, FeedError::SessionFailed(_)));
}

// ------------------------------------------------------------------------
// Descriptor policy
// ------------------------------------------------------------------------

#[test]
fn test_repeated_descriptor_ignored_by_default() {
    let mut session = new_session();
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    let outcome = session.handle_frame(codec_frame("hvc1.1.6.L93.B0")).unwrap();

    assert_eq!(outcome, FrameOutcome::DescriptorIgnored);
    assert_eq!(session.sink().mime_types.len(), 1);
    assert_eq!(session.descriptor().unwrap().codecs(), "avc1.64001f");
    assert_eq!(session.stats().descriptors_ignored, 1);
}

#[test]
fn test_repeated_descriptor_reinitialize_keeps_queue() {
    let options = SessionOptions {
        descriptor_policy: DescriptorPolicy::Reinitialize,
        ..Default::default()
    };
    let mut session = FeedSession::new(TestSink::default(), options);
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    session.handle_frame(fragment(1)).unwrap();
    session.handle_frame(fragment(2)).unwrap();

    let outcome = session.handle_frame(codec_frame("avc1.640028")).unwrap();
    assert!(matches!(outcome, FrameOutcome::Reinitialized(_)));
    assert_eq!(
        session.sink().mime_types,
        vec![
            "video/mp4; codecs=\"avc1.64001f\"",
            "video/mp4; codecs=\"avc1.640028\""
        ]
    );
    assert_eq!(session.stats().queue_depth, 1);
    assert_eq!(session.stream_state(), StreamState::Streaming);
}

#[test]
fn test_repeated_descriptor_rejected() {
    let options = SessionOptions {
        descriptor_policy: DescriptorPolicy::Reject,
        ..Default::default()
    };
    let mut session = FeedSession::new(TestSink::default(), options);
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    let err = session.handle_frame(codec_frame("avc1.640028")).unwrap_err();

    assert!(matches!(err, FeedError::DescriptorRejected(ref c) if c == "avc1.640028"));
    assert!(session.failure().is_some());
}

#[test]
fn test_descriptor_policy_from_str() {
    assert_eq!("ignore".parse::<DescriptorPolicy>(), Ok(DescriptorPolicy::Ignore));
    assert_eq!(
        "reinitialize".parse::<DescriptorPolicy>(),
        Ok(DescriptorPolicy::Reinitialize)
    );
    assert_eq!("reject".parse::<DescriptorPolicy>(), Ok(DescriptorPolicy::Reject));
    assert!("other".parse::<DescriptorPolicy>().is_err());
}

// ------------------------------------------------------------------------
// Surface recovery
// ------------------------------------------------------------------------

#[test]
fn test_ready_nudges_hidden_surface() {
    let sink = TestSink {
        surface: Some(TestSurface {
            time: 12.0,
            end: Some(50.0),
            hidden: true,
            ..Default::default()
        }),
        ..Default::default()
    };
    let mut session = FeedSession::new(sink, SessionOptions::default());
    session.handle_frame(codec_frame("avc1.64001f")).unwrap();
    session.handle_frame(fragment(1)).unwrap();
    session.sink_mut().complete();
    session.on_sink_ready().unwrap();

    let time = session.sink().surface.as_ref().unwrap().time;
    assert!((time - 49.5).abs() < 1e-9);
    assert_eq!(session.stats().nudges, 1);
}

#[test]
fn test_pause_overrun_corrected() {
    let sink = TestSink {
        surface: Some(TestSurface {
            time: 105.0,
            end: Some(100.0),
            ..Default::default()
        }),
        ..Default::default()
    };
    let mut session = FeedSession::new(sink, SessionOptions::default());

    let corrected = session.on_pause().unwrap();
    assert!((corrected - 99.9).abs() < 1e-9);
    let surface = session.sink().surface.as_ref().unwrap();
    assert_eq!(surface.plays, 1);
    assert_eq!(session.stats().pause_corrections, 1);
}

#[test]
fn test_pause_without_surface() {
    let mut session = new_session();
    assert!(session.on_pause().is_none());
}
