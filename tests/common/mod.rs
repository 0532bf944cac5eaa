//! Shared test doubles: a scripted in-memory video backend plus recording
//! sink, completion, and logger implementations.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use framepoll::{
    CompletionCallback, FrameContext, FrameSink, LogLevel, PollControl, PollError, PollLogger,
    RunSummary, SourceProperty, SourceSelector, VideoBackend, VideoSource, encode_fourcc,
};

/// Scripted frames carry their own 1-based index as payload.
pub type TestFrame = u64;

/// Backend yielding a fixed number of synthetic frames per run.
///
/// Every `open` produces a fresh source; the shared `release_count` records
/// how many times sources were released, so tests can assert the poller's
/// release guarantee.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    pub frames: u64,
    pub fail_open: bool,
    pub release_count: Arc<AtomicU64>,
    pub open_count: Arc<AtomicU64>,
}

impl ScriptedBackend {
    pub fn with_frames(frames: u64) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }
}

impl VideoBackend for ScriptedBackend {
    type Source = ScriptedSource;

    fn open(&self, _selector: &SourceSelector) -> ScriptedSource {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        ScriptedSource {
            open: !self.fail_open,
            frames: self.frames,
            next: 0,
            release_count: Arc::clone(&self.release_count),
        }
    }
}

/// Millisecond step between scripted frames (25 fps).
pub const FRAME_STEP_MILLIS: f64 = 40.0;

pub struct ScriptedSource {
    open: bool,
    frames: u64,
    next: u64,
    release_count: Arc<AtomicU64>,
}

impl VideoSource for ScriptedSource {
    type Frame = TestFrame;

    fn is_open(&self) -> bool {
        self.open
    }

    fn read_frame(&mut self) -> Option<TestFrame> {
        if self.next < self.frames {
            self.next += 1;
            Some(self.next)
        } else {
            None
        }
    }

    fn property(&self, property: SourceProperty) -> Option<f64> {
        match property {
            SourceProperty::Fps => Some(25.0),
            SourceProperty::FrameWidth => Some(640.0),
            SourceProperty::FrameHeight => Some(480.0),
            SourceProperty::FourCc => Some(f64::from(encode_fourcc(b"MJPG"))),
            SourceProperty::FrameCount => Some(self.frames as f64),
            SourceProperty::Bitrate => Some(2_000.0),
            SourceProperty::CodecPixelFormat => Some(f64::from(encode_fourcc(b"I420"))),
            // One deliberately unsupported control, to exercise omission.
            SourceProperty::IsoSpeed => None,
            _ => Some(1.0),
        }
    }

    fn position_millis(&self) -> f64 {
        self.next as f64 * FRAME_STEP_MILLIS
    }

    fn release(&mut self) {
        self.open = false;
        self.release_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records every dispatch; optionally stops the run or fails at a given
/// frame number.
#[derive(Default)]
pub struct CollectingSink {
    pub frames: Mutex<Vec<u64>>,
    pub positions: Mutex<Vec<f64>>,
    pub stop_at: Option<u64>,
    pub fail_at: Option<u64>,
    /// When set, asserts the busy flag is raised for the extent of the call.
    pub busy_probe: Mutex<Option<PollControl>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stopping_at(frame_number: u64) -> Arc<Self> {
        Arc::new(Self {
            stop_at: Some(frame_number),
            ..Self::default()
        })
    }

    pub fn failing_at(frame_number: u64) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some(frame_number),
            ..Self::default()
        })
    }

    pub fn dispatched(&self) -> Vec<u64> {
        self.frames.lock().unwrap().clone()
    }
}

impl FrameSink<TestFrame> for CollectingSink {
    fn on_frame(&self, frame: &TestFrame, context: &FrameContext<'_>) -> Result<(), PollError> {
        assert_eq!(
            *frame, context.frame_number,
            "scripted payload must match the frame counter"
        );

        if let Some(control) = self.busy_probe.lock().unwrap().as_ref() {
            assert!(control.is_busy(), "busy flag must be set during dispatch");
        }

        self.frames.lock().unwrap().push(context.frame_number);
        self.positions.lock().unwrap().push(context.position_millis);

        if self.stop_at == Some(context.frame_number) {
            context.request_stop();
        }
        if self.fail_at == Some(context.frame_number) {
            return Err(PollError::sink("scripted sink failure"));
        }
        Ok(())
    }
}

/// Records run summaries; optionally snapshots a release counter at
/// completion time to verify release-before-completion ordering.
#[derive(Default)]
pub struct CompletionRecorder {
    pub summaries: Mutex<Vec<RunSummary>>,
    pub release_counter: Option<Arc<AtomicU64>>,
    pub releases_at_completion: Mutex<Vec<u64>>,
}

impl CompletionRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn watching_releases(counter: Arc<AtomicU64>) -> Arc<Self> {
        Arc::new(Self {
            release_counter: Some(counter),
            ..Self::default()
        })
    }

    pub fn single_summary(&self) -> RunSummary {
        let summaries = self.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1, "expected exactly one completion");
        summaries[0].clone()
    }
}

impl CompletionCallback for CompletionRecorder {
    fn on_finished(&self, summary: &RunSummary) {
        if let Some(counter) = &self.release_counter {
            self.releases_at_completion
                .lock()
                .unwrap()
                .push(counter.load(Ordering::SeqCst));
        }
        self.summaries.lock().unwrap().push(summary.clone());
    }
}

/// Captures log lines with their levels.
#[derive(Default)]
pub struct RecordingLogger {
    pub lines: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl PollLogger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}
