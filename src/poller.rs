//! Core [`FramePoller`] implementation.
//!
//! `FramePoller` is the main entry point for the crate. It drives the read
//! loop against a [`VideoBackend`], applies the sampling stride and dispatch
//! cap, forwards sampled frames to the configured [`FrameSink`], and reports
//! the end of each run through the optional [`CompletionCallback`].
//!
//! A poller is constructed once and reused: every call to
//! [`process`](FramePoller::process) or [`query`](FramePoller::query) is an
//! independent run that resets the transient stop state, opens the source,
//! and guarantees it is released before the call returns.

use std::sync::Arc;

use chrono::Local;

use crate::control::PollControl;
use crate::error::PollError;
use crate::logging::{ConsoleLogger, LogLevel, PollLogger};
use crate::metadata::SourceInfo;
use crate::sink::{CompletionCallback, FrameContext, FrameSink, RunSummary};
use crate::source::{SourceSelector, VideoBackend, VideoSource};

/// The frame payload type produced by a backend's sources.
pub type BackendFrame<B> = <<B as VideoBackend>::Source as VideoSource>::Frame;

/// Releases a source handle on every exit path.
///
/// Sink errors propagate with `?` out of the read loop; wrapping the handle
/// in this guard keeps the release guarantee on that path too.
struct SourceGuard<S: VideoSource>(S);

impl<S: VideoSource> Drop for SourceGuard<S> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Polls a video source and dispatches sampled frames to a sink.
///
/// Created via [`FramePoller::new`] with a backend and a frame sink, then
/// configured with the builder-style `with_*` methods.
///
/// # Example
///
/// With the `opencv` feature enabled, polling every 10th webcam frame looks
/// like this:
///
/// ```text
/// let mut poller = FramePoller::new(OpenCvBackend, Arc::new(PrintFrames))
///     .with_sample_stride(10)
///     .with_max_frames(Some(100));
/// poller.process(SourceSelector::Webcam(0))?;
/// ```
///
/// The poller itself is backend-agnostic; any [`VideoBackend`] works:
///
/// ```
/// use std::sync::Arc;
///
/// use framepoll::{
///     FrameContext, FramePoller, FrameSink, PollError, SourceProperty, SourceSelector,
///     VideoBackend, VideoSource,
/// };
///
/// /// Yields three synthetic frames, then ends the stream.
/// struct ShortClip;
///
/// struct ShortClipSource {
///     remaining: u32,
///     released: bool,
/// }
///
/// impl VideoBackend for ShortClip {
///     type Source = ShortClipSource;
///     fn open(&self, _selector: &SourceSelector) -> ShortClipSource {
///         ShortClipSource { remaining: 3, released: false }
///     }
/// }
///
/// impl VideoSource for ShortClipSource {
///     type Frame = u32;
///     fn is_open(&self) -> bool {
///         !self.released
///     }
///     fn read_frame(&mut self) -> Option<u32> {
///         (self.remaining > 0).then(|| {
///             self.remaining -= 1;
///             self.remaining
///         })
///     }
///     fn property(&self, _property: SourceProperty) -> Option<f64> {
///         None
///     }
///     fn position_millis(&self) -> f64 {
///         0.0
///     }
///     fn release(&mut self) {
///         self.released = true;
///     }
/// }
///
/// struct CountFrames;
///
/// impl FrameSink<u32> for CountFrames {
///     fn on_frame(&self, _frame: &u32, context: &FrameContext<'_>) -> Result<(), PollError> {
///         assert!(context.frame_number >= 1);
///         Ok(())
///     }
/// }
///
/// let mut poller = FramePoller::new(ShortClip, Arc::new(CountFrames));
/// poller.process(SourceSelector::Webcam(0))?;
/// # Ok::<(), PollError>(())
/// ```
pub struct FramePoller<B: VideoBackend> {
    backend: B,
    sink: Arc<dyn FrameSink<BackendFrame<B>>>,
    on_finished: Option<Arc<dyn CompletionCallback>>,
    logger: Arc<dyn PollLogger>,
    sample_stride: u64,
    max_frames: Option<u64>,
    verbose: bool,
    timestamp_logs: bool,
    control: PollControl,
    active: Option<SourceSelector>,
}

impl<B: VideoBackend> FramePoller<B> {
    /// Create a poller with default settings.
    ///
    /// Defaults: every frame dispatched (stride 1), no dispatch cap, no
    /// completion callback, [`ConsoleLogger`], not verbose, no log
    /// timestamps.
    pub fn new(backend: B, sink: Arc<dyn FrameSink<BackendFrame<B>>>) -> Self {
        Self {
            backend,
            sink,
            on_finished: None,
            logger: Arc::new(ConsoleLogger),
            sample_stride: 1,
            max_frames: None,
            verbose: false,
            timestamp_logs: false,
            control: PollControl::new(),
            active: None,
        }
    }

    /// Attach a completion callback, invoked once at the end of every
    /// `process` run.
    #[must_use]
    pub fn with_completion(mut self, callback: Arc<dyn CompletionCallback>) -> Self {
        self.on_finished = Some(callback);
        self
    }

    /// Replace the logger.
    ///
    /// Pass [`SilentLogger`](crate::SilentLogger) to discard diagnostics or
    /// [`LogFacade`](crate::LogFacade) to route them through the `log`
    /// crate.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn PollLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Dispatch every Nth frame to the sink.
    ///
    /// A value of 1 (the default) dispatches every frame. Clamped to a
    /// minimum of 1.
    #[must_use]
    pub fn with_sample_stride(mut self, stride: u64) -> Self {
        self.sample_stride = stride.max(1);
        self
    }

    /// Cap the number of frames dispatched to the sink per run.
    ///
    /// `None` (the default) leaves the run unbounded; reaching the cap is a
    /// normal, successful termination.
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Enable DEBUG diagnostics and the source-info dump at open time.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Prepend a wall-clock timestamp to every log message.
    #[must_use]
    pub fn with_timestamp_logs(mut self, timestamp_logs: bool) -> Self {
        self.timestamp_logs = timestamp_logs;
        self
    }

    /// A cloneable stop/busy handle for supervisor threads and signal
    /// handlers.
    pub fn control(&self) -> PollControl {
        self.control.clone()
    }

    /// Whether the current (or last) run was asked to stop.
    ///
    /// Resets to `false` at the start of the next run.
    pub fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    /// Whether a frame sink call is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.control.is_busy()
    }

    /// Request that the current run stop.
    ///
    /// Advisory: takes effect before the next frame is read, never
    /// preempting an in-flight sink call. Also used internally by fatal
    /// paths that want to halt the loop early.
    pub fn request_stop(&self) {
        self.control.request_stop();
    }

    /// Log the interruption and stop the run.
    ///
    /// Intended for wiring to an OS interrupt signal.
    pub fn interrupt(&self) {
        self.log(LogLevel::Error, "Interrupted, exiting");
        self.request_stop();
    }

    /// The selector of the current (or last) run.
    pub fn active_selector(&self) -> Option<&SourceSelector> {
        self.active.as_ref()
    }

    /// Poll the selected source, dispatching sampled frames to the sink.
    ///
    /// Opens the source, reads frames until end of stream, a stop request,
    /// or the dispatch cap, and invokes the sink for every
    /// `sample_stride`th frame. The source is released on every exit path;
    /// the completion callback then fires with a [`RunSummary`] — also when
    /// the source failed to open (`source_opened` is `false` and the sink is
    /// never invoked).
    ///
    /// # Errors
    ///
    /// Returns a configuration error before anything is opened when the
    /// selector names a missing file or a directory. A sink error stops the
    /// run and is returned after the source has been released; the
    /// completion callback does not fire on that path.
    pub fn process(&mut self, selector: SourceSelector) -> Result<(), PollError> {
        self.control.reset();
        self.active = Some(selector.clone());
        self.check_preconditions(&selector)?;

        self.log(LogLevel::Info, &format!("Opening {selector}"));
        let mut source = SourceGuard(self.backend.open(&selector));

        let source_opened = source.0.is_open();
        let mut frames_read: u64 = 0;
        let mut frames_dispatched: u64 = 0;

        if source_opened {
            let info = SourceInfo::read_from(&source.0, selector.kind());
            if self.verbose {
                self.log(LogLevel::Info, &format!("Source info: {info}"));
            }

            while source.0.is_open() && !self.control.is_stopped() {
                let Some(frame) = source.0.read_frame() else {
                    self.log_debug("End of stream");
                    break;
                };
                frames_read += 1;

                if frames_read % self.sample_stride == 0 {
                    let context = FrameContext {
                        frame_number: frames_read,
                        position_millis: source.0.position_millis(),
                        info: &info,
                        selector: &selector,
                        control: &self.control,
                    };
                    self.control.set_busy(true);
                    let outcome = self.sink.on_frame(&frame, &context);
                    self.control.set_busy(false);
                    frames_dispatched += 1;
                    outcome?;

                    if let Some(limit) = self.max_frames {
                        if frames_dispatched >= limit {
                            self.log(
                                LogLevel::Info,
                                &format!("Reached maximum number of frames: {limit}"),
                            );
                            break;
                        }
                    }
                }
            }
        } else {
            self.log(LogLevel::Error, "Failed to open video source");
        }

        // Release before the completion callback can observe the run.
        drop(source);

        if let Some(callback) = &self.on_finished {
            callback.on_finished(&RunSummary {
                source_opened,
                frames_read,
                frames_dispatched,
                stopped: self.control.is_stopped(),
            });
        }

        Ok(())
    }

    /// Open the selected source only to collect its metadata.
    ///
    /// Same preconditions and open/release sequence as
    /// [`process`](FramePoller::process), but no frames are read and no
    /// callbacks are invoked.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before anything is opened when the
    /// selector names a missing file or a directory. A source that fails to
    /// open is logged at ERROR level and reported as `Ok(None)`.
    pub fn query(&mut self, selector: SourceSelector) -> Result<Option<SourceInfo>, PollError> {
        self.control.reset();
        self.active = Some(selector.clone());
        self.check_preconditions(&selector)?;

        self.log(LogLevel::Info, &format!("Opening {selector}"));
        let source = SourceGuard(self.backend.open(&selector));

        if !source.0.is_open() {
            self.log(LogLevel::Error, "Failed to open video source");
            return Ok(None);
        }

        Ok(Some(SourceInfo::read_from(&source.0, selector.kind())))
    }

    /// Validate the selector before any resource is opened.
    fn check_preconditions(&self, selector: &SourceSelector) -> Result<(), PollError> {
        if let SourceSelector::File(path) = selector {
            if !path.exists() {
                return Err(PollError::FileNotFound(path.clone()));
            }
            if path.is_dir() {
                return Err(PollError::NotAFile(path.clone()));
            }
        }
        Ok(())
    }

    fn log_debug(&self, message: &str) {
        if self.verbose {
            self.log(LogLevel::Debug, message);
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        if self.timestamp_logs {
            let now = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            self.logger.log(level, &format!("{now} - {message}"));
        } else {
            self.logger.log(level, message);
        }
    }
}
