//! Caller capability interfaces.
//!
//! Per-frame logic is supplied as a [`FrameSink`] implementation — any type
//! with an `on_frame` method — rather than a bare function pointer, so the
//! callback signature is checked statically and caller state lives on the
//! sink itself. An optional [`CompletionCallback`] observes the end of every
//! `process` run.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! use framepoll::{FrameContext, FrameSink, PollError};
//!
//! /// Counts sampled frames and stops the run after ten of them.
//! #[derive(Default)]
//! struct TenFrames {
//!     seen: AtomicU64,
//! }
//!
//! impl<F> FrameSink<F> for TenFrames {
//!     fn on_frame(&self, _frame: &F, context: &FrameContext<'_>) -> Result<(), PollError> {
//!         if self.seen.fetch_add(1, Ordering::SeqCst) + 1 >= 10 {
//!             context.request_stop();
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::control::PollControl;
use crate::error::PollError;
use crate::metadata::SourceInfo;
use crate::source::SourceSelector;

/// Per-frame data handed to a [`FrameSink`].
///
/// Carries everything a sink needs about the frame and the run: the 1-based
/// frame number (counted over all frames read, independent of the sampling
/// stride), the source's playback position, the metadata collected when the
/// source was opened, and a way to stop the run.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// 1-based number of the frame being dispatched.
    pub frame_number: u64,
    /// The source's playback position in milliseconds.
    pub position_millis: f64,
    /// Metadata collected when the source was opened.
    pub info: &'a SourceInfo,
    /// The selector this run was started with.
    pub selector: &'a SourceSelector,
    pub(crate) control: &'a PollControl,
}

impl FrameContext<'_> {
    /// Request that the run stop after this sink call returns.
    ///
    /// The poller observes the request before reading the next frame; no
    /// further frames are read or dispatched.
    pub fn request_stop(&self) {
        self.control.request_stop();
    }
}

/// Trait for receiving sampled frames.
///
/// `F` is the frame payload type produced by the backend (`opencv::core::Mat`
/// for the OpenCV backend). Implementations must be [`Send`] and [`Sync`];
/// mutable caller state goes in atomics, mutexes, or channels on the sink.
///
/// Returning an error stops the run: the source is released, the completion
/// callback is **not** invoked, and the error surfaces from
/// [`process`](crate::FramePoller::process).
pub trait FrameSink<F>: Send + Sync {
    /// Handle one sampled frame.
    fn on_frame(&self, frame: &F, context: &FrameContext<'_>) -> Result<(), PollError>;
}

/// What happened during one `process` run.
///
/// Delivered to the [`CompletionCallback`] after the source has been
/// released.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Whether the source opened successfully.
    pub source_opened: bool,
    /// Total frames read from the source, independent of sampling.
    pub frames_read: u64,
    /// Frames dispatched to the sink.
    pub frames_dispatched: u64,
    /// Whether the run ended because a stop was requested.
    pub stopped: bool,
}

/// Trait for observing the end of a `process` run.
///
/// Invoked exactly once per run — on the open-failure path as well as every
/// normal loop exit — after the source handle has been released.
pub trait CompletionCallback: Send + Sync {
    /// Handle the end of a run.
    fn on_finished(&self, summary: &RunSummary);
}
