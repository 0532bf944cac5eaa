//! # framepoll
//!
//! Poll frames from cameras and video files and dispatch them to pluggable
//! frame sinks.
//!
//! `framepoll` wraps a video-capture backend in a small, callback-driven
//! polling loop: open a source, read frames sequentially, hand every Nth
//! frame to a caller-supplied [`FrameSink`], stop on end of stream, on a
//! dispatch cap, or on an advisory stop request, and report the outcome
//! through an optional [`CompletionCallback`]. A separate
//! [`query`](FramePoller::query) operation opens a source only to collect
//! its metadata.
//!
//! ## Quick Start
//!
//! Requires the `opencv` feature:
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use framepoll::capture::OpenCvBackend;
//! use framepoll::{FrameContext, FramePoller, FrameSink, PollError, SourceSelector};
//! use opencv::core::Mat;
//!
//! struct PrintFrames;
//!
//! impl FrameSink<Mat> for PrintFrames {
//!     fn on_frame(&self, _frame: &Mat, context: &FrameContext<'_>) -> Result<(), PollError> {
//!         println!("frame #{} @ {:.0} ms", context.frame_number, context.position_millis);
//!         Ok(())
//!     }
//! }
//!
//! let mut poller = FramePoller::new(OpenCvBackend, Arc::new(PrintFrames))
//!     .with_sample_stride(10)
//!     .with_max_frames(Some(100));
//!
//! // Poll the default webcam...
//! poller.process(SourceSelector::Webcam(0))?;
//!
//! // ...or a video file.
//! poller.process(SourceSelector::File("input.mp4".into()))?;
//! # Ok::<(), PollError>(())
//! ```
//!
//! ## Features
//!
//! - **Sampling** — dispatch every Nth frame
//!   ([`with_sample_stride`](FramePoller::with_sample_stride)); frame
//!   numbers stay 1-based over all frames read
//! - **Dispatch cap** — bound the frames handed to the sink per run
//!   ([`with_max_frames`](FramePoller::with_max_frames))
//! - **Cooperative stop** — [`PollControl`] handles for supervisor threads
//!   and signal handlers; sinks stop runs through
//!   [`FrameContext::request_stop`]
//! - **Metadata** — [`SourceInfo`] mapping (fps, dimensions, FOURCC codec,
//!   device controls or file statistics) from
//!   [`query`](FramePoller::query) or inside every frame dispatch
//! - **Guaranteed release** — the source handle is released on every exit
//!   path, including sink errors
//! - **Injected logging** — [`PollLogger`] with console, `log`-crate, and
//!   silent implementations; per-message wall-clock timestamps
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `opencv` | [`capture::OpenCvBackend`] over `opencv::videoio::VideoCapture` |
//! | `cli` | The `framepoll` command-line binary (implies `opencv`) |
//! | `full` | Enables all of the above |
//!
//! Without the `opencv` feature the crate is backend-agnostic: implement
//! [`VideoBackend`] and [`VideoSource`] over any capture library.

#[cfg(feature = "opencv")]
pub mod capture;
pub mod control;
pub mod error;
pub mod fourcc;
pub mod logging;
pub mod metadata;
pub mod poller;
pub mod sink;
pub mod source;

#[cfg(feature = "opencv")]
pub use capture::{OpenCvBackend, OpenCvSource};
pub use control::PollControl;
pub use error::PollError;
pub use fourcc::{decode_fourcc, encode_fourcc};
pub use logging::{ConsoleLogger, LogFacade, LogLevel, PollLogger, SilentLogger};
pub use metadata::{PropertyValue, SourceInfo};
pub use poller::{BackendFrame, FramePoller};
pub use sink::{CompletionCallback, FrameContext, FrameSink, RunSummary};
pub use source::{SourceKind, SourceProperty, SourceSelector, VideoBackend, VideoSource};
