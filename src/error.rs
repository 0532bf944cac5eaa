//! Error types for the `framepoll` crate.
//!
//! This module defines [`PollError`], the unified error type returned by all
//! fallible operations in the crate. Configuration errors carry the offending
//! path so callers can report the problem without additional context.
//!
//! Note that a source that fails to *open* is not an error: the run completes
//! normally and the failure is reported through the ERROR log and the
//! [`RunSummary`](crate::RunSummary) handed to the completion callback.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `framepoll` operations.
///
/// Every public method that can fail returns `Result<T, PollError>`.
/// Configuration variants are produced by the precondition checks that run
/// before any capture resource is opened.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PollError {
    /// Neither a webcam index nor a video file was supplied.
    #[error("No video source selected: supply a webcam index or a video file")]
    NoSourceSelected,

    /// Both a webcam index and a video file were supplied.
    #[error("Ambiguous video source: supply either a webcam index or a video file, not both")]
    AmbiguousSource,

    /// The selected video file does not exist.
    #[error("Video file does not exist: {0}")]
    FileNotFound(PathBuf),

    /// The selected video file path points at a directory.
    #[error("Video file points to a directory: {0}")]
    NotAFile(PathBuf),

    /// A frame sink reported a failure while handling a frame.
    ///
    /// The run stops, the source is released, and the error surfaces to the
    /// caller of [`process`](crate::FramePoller::process).
    #[error("Frame sink failed: {message}")]
    Sink {
        /// Description of the failure, supplied by the sink.
        message: String,
    },

    /// An I/O error occurred (typically from a sink writing output files).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl PollError {
    /// Build a [`PollError::Sink`] from anything displayable.
    ///
    /// Convenience for sink implementations wrapping their own failures.
    pub fn sink(message: impl std::fmt::Display) -> Self {
        PollError::Sink {
            message: message.to_string(),
        }
    }

    /// Returns `true` for errors raised by the pre-run configuration checks.
    ///
    /// Configuration errors are never retried and always surface before any
    /// capture resource has been opened.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PollError::NoSourceSelected
                | PollError::AmbiguousSource
                | PollError::FileNotFound(_)
                | PollError::NotAFile(_)
        )
    }
}
