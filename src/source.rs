//! The video source contract.
//!
//! A [`FramePoller`](crate::FramePoller) never talks to a capture library
//! directly. It is handed a [`VideoBackend`], asks it to open a
//! [`SourceSelector`], and drives the resulting [`VideoSource`] handle
//! through the read loop. The crate ships an OpenCV-backed implementation
//! behind the `opencv` feature; tests substitute scripted in-memory sources.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use crate::error::PollError;

/// Identifies the video source for a single run.
///
/// Exactly one of a live camera device or a video file — the enum makes the
/// "neither" and "both" misconfigurations of the underlying capture APIs
/// unrepresentable. Callers working from optional arguments (a CLI, a config
/// file) go through [`SourceSelector::from_options`], which reports those
/// cases as configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    /// A live camera, addressed by device index.
    Webcam(i32),
    /// A video file on disk.
    File(PathBuf),
}

impl SourceSelector {
    /// Build a selector from a pair of optional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::NoSourceSelected`] when both arguments are
    /// `None` and [`PollError::AmbiguousSource`] when both are `Some`.
    pub fn from_options(
        webcam: Option<i32>,
        video_file: Option<PathBuf>,
    ) -> Result<Self, PollError> {
        match (webcam, video_file) {
            (None, None) => Err(PollError::NoSourceSelected),
            (Some(_), Some(_)) => Err(PollError::AmbiguousSource),
            (Some(index), None) => Ok(SourceSelector::Webcam(index)),
            (None, Some(path)) => Ok(SourceSelector::File(path)),
        }
    }

    /// Whether this selector names a live device or a file.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceSelector::Webcam(_) => SourceKind::Device,
            SourceSelector::File(_) => SourceKind::File,
        }
    }
}

impl Display for SourceSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelector::Webcam(index) => write!(f, "webcam {index}"),
            SourceSelector::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// The two flavors of video source.
///
/// Decides which property set [`SourceInfo`](crate::SourceInfo) collects:
/// devices expose the extended camera-control set, files expose stream
/// statistics such as frame count and bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A live camera device.
    Device,
    /// A video file.
    File,
}

/// Named properties a [`VideoSource`] can be queried for.
///
/// The namespace is fixed; backends map each variant to their own property
/// identifiers and report [`None`] for properties they cannot query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SourceProperty {
    /// Frames per second.
    Fps,
    /// Frame width in pixels.
    FrameWidth,
    /// Frame height in pixels.
    FrameHeight,
    /// Codec identifier as a packed FOURCC integer.
    FourCc,
    /// Total frame count (file sources).
    FrameCount,
    /// Stream bitrate (file sources).
    Bitrate,
    /// Pixel format as a packed FOURCC integer (file sources).
    CodecPixelFormat,
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Gain,
    Exposure,
    WhiteBalanceTemperature,
    Gamma,
    Temperature,
    Zoom,
    Focus,
    IsoSpeed,
    Backlight,
    Pan,
    Tilt,
    Roll,
    Iris,
    AutoFocus,
    AutoExposure,
    Sharpness,
    Monochrome,
    SampleAspectRatioNum,
    SampleAspectRatioDen,
    AutoWhiteBalance,
}

/// Opens video sources.
///
/// The backend is the injected collaborator that knows how to turn a
/// [`SourceSelector`] into a live capture handle. Opening is infallible by
/// contract: a selector that cannot be opened yields a handle whose
/// [`is_open`](VideoSource::is_open) reports `false`, which the poller treats
/// as a recoverable condition rather than an error.
pub trait VideoBackend {
    /// The handle type this backend produces.
    type Source: VideoSource;

    /// Open the selected source.
    fn open(&self, selector: &SourceSelector) -> Self::Source;
}

/// A handle on an opened (or failed-to-open) video source.
///
/// The poller owns the handle for exactly one run and guarantees
/// [`release`](VideoSource::release) is called on every exit path, so
/// implementations must tolerate release on a handle that never opened or
/// was already released.
pub trait VideoSource {
    /// The frame payload this source produces.
    type Frame: 'static;

    /// Whether the handle is usable for reading.
    fn is_open(&self) -> bool;

    /// Read the next frame.
    ///
    /// `None` signals end of stream or a read failure; the poller ends the
    /// read loop without treating either as an error.
    fn read_frame(&mut self) -> Option<Self::Frame>;

    /// Query a named property, or `None` if the backend cannot report it.
    fn property(&self, property: SourceProperty) -> Option<f64>;

    /// Current playback position in milliseconds.
    fn position_millis(&self) -> f64;

    /// Release the underlying capture resource.
    ///
    /// Must be idempotent and safe on a never-opened handle.
    fn release(&mut self);
}
