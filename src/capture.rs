//! OpenCV-backed capture.
//!
//! [`OpenCvBackend`] opens live cameras by device index and video files by
//! path through `opencv::videoio::VideoCapture`, letting OpenCV pick the
//! capture API (`CAP_ANY`). Available only with the `opencv` feature.

use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::source::{SourceProperty, SourceSelector, VideoBackend, VideoSource};

/// Map a [`SourceProperty`] to its `CAP_PROP_*` identifier.
fn property_id(property: SourceProperty) -> i32 {
    match property {
        SourceProperty::Fps => videoio::CAP_PROP_FPS,
        SourceProperty::FrameWidth => videoio::CAP_PROP_FRAME_WIDTH,
        SourceProperty::FrameHeight => videoio::CAP_PROP_FRAME_HEIGHT,
        SourceProperty::FourCc => videoio::CAP_PROP_FOURCC,
        SourceProperty::FrameCount => videoio::CAP_PROP_FRAME_COUNT,
        SourceProperty::Bitrate => videoio::CAP_PROP_BITRATE,
        SourceProperty::CodecPixelFormat => videoio::CAP_PROP_CODEC_PIXEL_FORMAT,
        SourceProperty::Brightness => videoio::CAP_PROP_BRIGHTNESS,
        SourceProperty::Contrast => videoio::CAP_PROP_CONTRAST,
        SourceProperty::Saturation => videoio::CAP_PROP_SATURATION,
        SourceProperty::Hue => videoio::CAP_PROP_HUE,
        SourceProperty::Gain => videoio::CAP_PROP_GAIN,
        SourceProperty::Exposure => videoio::CAP_PROP_EXPOSURE,
        SourceProperty::WhiteBalanceTemperature => videoio::CAP_PROP_WB_TEMPERATURE,
        SourceProperty::Gamma => videoio::CAP_PROP_GAMMA,
        SourceProperty::Temperature => videoio::CAP_PROP_TEMPERATURE,
        SourceProperty::Zoom => videoio::CAP_PROP_ZOOM,
        SourceProperty::Focus => videoio::CAP_PROP_FOCUS,
        SourceProperty::IsoSpeed => videoio::CAP_PROP_ISO_SPEED,
        SourceProperty::Backlight => videoio::CAP_PROP_BACKLIGHT,
        SourceProperty::Pan => videoio::CAP_PROP_PAN,
        SourceProperty::Tilt => videoio::CAP_PROP_TILT,
        SourceProperty::Roll => videoio::CAP_PROP_ROLL,
        SourceProperty::Iris => videoio::CAP_PROP_IRIS,
        SourceProperty::AutoFocus => videoio::CAP_PROP_AUTOFOCUS,
        SourceProperty::AutoExposure => videoio::CAP_PROP_AUTO_EXPOSURE,
        SourceProperty::Sharpness => videoio::CAP_PROP_SHARPNESS,
        SourceProperty::Monochrome => videoio::CAP_PROP_MONOCHROME,
        SourceProperty::SampleAspectRatioNum => videoio::CAP_PROP_SAR_NUM,
        SourceProperty::SampleAspectRatioDen => videoio::CAP_PROP_SAR_DEN,
        SourceProperty::AutoWhiteBalance => videoio::CAP_PROP_AUTO_WB,
    }
}

/// Backend opening sources through `opencv::videoio::VideoCapture`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvBackend;

impl VideoBackend for OpenCvBackend {
    type Source = OpenCvSource;

    fn open(&self, selector: &SourceSelector) -> OpenCvSource {
        let capture = match selector {
            SourceSelector::Webcam(index) => VideoCapture::new(*index, videoio::CAP_ANY),
            SourceSelector::File(path) => {
                VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            }
        };
        OpenCvSource {
            capture: capture.ok(),
        }
    }
}

/// A `VideoCapture` handle adapted to the [`VideoSource`] contract.
///
/// Construction failures are folded into the not-open state; the poller
/// observes them through [`is_open`](VideoSource::is_open).
pub struct OpenCvSource {
    capture: Option<VideoCapture>,
}

impl VideoSource for OpenCvSource {
    type Frame = Mat;

    fn is_open(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(|capture| capture.is_opened().unwrap_or(false))
    }

    fn read_frame(&mut self) -> Option<Mat> {
        let capture = self.capture.as_mut()?;
        let mut frame = Mat::default();
        match capture.read(&mut frame) {
            Ok(true) if !frame.empty() => Some(frame),
            // A false read or an empty grab both mean the stream is done.
            _ => None,
        }
    }

    fn property(&self, property: SourceProperty) -> Option<f64> {
        let capture = self.capture.as_ref()?;
        capture.get(property_id(property)).ok()
    }

    fn position_millis(&self) -> f64 {
        self.capture
            .as_ref()
            .and_then(|capture| capture.get(videoio::CAP_PROP_POS_MSEC).ok())
            .unwrap_or(0.0)
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            let _ = capture.release();
        }
    }
}

impl Drop for OpenCvSource {
    fn drop(&mut self) {
        self.release();
    }
}
