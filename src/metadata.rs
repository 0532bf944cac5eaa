//! Source metadata types.
//!
//! This module defines [`SourceInfo`], the string-keyed property mapping
//! collected when a source is opened, and [`PropertyValue`], the closed set
//! of value shapes a property can take. The mapping is what
//! [`FramePoller::query`](crate::FramePoller::query) returns and what sinks
//! see through [`FrameContext::info`](crate::FrameContext).

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use crate::fourcc::decode_fourcc;
use crate::source::{SourceKind, SourceProperty, VideoSource};

/// Extended control properties collected for live devices only.
const DEVICE_CONTROLS: &[(&str, SourceProperty)] = &[
    ("brightness", SourceProperty::Brightness),
    ("contrast", SourceProperty::Contrast),
    ("saturation", SourceProperty::Saturation),
    ("hue", SourceProperty::Hue),
    ("gain", SourceProperty::Gain),
    ("exposure", SourceProperty::Exposure),
    (
        "white_balance_temperature",
        SourceProperty::WhiteBalanceTemperature,
    ),
    ("gamma", SourceProperty::Gamma),
    ("temperature", SourceProperty::Temperature),
    ("zoom", SourceProperty::Zoom),
    ("focus", SourceProperty::Focus),
    ("iso_speed", SourceProperty::IsoSpeed),
    ("backlight", SourceProperty::Backlight),
    ("pan", SourceProperty::Pan),
    ("tilt", SourceProperty::Tilt),
    ("roll", SourceProperty::Roll),
    ("iris", SourceProperty::Iris),
    ("auto_focus", SourceProperty::AutoFocus),
    ("auto_exposure", SourceProperty::AutoExposure),
    ("sharpness", SourceProperty::Sharpness),
    ("monochrome", SourceProperty::Monochrome),
    (
        "sample_aspect_ratio_num",
        SourceProperty::SampleAspectRatioNum,
    ),
    (
        "sample_aspect_ratio_den",
        SourceProperty::SampleAspectRatioDen,
    ),
    ("auto_white_balance", SourceProperty::AutoWhiteBalance),
];

/// A single metadata value.
///
/// Properties are numeric at the capture layer; the two FOURCC-coded entries
/// (`codec`, `pixel_format`) are decoded to text before they land in the
/// mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A numeric property, as reported by the backend.
    Number(f64),
    /// A decoded textual property.
    Text(String),
}

impl PropertyValue {
    /// The numeric value, if this is a [`PropertyValue::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(value) => Some(*value),
            PropertyValue::Text(_) => None,
        }
    }

    /// The textual value, if this is a [`PropertyValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Number(_) => None,
            PropertyValue::Text(text) => Some(text),
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(value) => write!(f, "{value}"),
            PropertyValue::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Metadata collected from an opened source.
///
/// An ordered mapping from property name to [`PropertyValue`]. Every source
/// contributes `fps`, `width`, `height`, and `codec`; device sources add the
/// extended camera-control set, file sources add `frame_count`, `bitrate`,
/// and `pixel_format`. Properties the backend cannot query are omitted
/// rather than recorded as sentinel numbers.
///
/// # Example
///
/// ```
/// use framepoll::{SourceInfo, SourceKind, SourceProperty, VideoSource};
///
/// struct Still;
///
/// impl VideoSource for Still {
///     type Frame = ();
///     fn is_open(&self) -> bool { true }
///     fn read_frame(&mut self) -> Option<()> { None }
///     fn property(&self, property: SourceProperty) -> Option<f64> {
///         matches!(property, SourceProperty::Fps).then_some(30.0)
///     }
///     fn position_millis(&self) -> f64 { 0.0 }
///     fn release(&mut self) {}
/// }
///
/// let info = SourceInfo::read_from(&Still, SourceKind::Device);
/// assert_eq!(info.fps(), Some(30.0));
/// assert!(!info.contains("frame_count"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct SourceInfo {
    entries: BTreeMap<&'static str, PropertyValue>,
}

impl SourceInfo {
    /// Collect metadata from an opened source.
    ///
    /// `kind` decides whether the device-control set or the file statistics
    /// are gathered on top of the common properties.
    pub fn read_from<S: VideoSource>(source: &S, kind: SourceKind) -> Self {
        let mut info = SourceInfo::default();

        info.put_number("fps", source.property(SourceProperty::Fps));
        info.put_number("width", source.property(SourceProperty::FrameWidth));
        info.put_number("height", source.property(SourceProperty::FrameHeight));
        info.put_fourcc("codec", source.property(SourceProperty::FourCc));

        match kind {
            SourceKind::Device => {
                for &(key, property) in DEVICE_CONTROLS {
                    info.put_number(key, source.property(property));
                }
            }
            SourceKind::File => {
                info.put_number("frame_count", source.property(SourceProperty::FrameCount));
                info.put_number("bitrate", source.property(SourceProperty::Bitrate));
                info.put_fourcc(
                    "pixel_format",
                    source.property(SourceProperty::CodecPixelFormat),
                );
            }
        }

        info
    }

    fn put_number(&mut self, key: &'static str, value: Option<f64>) {
        if let Some(value) = value {
            self.entries.insert(key, PropertyValue::Number(value));
        }
    }

    fn put_fourcc(&mut self, key: &'static str, value: Option<f64>) {
        if let Some(value) = value {
            let decoded = decode_fourcc(value as u32);
            self.entries.insert(key, PropertyValue::Text(decoded));
        }
    }

    /// Look up a property by name.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// Look up a numeric property by name.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(PropertyValue::as_number)
    }

    /// Look up a textual property by name.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropertyValue::as_text)
    }

    /// Frames per second, if reported.
    pub fn fps(&self) -> Option<f64> {
        self.number("fps")
    }

    /// Frame width in pixels, if reported.
    pub fn width(&self) -> Option<f64> {
        self.number("width")
    }

    /// Frame height in pixels, if reported.
    pub fn height(&self) -> Option<f64> {
        self.number("height")
    }

    /// Decoded codec FOURCC, if reported.
    pub fn codec(&self) -> Option<&str> {
        self.text("codec")
    }

    /// Total frame count, if reported (file sources).
    pub fn frame_count(&self) -> Option<f64> {
        self.number("frame_count")
    }

    /// Whether a property with this name was collected.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over the collected properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PropertyValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Number of collected properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no properties were collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for SourceInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}
