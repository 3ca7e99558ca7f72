//! Per-tick render frames.

use std::time::Duration;

/// Inputs every renderer sees on a tick besides the sample buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Monotonic time of this tick
    pub now: Duration,
    /// Whether the player reports playback
    pub playing: bool,
    /// Intensity of the active beat, 0.0 when none
    pub beat_intensity: f32,
}

impl Default for TickContext {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            playing: true,
            beat_intensity: 0.0,
        }
    }
}

impl TickContext {
    pub fn new(now: Duration, playing: bool) -> Self {
        Self {
            now,
            playing,
            beat_intensity: 0.0,
        }
    }

    pub fn with_beat(mut self, intensity: f32) -> Self {
        self.beat_intensity = intensity.clamp(0.0, 1.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bar heights and peak markers in buffer units (`floor..=max`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BarFrame {
    pub heights: Vec<f32>,
    pub peaks: Vec<f32>,
    pub max: f32,
}

/// Polyline across the display width; `y` is offset from the centre line.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WaveformFrame {
    pub points: Vec<Point>,
}

/// Normalized level and peak marker of one meter channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ChannelLevel {
    pub level: f32,
    pub peak: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StereoFrame {
    pub left: ChannelLevel,
    pub right: ChannelLevel,
}

/// One bar of a radial burst.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Spoke {
    /// Radians in screen coordinates (y down); the first spoke points up
    pub angle: f32,
    /// Distance from the centre where the spoke starts
    pub inner: f32,
    /// Radial length beyond `inner`
    pub length: f32,
    /// Angular width in radians
    pub width: f32,
}

impl Spoke {
    /// Outer end of the spoke relative to `center`.
    pub fn tip(&self, center: Point) -> Point {
        let r = self.inner + self.length;
        Point::new(center.x + r * self.angle.cos(), center.y + r * self.angle.sin())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RadialFrame {
    pub center: Point,
    pub spokes: Vec<Spoke>,
}

/// The frame a renderer produced on this tick, borrowed from the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderFrame<'a> {
    Bars(&'a BarFrame),
    Waveform(&'a WaveformFrame),
    Stereo(&'a StereoFrame),
    Radial(&'a RadialFrame),
}

impl<'a> RenderFrame<'a> {
    pub fn as_bars(self) -> Option<&'a BarFrame> {
        match self {
            RenderFrame::Bars(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_waveform(self) -> Option<&'a WaveformFrame> {
        match self {
            RenderFrame::Waveform(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_stereo(self) -> Option<&'a StereoFrame> {
        match self {
            RenderFrame::Stereo(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_radial(self) -> Option<&'a RadialFrame> {
        match self {
            RenderFrame::Radial(frame) => Some(frame),
            _ => None,
        }
    }
}
