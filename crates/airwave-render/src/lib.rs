//! # Airwave Render
//!
//! Renderers that turn analyser port buffers into per-tick frames.
//!
//! Every renderer implements [`SignalRenderer`]: given the latest
//! [`SampleBuffer`](airwave_core::SampleBuffer) it smooths toward the new
//! values and returns a borrowed [`RenderFrame`]. When no port can be
//! obtained the same renderer is driven by a [`FallbackAnimator`] instead,
//! so a widget always has something to draw.
//!
//! - **[`BarSpectrum`]**: vertical bars with gain curve, floor and peak hold
//! - **[`Oscilloscope`]**: time-domain polyline
//! - **[`StereoMeter`]**: two level meters with independent gain and peaks
//! - **[`RadialBurst`]**: bars around a centre, pulsing with beat intensity
//!
//! ## Example
//!
//! ```rust
//! use airwave_core::SampleBuffer;
//! use airwave_render::{BarSpectrum, BarSpectrumConfig, RenderFrame, SignalRenderer, TickContext};
//!
//! let mut bars = BarSpectrum::new(BarSpectrumConfig::default()).expect("valid config");
//! let silence = SampleBuffer::frequency(vec![0; 256]);
//!
//! if let RenderFrame::Bars(frame) = bars.produce_frame(&silence, &TickContext::default()) {
//!     assert!(frame.heights.iter().all(|&h| h == 4.0));
//! }
//! ```

mod bars;
mod fallback;
mod frame;
mod radial;
mod renderer;
pub mod smoothing;
mod stereo;
mod waveform;

pub use bars::{BarSpectrum, BarSpectrumConfig};
pub use fallback::{FallbackAnimator, FallbackConfig};
pub use frame::{
    BarFrame, ChannelLevel, Point, RadialFrame, RenderFrame, Spoke, StereoFrame, TickContext,
    WaveformFrame,
};
pub use radial::{RadialBurst, RadialConfig};
pub use renderer::{RendererKind, SignalRenderer};
pub use smoothing::{approach, GainCurve, PeakHold};
pub use stereo::{StereoMeter, StereoMeterConfig};
pub use waveform::{Oscilloscope, WaveformConfig};

pub use airwave_core::{Error, Result};
