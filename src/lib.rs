//! # Airwave - Real-time Audio Analysis for Radio Players
//!
//! One tap into the playing stream, any number of visualizers reading it.
//!
//! ## Architecture
//!
//! Airwave is an umbrella crate that coordinates:
//! - **airwave-core** - Analysis graph (single tap, activation state machine, analyser ports)
//! - **airwave-analysis** - Beat detection and tempo estimation
//! - **airwave-render** - Renderers (bars, oscilloscope, stereo meters, radial burst) and
//!   synthetic fallback motion
//!
//! The [`AirwaveEngine`] ties them to a player: forward interactions and the
//! playback state, call [`tick`](AirwaveEngine::tick) once per animation
//! frame, then [`render`](AirwaveEngine::render) each mounted [`Widget`].
//!
//! ## Quick Start
//!
//! ```rust
//! use airwave::prelude::*;
//! use airwave::software::SoftwarePlatform;
//! use std::time::Duration;
//!
//! let platform = SoftwarePlatform::new(44100.0);
//! let station = PlaybackHandle::new(7);
//! let mut feed = platform.register_stream(station, 16384);
//!
//! let mut engine = AirwaveEngine::builder().platform(platform).build()?;
//! let mut meter = engine.mount(StereoMeter::new(StereoMeterConfig::default())?);
//!
//! // Before any gesture the meter animates synthetically.
//! engine.sync_playback(Some(station), true);
//! engine.tick(Duration::ZERO);
//! assert!(engine.render(&mut meter).as_stereo().is_some());
//! assert_eq!(meter.mode(), WidgetMode::Waiting);
//!
//! engine.notify_interaction();
//! feed.push_mono(&[0.3; 2048]);
//! engine.tick(Duration::from_millis(16));
//! engine.render(&mut meter);
//! assert_eq!(meter.mode(), WidgetMode::Live);
//! # Ok::<(), airwave::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Software platform
//! - `software` - In-process platform fed through a lock-free ring buffer
//! - `serialization` - Serde derives on configs, frames and events

/// Re-export of airwave-core for direct access
pub use airwave_core as core;

/// Beat detection and tempo
pub use airwave_analysis as analysis;

/// Renderers and fallback motion
pub use airwave_render as render;

// Core types
pub use airwave_core::{
    AnalyserPort, AnalysisGraph, AttachError, AudioPlatform, ContextState, Domain, GraphEvent,
    GraphState, PlaybackHandle, PortConfig, PortId, Resolution, SampleBuffer, Tap, TapError,
    TapId, TapSource,
};

#[cfg(feature = "software")]
pub use airwave_core::software;

pub use airwave_analysis::{BeatConfig, BeatDetector, BeatEvent, TempoEstimator};

pub use airwave_render::{
    BarSpectrum, BarSpectrumConfig, FallbackAnimator, FallbackConfig, Oscilloscope, RadialBurst,
    RadialConfig, RenderFrame, RendererKind, SignalRenderer, StereoMeter, StereoMeterConfig,
    TickContext, WaveformConfig,
};

mod builder;
mod config;
mod engine;
mod error;
mod widget;

pub use builder::AirwaveEngineBuilder;
pub use config::EngineConfig;
pub use engine::AirwaveEngine;
pub use error::{Error, Result};
pub use widget::{Widget, WidgetId, WidgetMode};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{AirwaveEngine, AirwaveEngineBuilder, EngineConfig, Widget, WidgetMode};

    // Graph
    pub use crate::core::{GraphState, PlaybackHandle, PortConfig};

    // Beats
    pub use crate::analysis::{BeatConfig, BeatEvent};

    // Renderers
    pub use crate::render::{
        BarSpectrum, BarSpectrumConfig, Oscilloscope, RadialBurst, RadialConfig, RenderFrame,
        SignalRenderer, StereoMeter, StereoMeterConfig, TickContext, WaveformConfig,
    };
}
