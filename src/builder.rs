//! Builder for configuring and constructing an `AirwaveEngine`.

use crate::{AirwaveEngine, EngineConfig, Error, Result};
use airwave_analysis::BeatConfig;
use airwave_core::{AnalysisGraph, AudioPlatform, GraphState, PortConfig, StatusListener};
use airwave_render::FallbackConfig;

/// The platform is required: it decides how the tap is created and whether
/// the context needs a gesture before it runs.
///
/// # Example
///
/// ```rust
/// use airwave::prelude::*;
/// use airwave::software::SoftwarePlatform;
/// use std::time::Duration;
///
/// let engine = AirwaveEngine::builder()
///     .platform(SoftwarePlatform::new(48000.0))
///     .beat(BeatConfig::default().with_debounce(Duration::from_millis(250)))
///     .on_state_change(|from, to| println!("{from} -> {to}"))
///     .build()?;
///
/// assert_eq!(engine.state(), GraphState::Uninitialized);
/// # Ok::<(), airwave::Error>(())
/// ```
#[derive(Default)]
pub struct AirwaveEngineBuilder {
    platform: Option<Box<dyn AudioPlatform>>,
    config: EngineConfig,
    listener: Option<StatusListener>,
}

impl AirwaveEngineBuilder {
    pub fn platform(mut self, platform: impl AudioPlatform + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn beat(mut self, beat: BeatConfig) -> Self {
        self.config.beat = beat;
        self
    }

    /// Default: 256 frequency bins, smoothing 0.3
    pub fn beat_port(mut self, port: PortConfig) -> Self {
        self.config.beat_port = port;
        self
    }

    pub fn fallback(mut self, fallback: FallbackConfig) -> Self {
        self.config.fallback = fallback;
        self
    }

    /// Called with `(from, to)` on every graph state transition.
    pub fn on_state_change(
        mut self,
        listener: impl FnMut(GraphState, GraphState) + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn build(self) -> Result<AirwaveEngine> {
        self.config.validate()?;
        let platform = self.platform.ok_or(Error::MissingPlatform)?;

        let mut graph = AnalysisGraph::new(platform);
        if let Some(listener) = self.listener {
            graph.set_status_listener(listener);
        }

        AirwaveEngine::from_parts(graph, self.config)
    }
}
