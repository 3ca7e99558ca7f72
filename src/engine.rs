use crate::widget::{Widget, WidgetId};
use crate::{AirwaveEngineBuilder, EngineConfig, Result};
use airwave_analysis::{BeatDetector, BeatEvent, TempoEstimator};
use airwave_core::{AnalyserPort, AnalysisGraph, GraphState, PlaybackHandle, PortConfig, Tap};
use airwave_render::{FallbackAnimator, RenderFrame, SignalRenderer, TickContext};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Beat detection driven by the engine's own port.
struct BeatTracker {
    port: Option<AnalyserPort>,
    detector: BeatDetector,
    tempo: TempoEstimator,
    current: Option<BeatEvent>,
}

impl BeatTracker {
    fn reset(&mut self) {
        self.detector.reset();
        self.tempo.reset();
        self.current = None;
    }
}

/// Connects the player, the analysis graph and the mounted widgets.
///
/// The presentation layer forwards three things: user interactions, the
/// current playback element with its playing flag, and one `tick` per
/// animation frame. Analysis failures never reach the player; widgets fall
/// back to synthetic motion instead.
///
/// # Example
///
/// ```rust
/// use airwave::prelude::*;
/// use airwave::software::SoftwarePlatform;
/// use std::time::Duration;
///
/// let platform = SoftwarePlatform::new(44100.0);
/// let handle = PlaybackHandle::new(1);
/// let mut feed = platform.register_stream(handle, 16384);
///
/// let mut engine = AirwaveEngine::builder().platform(platform).build()?;
/// let mut bars = engine.mount(BarSpectrum::new(BarSpectrumConfig::default())?);
///
/// engine.notify_interaction();
/// engine.sync_playback(Some(handle), true);
///
/// feed.push_mono(&[0.5; 2048]);
/// engine.tick(Duration::from_millis(16));
/// let frame = engine.render(&mut bars);
/// assert_eq!(frame.as_bars().map(|f| f.heights.len()), Some(32));
/// # Ok::<(), airwave::Error>(())
/// ```
pub struct AirwaveEngine {
    graph: AnalysisGraph,
    config: EngineConfig,
    playback: Option<PlaybackHandle>,
    playing: bool,
    cx: TickContext,
    beat: BeatTracker,
    next_widget_id: u64,
}

impl AirwaveEngine {
    /// Create a new engine builder
    pub fn builder() -> AirwaveEngineBuilder {
        AirwaveEngineBuilder::default()
    }

    pub(crate) fn from_parts(graph: AnalysisGraph, config: EngineConfig) -> Result<Self> {
        let beat = BeatTracker {
            port: None,
            detector: BeatDetector::try_new(config.beat.clone())?,
            tempo: TempoEstimator::new(),
            current: None,
        };
        Ok(Self {
            graph,
            config,
            playback: None,
            playing: false,
            cx: TickContext::new(Duration::ZERO, false),
            beat,
            next_widget_id: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &AnalysisGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut AnalysisGraph {
        &mut self.graph
    }

    pub fn state(&self) -> GraphState {
        self.graph.state()
    }

    /// True once the graph is running; ports can be created.
    pub fn is_ready(&self) -> bool {
        self.graph.is_ready()
    }

    pub fn playback(&self) -> Option<PlaybackHandle> {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Context of the last tick.
    pub fn context(&self) -> TickContext {
        self.cx
    }

    /// The active beat, if one was declared within its active window.
    pub fn beat(&self) -> Option<BeatEvent> {
        self.beat.current
    }

    pub fn tempo_bpm(&self) -> Option<f32> {
        self.beat.tempo.bpm()
    }

    /// Forward a user interaction (click, touch, key).
    ///
    /// Retries a pending attach for the current playback element.
    pub fn notify_interaction(&mut self) {
        self.graph.notify_interaction();

        let Some(handle) = self.playback else {
            return;
        };
        let pending = self.playing && self.graph.tap_owner().is_none();
        if pending && !self.graph.is_blocked(handle) {
            if let Err(err) = self.graph.attach(handle) {
                debug!(%handle, error = %err, "attach after interaction failed");
            }
        }
    }

    /// Playback of `handle` started (or resumed).
    ///
    /// Attaches the tap if needed and asks a suspended context to resume.
    /// A different element replaces the previous one's tap.
    pub fn on_playback_started(&mut self, handle: PlaybackHandle) -> Result<Tap> {
        if let Some(owner) = self.graph.tap_owner() {
            if owner != handle {
                info!(from = %owner, to = %handle, "playback element changed");
                self.release();
            }
        }

        self.playback = Some(handle);
        self.playing = true;

        let tap = self.graph.attach(handle)?;
        self.graph.resume();
        Ok(tap)
    }

    /// Playback stopped; beat history starts over on the next play.
    pub fn on_playback_stopped(&mut self) {
        self.playing = false;
        self.beat.reset();
    }

    /// Mirror the player's state: current element and playing flag.
    ///
    /// Edge-triggered and infallible. Attach failures are logged; widgets
    /// already degrade to synthetic motion on their own. Clearing the element
    /// keeps the tap, since an element can only be tapped once; it is only
    /// replaced when a different element starts playing.
    pub fn sync_playback(&mut self, handle: Option<PlaybackHandle>, playing: bool) {
        let changed = handle != self.playback;

        let Some(handle) = handle else {
            if self.playing {
                self.on_playback_stopped();
            }
            self.playback = None;
            return;
        };

        if playing && (changed || !self.playing) {
            match self.on_playback_started(handle) {
                Ok(_) => {}
                Err(err) if err.is_transient() => {
                    debug!(%handle, error = %err, "analysis not available yet");
                }
                Err(err) => warn!(%handle, error = %err, "analysis unavailable for stream"),
            }
        } else if !playing {
            if self.playing {
                self.on_playback_stopped();
            }
            self.playback = Some(handle);
        }
    }

    /// Advance one animation frame.
    ///
    /// Pumps the tap, runs beat detection and returns the context handed to
    /// every widget rendered this tick.
    pub fn tick(&mut self, now: Duration) -> TickContext {
        self.graph.tick();
        self.track_beat(now);

        let intensity = self.beat.current.map_or(0.0, |beat| beat.intensity);
        self.cx = TickContext::new(now, self.playing).with_beat(intensity);
        self.cx
    }

    /// Create an extra port for a custom consumer.
    pub fn create_port(&mut self, config: PortConfig) -> Result<AnalyserPort> {
        Ok(self.graph.create_port(config)?)
    }

    /// Mount a renderer as a widget.
    pub fn mount(&mut self, renderer: impl SignalRenderer + 'static) -> Widget {
        self.next_widget_id += 1;
        let id = WidgetId(self.next_widget_id);

        let fallback = self.config.fallback.clone();
        let seed = fallback.seed.wrapping_add(self.next_widget_id);
        let animator = FallbackAnimator::new(fallback.with_seed(seed)).unwrap_or_default();

        debug!(widget = %id, kind = %renderer.kind(), "widget mounted");
        Widget::new(id, Box::new(renderer), animator)
    }

    /// Produce `widget`'s frame for the current tick.
    pub fn render<'w>(&mut self, widget: &'w mut Widget) -> RenderFrame<'w> {
        widget.render(&mut self.graph, self.playback, &self.cx)
    }

    /// Drop the tap and every port, e.g. when the player is torn down.
    pub fn release(&mut self) -> Option<PlaybackHandle> {
        self.beat.port = None;
        self.beat.reset();
        self.graph.release()
    }

    fn track_beat(&mut self, now: Duration) {
        let tracker = &mut self.beat;

        if tracker.port.as_ref().is_some_and(|port| !port.is_connected()) {
            tracker.port = None;
        }
        if tracker.port.is_none() && self.graph.is_ready() {
            match self.graph.create_port(self.config.beat_port) {
                Ok(port) => tracker.port = Some(port),
                Err(err) => debug!(error = %err, "beat port unavailable"),
            }
        }

        if self.playing {
            if let Some(port) = tracker.port.as_mut() {
                if let Some(event) = tracker.detector.process_buffer(port.read(), now) {
                    tracker.tempo.push(event.timestamp);
                }
            }
        }
        tracker.current = tracker.detector.active_beat(now);
    }
}

impl std::fmt::Debug for AirwaveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirwaveEngine")
            .field("graph", &self.graph)
            .field("playback", &self.playback)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}
