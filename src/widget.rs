//! Mounted visual widgets.

use airwave_core::{AnalyserPort, AnalysisGraph, Error as CoreError, PlaybackHandle};
use airwave_render::{FallbackAnimator, RenderFrame, RendererKind, SignalRenderer, TickContext};
use core::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// Where a widget's frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetMode {
    /// No port yet; animating synthetically until the graph is ready.
    Waiting,
    /// Reading a live port.
    Live,
    /// No port can ever be obtained for this mount.
    Fallback,
}

/// A renderer mounted by the presentation layer.
///
/// Holds the widget's own port once the graph is running. Dropping the
/// widget (or calling [`unmount`](Widget::unmount)) tears the port down.
pub struct Widget {
    id: WidgetId,
    renderer: Box<dyn SignalRenderer>,
    port: Option<AnalyserPort>,
    animator: FallbackAnimator,
    mode: WidgetMode,
}

impl Widget {
    pub(crate) fn new(
        id: WidgetId,
        renderer: Box<dyn SignalRenderer>,
        animator: FallbackAnimator,
    ) -> Self {
        Self {
            id,
            renderer,
            port: None,
            animator,
            mode: WidgetMode::Waiting,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    pub fn mode(&self) -> WidgetMode {
        self.mode
    }

    pub fn has_port(&self) -> bool {
        self.port.is_some()
    }

    /// The last produced frame.
    pub fn frame(&self) -> RenderFrame<'_> {
        self.renderer.frame()
    }

    /// Disconnect the port and drop the widget.
    pub fn unmount(self) {
        debug!(widget = %self.id, "widget unmounted");
    }

    /// Acquire a port if possible, then produce this tick's frame.
    ///
    /// Never fails: anything short of a live port renders synthetic motion.
    pub(crate) fn render(
        &mut self,
        graph: &mut AnalysisGraph,
        playback: Option<PlaybackHandle>,
        cx: &TickContext,
    ) -> RenderFrame<'_> {
        if self.port.as_ref().is_some_and(|port| !port.is_connected()) {
            debug!(widget = %self.id, "port torn down, waiting for a new one");
            self.port = None;
            self.mode = WidgetMode::Waiting;
        }

        if self.mode == WidgetMode::Waiting {
            self.acquire(graph, playback);
        }

        match self.port.as_mut() {
            Some(port) if cx.playing => self.renderer.produce_frame(port.read(), cx),
            _ => self.renderer.produce_fallback(&mut self.animator, cx),
        }
    }

    fn acquire(&mut self, graph: &mut AnalysisGraph, playback: Option<PlaybackHandle>) {
        if playback.is_some_and(|handle| graph.is_blocked(handle)) {
            debug!(widget = %self.id, "stream blocked, switching to synthetic motion");
            self.mode = WidgetMode::Fallback;
            return;
        }
        if !graph.is_ready() {
            return;
        }

        match graph.create_port(self.renderer.port_config()) {
            Ok(port) => {
                debug!(widget = %self.id, port = %port.id(), "widget is live");
                self.port = Some(port);
                self.mode = WidgetMode::Live;
            }
            Err(CoreError::PortUnavailable(_)) => {}
            Err(err) => {
                warn!(widget = %self.id, error = %err, "widget cannot read a port");
                self.mode = WidgetMode::Fallback;
            }
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("kind", &self.renderer.kind())
            .field("mode", &self.mode)
            .field("port", &self.port.as_ref().map(AnalyserPort::id))
            .finish_non_exhaustive()
    }
}
