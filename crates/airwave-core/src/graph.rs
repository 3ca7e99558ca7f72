//! The analysis graph: sole owner of the tap.

use crate::port::PortLink;
use crate::tap::BoundTap;
use crate::{
    AnalyserPort, AttachError, AudioPlatform, ContextState, Error, GraphEvent, GraphState,
    PlaybackHandle, PortConfig, PortId, Result, Tap, TapError, TapId,
};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Callback invoked with `(previous, next)` on every state change.
pub type StatusListener = Box<dyn FnMut(GraphState, GraphState)>;

/// Owns the one permitted tap into the playing element.
///
/// There is one graph per engine and it is injected into every consumer.
/// All mutation happens through `&mut self` on the tick thread, which is the
/// single-writer rule for the tap. Ports hold shared read-only views of the
/// tap's signal; the graph tracks them weakly so they can be torn down in bulk.
pub struct AnalysisGraph {
    platform: Box<dyn AudioPlatform>,
    state: GraphState,
    gesture_seen: bool,
    tap: Option<BoundTap>,
    blocked: HashSet<PlaybackHandle>,
    activation_attempts: u32,
    ports: Vec<Weak<PortLink>>,
    next_port_id: u64,
    next_tap_id: u64,
    ticks: u64,
    listener: Option<StatusListener>,
}

impl AnalysisGraph {
    pub fn new(platform: impl AudioPlatform + 'static) -> Self {
        Self {
            platform: Box::new(platform),
            state: GraphState::Uninitialized,
            gesture_seen: false,
            tap: None,
            blocked: HashSet::new(),
            activation_attempts: 0,
            ports: Vec::new(),
            next_port_id: 0,
            next_tap_id: 0,
            ticks: 0,
            listener: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GraphState {
        self.state
    }

    /// True once the graph is running with a bound tap.
    pub fn is_ready(&self) -> bool {
        self.state.is_running() && self.tap.is_some()
    }

    /// The handle currently owning the tap.
    pub fn tap_owner(&self) -> Option<PlaybackHandle> {
        self.tap.as_ref().map(|bound| bound.tap().handle())
    }

    /// The bound tap, if any.
    pub fn tap(&self) -> Option<&Tap> {
        self.tap.as_ref().map(BoundTap::tap)
    }

    /// Activation requests issued so far.
    pub fn activation_attempts(&self) -> u32 {
        self.activation_attempts
    }

    /// Whether a user interaction has been observed.
    pub fn gesture_seen(&self) -> bool {
        self.gesture_seen
    }

    /// Whether `handle` was refused by platform policy.
    pub fn is_blocked(&self, handle: PlaybackHandle) -> bool {
        self.blocked.contains(&handle)
    }

    /// Number of ticks processed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of ports that are still connected.
    pub fn port_count(&self) -> usize {
        self.ports
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|link| link.is_connected())
            .count()
    }

    /// Register a callback for state changes, replacing any previous one.
    pub fn set_status_listener(&mut self, listener: impl FnMut(GraphState, GraphState) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Record a genuine user interaction.
    ///
    /// Unlocks platform activation for the rest of the process lifetime. If a
    /// tap is already bound and suspended, an activation request is issued.
    pub fn notify_interaction(&mut self) {
        if !self.gesture_seen {
            debug!("first user interaction observed");
        }
        self.gesture_seen = true;
        self.apply(GraphEvent::GestureObserved);

        if self.state.can_resume() && self.tap.is_some() {
            self.resume();
        }
    }

    /// Tap `handle`, or return the existing tap if it is already bound.
    ///
    /// Never blocks. On success the tap is routed to the audible output
    /// before it is returned, and a suspended context is asked to resume.
    pub fn attach(&mut self, handle: PlaybackHandle) -> core::result::Result<Tap, AttachError> {
        if let Some(bound) = &self.tap {
            let owner = bound.tap().handle();
            if owner != handle {
                return Err(AttachError::AlreadyBound {
                    bound: owner,
                    requested: handle,
                });
            }
            let tap = bound.tap().clone();
            if self.state.can_resume() {
                self.resume();
            }
            return Ok(tap);
        }

        if self.blocked.contains(&handle) {
            return Err(AttachError::BlockedByPolicy(handle));
        }

        self.apply(GraphEvent::AttachRequested {
            gesture_seen: self.gesture_seen,
        });
        if !self.gesture_seen {
            debug!(%handle, "attach deferred until a user interaction");
            return Err(AttachError::AwaitingGesture);
        }

        let mut source = match self.platform.create_tap(handle) {
            Ok(source) => source,
            Err(TapError::SecurityViolation(reason)) => {
                warn!(%handle, %reason, "tap refused by platform policy");
                self.blocked.insert(handle);
                self.apply(GraphEvent::PolicyViolation);
                return Err(AttachError::BlockedByPolicy(handle));
            }
            Err(err) => {
                warn!(%handle, error = %err, "tap creation failed");
                return Err(AttachError::Platform(err));
            }
        };

        // Tapping diverts the element's audio, so route it back out first.
        if let Err(err) = source.connect_to_output() {
            warn!(%handle, error = %err, "tap could not be routed to output");
            source.disconnect();
            return Err(AttachError::Platform(err));
        }

        self.next_tap_id += 1;
        let tap = Tap::new(TapId(self.next_tap_id), handle, source.sample_rate());
        self.tap = Some(BoundTap::new(tap.clone(), source));
        info!(%handle, sample_rate = tap.sample_rate(), "tap bound");

        let context = self.platform.context_state();
        self.apply(GraphEvent::TapBound { context });
        if self.state.can_resume() {
            self.resume();
        }

        Ok(tap)
    }

    /// Ask the platform to start processing.
    ///
    /// Returns `true` if the graph is running or an activation request was
    /// issued. The outcome of a request is observed on later ticks.
    pub fn resume(&mut self) -> bool {
        match self.state {
            GraphState::Running => true,
            GraphState::Suspended => {
                self.activation_attempts += 1;
                debug!(attempt = self.activation_attempts, "requesting activation");
                self.platform.request_resume();
                self.sync_context();
                true
            }
            _ => false,
        }
    }

    /// Advance one rendering tick.
    ///
    /// Polls the platform context and, while running, pumps newly decoded
    /// samples into the shared signal window. Ports read what was pumped here.
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.sync_context();

        if self.state.is_running() {
            if let Some(bound) = self.tap.as_mut() {
                bound.pump();
            }
        }

        self.ports
            .retain(|link| link.upgrade().is_some_and(|link| link.is_connected()));
    }

    /// Create a new view onto the tap.
    ///
    /// Fails with [`Error::PortUnavailable`] unless the graph is running with
    /// a bound tap.
    pub fn create_port(&mut self, config: PortConfig) -> Result<AnalyserPort> {
        config.validate()?;

        let tap = match (&self.tap, self.state) {
            (Some(bound), GraphState::Running) => bound.tap(),
            _ => return Err(Error::PortUnavailable(self.state)),
        };

        self.next_port_id += 1;
        let id = PortId(self.next_port_id);
        let link = Rc::new(PortLink::new(id));
        self.ports.push(Rc::downgrade(&link));

        debug!(port = %id, resolution = ?config.resolution, "analyser port created");
        Ok(AnalyserPort::new(id, config, tap.signal(), link))
    }

    /// Disconnect every port and drop the tap, freeing the owner slot.
    pub fn release(&mut self) -> Option<PlaybackHandle> {
        for link in self.ports.drain(..).filter_map(|link| link.upgrade()) {
            if link.is_connected() {
                link.disconnect();
                debug!(port = %link.id(), "analyser port torn down with tap");
            }
        }

        let bound = self.tap.take()?;
        let tap = bound.disconnect();
        info!(handle = %tap.handle(), "tap released");
        Some(tap.handle())
    }

    fn sync_context(&mut self) {
        if self.tap.is_none() {
            return;
        }

        match (self.state, self.platform.context_state()) {
            (GraphState::Running, ContextState::Suspended) => {
                warn!("audio context suspended by platform");
                self.apply(GraphEvent::ContextSuspended);
            }
            (GraphState::Suspended, ContextState::Running) => {
                self.apply(GraphEvent::ContextResumed);
            }
            _ => {}
        }
    }

    fn apply(&mut self, event: GraphEvent) {
        let previous = self.state;
        let next = previous.on(event);
        if next == previous {
            return;
        }

        info!(from = %previous, to = %next, ?event, "analysis graph state changed");
        self.state = next;
        if let Some(listener) = self.listener.as_mut() {
            listener(previous, next);
        }
    }
}

impl Drop for AnalysisGraph {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for AnalysisGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisGraph")
            .field("state", &self.state)
            .field("tap_owner", &self.tap_owner())
            .field("activation_attempts", &self.activation_attempts)
            .field("ports", &self.port_count())
            .finish_non_exhaustive()
    }
}
