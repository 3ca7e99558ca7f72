//! Activation state machine for the analysis graph.
//!
//! Platforms start the audio context suspended and only allow it to run after
//! a genuine user gesture. Instead of chaining callbacks, the graph feeds
//! events into [`GraphState::on`], a pure function polled from the tick.

use crate::ContextState;
use core::fmt;

/// Lifecycle state of the analysis graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum GraphState {
    /// No attach has been attempted yet.
    #[default]
    Uninitialized,
    /// An attach was attempted before any user interaction.
    AwaitingGesture,
    /// Context exists but is not processing audio.
    Suspended,
    /// Context is processing audio; ports may be created.
    Running,
    /// The last tap attempt was refused by platform policy.
    Blocked,
}

impl GraphState {
    /// Apply `event` and return the next state.
    ///
    /// `Blocked` only leaves through a successful tap of another handle.
    pub fn on(self, event: GraphEvent) -> GraphState {
        use GraphState::*;

        match (self, event) {
            (_, GraphEvent::TapBound { context }) => context.into(),
            (_, GraphEvent::PolicyViolation) => Blocked,
            (Blocked, _) => Blocked,

            (Uninitialized, GraphEvent::AttachRequested { gesture_seen: false }) => {
                AwaitingGesture
            }
            (Uninitialized, GraphEvent::AttachRequested { gesture_seen: true }) => Suspended,
            (AwaitingGesture, GraphEvent::AttachRequested { gesture_seen: true }) => Suspended,
            (AwaitingGesture, GraphEvent::GestureObserved) => Suspended,

            (Suspended, GraphEvent::ContextResumed) => Running,
            (Running, GraphEvent::ContextSuspended) => Suspended,

            (state, _) => state,
        }
    }

    /// Whether ports can be created in this state.
    pub fn is_running(self) -> bool {
        self == GraphState::Running
    }

    /// Whether an activation request makes sense in this state.
    pub fn can_resume(self) -> bool {
        self == GraphState::Suspended
    }
}

impl From<ContextState> for GraphState {
    fn from(context: ContextState) -> Self {
        match context {
            ContextState::Suspended => GraphState::Suspended,
            ContextState::Running => GraphState::Running,
        }
    }
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphState::Uninitialized => "uninitialized",
            GraphState::AwaitingGesture => "awaiting gesture",
            GraphState::Suspended => "suspended",
            GraphState::Running => "running",
            GraphState::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

/// Inputs to the activation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent {
    /// `attach` was called.
    AttachRequested { gesture_seen: bool },
    /// A user interaction was reported.
    GestureObserved,
    /// The platform created and routed a tap; `context` is its current state.
    TapBound { context: ContextState },
    /// The platform context started running.
    ContextResumed,
    /// The platform suspended the context (backgrounding, device change).
    ContextSuspended,
    /// Tap creation raised a security violation.
    PolicyViolation,
}
