//! The seam between the analysis graph and the host audio platform.

use crate::TapError;
use core::fmt;

/// Opaque identifier of the element currently producing audio.
///
/// The element itself is owned by the player; the graph only compares handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PlaybackHandle(u64);

impl PlaybackHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback#{}", self.0)
    }
}

/// Processing state reported by the platform audio context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ContextState {
    Suspended,
    Running,
}

/// The decoded signal of one tapped playback element.
pub trait TapSource {
    /// Sample rate of the decoded signal in Hz.
    fn sample_rate(&self) -> f32;

    /// Move decoded mono samples produced since the last call into `out`.
    ///
    /// Returns the number of samples written; `0` means nothing is pending.
    /// Must not block.
    fn pull(&mut self, out: &mut [f32]) -> usize;

    /// Route the tapped signal to the audible output.
    ///
    /// Called once, right after the tap is created. Tapping diverts the
    /// element's audio through the graph, so playback would be silent without
    /// this connection.
    fn connect_to_output(&mut self) -> Result<(), TapError>;

    /// Detach the tap, leaving playback on its original output path.
    fn disconnect(&mut self);
}

/// Host audio context: activation state and tap creation.
///
/// Every method must return immediately. Activation is asynchronous on most
/// platforms, so `request_resume` only starts it and the outcome shows up in
/// a later `context_state` poll.
pub trait AudioPlatform {
    /// Poll the context state.
    fn context_state(&mut self) -> ContextState;

    /// Ask the platform to start processing.
    fn request_resume(&mut self);

    /// Create the tap for `handle`.
    ///
    /// Returns [`TapError::SecurityViolation`] when the element's media is
    /// not allowed to be analysed (for example a cross-origin stream).
    fn create_tap(&mut self, handle: PlaybackHandle) -> Result<Box<dyn TapSource>, TapError>;
}

impl<P: AudioPlatform + ?Sized> AudioPlatform for Box<P> {
    fn context_state(&mut self) -> ContextState {
        (**self).context_state()
    }

    fn request_resume(&mut self) {
        (**self).request_resume()
    }

    fn create_tap(&mut self, handle: PlaybackHandle) -> Result<Box<dyn TapSource>, TapError> {
        (**self).create_tap(handle)
    }
}
