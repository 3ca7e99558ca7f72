//! Error types for airwave-core.

use crate::{GraphState, PlaybackHandle};
use thiserror::Error;

/// Failure raised by the platform while creating or routing a tap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TapError {
    /// Cross-origin or other security restriction. Permanent for the handle.
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// The element already feeds a tap that was since dropped. Elements can
    /// be tapped once, so this is permanent for the handle.
    #[error("{0} is already tapped")]
    AlreadyTapped(PlaybackHandle),

    /// Any other platform failure; the attach may be retried.
    #[error("Tap unavailable: {0}")]
    Unavailable(String),
}

/// Why `AnalysisGraph::attach` did not produce a tap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error("No user interaction observed yet, retry after the next gesture")]
    AwaitingGesture,

    #[error("Tap already bound to {bound}, cannot attach {requested}")]
    AlreadyBound {
        bound: PlaybackHandle,
        requested: PlaybackHandle,
    },

    #[error("Tap for {0} blocked by platform policy")]
    BlockedByPolicy(PlaybackHandle),

    #[error("Platform could not create tap: {0}")]
    Platform(TapError),
}

impl AttachError {
    /// Whether a later `attach` for the same handle can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttachError::AwaitingGesture | AttachError::Platform(TapError::Unavailable(_))
        )
    }
}

/// Error type for airwave-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Analyser port unavailable while graph is {0}")]
    PortUnavailable(GraphState),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
