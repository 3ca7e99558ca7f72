//! Centralized error type for the airwave umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] airwave_core::Error),

    #[error("Attach: {0}")]
    Attach(#[from] airwave_core::AttachError),

    #[error("No audio platform configured")]
    MissingPlatform,
}

impl Error {
    /// Whether the failure only means "no data yet"; widgets keep animating
    /// synthetically and retry on a later tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Core(airwave_core::Error::PortUnavailable(_)) => true,
            Error::Attach(err) => err.is_retryable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
