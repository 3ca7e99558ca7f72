//! Analyser port configuration.

use crate::{Error, Result};

/// Smallest FFT the ports accept.
pub const MIN_FFT_SIZE: usize = 32;

/// Largest FFT the ports accept (also the tap window length).
pub const MAX_FFT_SIZE: usize = 32768;

/// Which representation a port produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Domain {
    Time,
    Frequency,
}

/// Port resolution, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Resolution {
    /// Raw amplitude samples over the most recent window.
    TimeSamples(usize),
    /// Magnitude bins; the transform size is twice the bin count.
    FrequencyBins(usize),
}

impl Resolution {
    pub fn domain(self) -> Domain {
        match self {
            Resolution::TimeSamples(_) => Domain::Time,
            Resolution::FrequencyBins(_) => Domain::Frequency,
        }
    }

    /// Number of values in the port's buffer.
    pub fn len(self) -> usize {
        match self {
            Resolution::TimeSamples(n) | Resolution::FrequencyBins(n) => n,
        }
    }

    /// Number of signal samples consumed per read.
    pub fn window_len(self) -> usize {
        match self {
            Resolution::TimeSamples(n) => n,
            Resolution::FrequencyBins(n) => n * 2,
        }
    }
}

/// Configuration of one analyser port.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PortConfig {
    pub resolution: Resolution,
    /// Temporal smoothing of frequency magnitudes (0.0 = none, 1.0 = frozen)
    pub smoothing: f32,
    /// Magnitude mapped to byte 0
    pub min_db: f32,
    /// Magnitude mapped to byte 255
    pub max_db: f32,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::frequency(256)
    }
}

impl PortConfig {
    pub fn frequency(bins: usize) -> Self {
        Self {
            resolution: Resolution::FrequencyBins(bins),
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }

    pub fn time(samples: usize) -> Self {
        Self {
            resolution: Resolution::TimeSamples(samples),
            ..Self::frequency(samples / 2)
        }
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_decibels(mut self, min_db: f32, max_db: f32) -> Self {
        self.min_db = min_db;
        self.max_db = max_db;
        self
    }

    pub fn domain(&self) -> Domain {
        self.resolution.domain()
    }

    pub fn validate(&self) -> Result<()> {
        let window = self.resolution.window_len();
        if !window.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&window) {
            return Err(Error::InvalidConfig(format!(
                "resolution {:?} needs a power-of-two window in {}..={} samples",
                self.resolution, MIN_FFT_SIZE, MAX_FFT_SIZE
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(Error::InvalidConfig(format!(
                "smoothing {} out of range (0.0-1.0)",
                self.smoothing
            )));
        }
        if self.min_db.is_nan() || self.max_db.is_nan() || self.min_db >= self.max_db {
            return Err(Error::InvalidConfig(format!(
                "decibel range {}..{} is empty",
                self.min_db, self.max_db
            )));
        }
        Ok(())
    }
}
