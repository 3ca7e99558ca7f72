//! Energy-variance beat detection.
//!
//! Each tick the mean energy `E` of the frequency buffer is pushed into an
//! [`EnergyHistory`]. A beat is declared when `E` rises above
//! `average + sensitivity * variance` of that history and the debounce
//! interval has elapsed since the previous beat.

use crate::EnergyHistory;
use airwave_core::{Error, Result, SampleBuffer};
use std::time::Duration;
use tracing::trace;

/// Absorbs rounding in the moving average of a constant history.
const THRESHOLD_EPSILON: f32 = 1e-6;

/// Beat detector tuning.
///
/// The defaults are a reasonable starting point, not derived values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BeatConfig {
    /// Energy history length in ticks (43 is about 1 s at 43 Hz)
    pub history_len: usize,
    /// Multiplier `k` applied to the history variance
    pub sensitivity: f32,
    /// Minimum time between two declared beats
    pub debounce: Duration,
    /// How long a declared beat stays active
    pub active_window: Duration,
    /// Energy that maps to intensity 1.0
    pub max_energy_scale: f32,
    /// Fraction of the buffer (low, high) that contributes energy
    pub band: (f32, f32),
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            history_len: 43,
            sensitivity: 0.2,
            debounce: Duration::from_millis(200),
            active_window: Duration::from_millis(120),
            max_energy_scale: 1.0,
            band: (0.0, 1.0),
        }
    }
}

impl BeatConfig {
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Restrict energy to a slice of the spectrum, e.g. `(0.0, 0.1)` for bass.
    pub fn with_band(mut self, low: f32, high: f32) -> Self {
        self.band = (low, high);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_len == 0 {
            return Err(Error::InvalidConfig(
                "beat history must hold at least one sample".into(),
            ));
        }
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "beat sensitivity {} must be finite and non-negative",
                self.sensitivity
            )));
        }
        if !self.max_energy_scale.is_finite() || self.max_energy_scale <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max energy scale {} must be positive",
                self.max_energy_scale
            )));
        }
        let (low, high) = self.band;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(Error::InvalidConfig(format!(
                "beat band {low}..{high} must be a non-empty range within 0.0-1.0"
            )));
        }
        Ok(())
    }
}

/// A declared onset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BeatEvent {
    /// Tick time at which the beat was declared
    pub timestamp: Duration,
    /// Normalized strength (0.0 - 1.0)
    pub intensity: f32,
}

impl BeatEvent {
    /// Whether the beat is still active at `now`.
    pub fn is_active(&self, now: Duration, window: Duration) -> bool {
        now >= self.timestamp && now - self.timestamp < window
    }
}

/// Declares beats from per-tick frequency buffers.
#[derive(Debug, Clone)]
pub struct BeatDetector {
    config: BeatConfig,
    history: EnergyHistory,
    last_beat: Option<BeatEvent>,
    energy: f32,
    beats: u64,
}

impl BeatDetector {
    /// Validates `config` first; see [`BeatConfig::validate`].
    pub fn try_new(config: BeatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Unchecked. An invalid config (e.g. a zero `max_energy_scale`) yields
    /// meaningless intensities rather than an error.
    pub fn new(config: BeatConfig) -> Self {
        Self {
            history: EnergyHistory::new(config.history_len),
            config,
            last_beat: None,
            energy: 0.0,
            beats: 0,
        }
    }

    pub fn config(&self) -> &BeatConfig {
        &self.config
    }

    /// Feed one tick of frequency bytes.
    ///
    /// Returns the event when a new beat is declared on this tick.
    pub fn process(&mut self, bins: &[u8], now: Duration) -> Option<BeatEvent> {
        let energy = self.band_energy(bins);
        self.energy = energy;
        self.history.push(energy);

        let average = self.history.moving_average();
        let variance = self.history.variance();
        let threshold = average + self.config.sensitivity * variance + THRESHOLD_EPSILON;
        if energy <= threshold {
            return None;
        }

        let debounced = self
            .last_beat
            .map_or(true, |last| now.saturating_sub(last.timestamp) >= self.config.debounce);
        if !debounced {
            return None;
        }

        let event = BeatEvent {
            timestamp: now,
            intensity: (energy / self.config.max_energy_scale).clamp(0.0, 1.0),
        };
        self.last_beat = Some(event);
        self.beats += 1;
        trace!(energy, average, variance, intensity = event.intensity, "beat");
        Some(event)
    }

    /// [`process`](BeatDetector::process) for a port buffer.
    pub fn process_buffer(&mut self, buffer: &SampleBuffer, now: Duration) -> Option<BeatEvent> {
        self.process(buffer.as_slice(), now)
    }

    /// The most recent beat while it is still active at `now`.
    ///
    /// Clears after the active window regardless of later energy.
    pub fn active_beat(&self, now: Duration) -> Option<BeatEvent> {
        self.last_beat
            .filter(|beat| beat.is_active(now, self.config.active_window))
    }

    /// The most recent beat, active or not.
    pub fn last_beat(&self) -> Option<BeatEvent> {
        self.last_beat
    }

    /// Energy of the last processed tick.
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Beats declared since the last reset.
    pub fn beat_count(&self) -> u64 {
        self.beats
    }

    pub fn history(&self) -> &EnergyHistory {
        &self.history
    }

    /// Forget all history; called when playback stops.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_beat = None;
        self.energy = 0.0;
        self.beats = 0;
    }

    fn band_energy(&self, bins: &[u8]) -> f32 {
        if bins.is_empty() {
            return 0.0;
        }
        let len = bins.len();
        let (low, high) = self.config.band;
        let start = ((low * len as f32).floor() as usize).min(len - 1);
        let end = ((high * len as f32).ceil() as usize).clamp(start + 1, len);

        let band = &bins[start..end];
        let sum: u32 = band.iter().map(|&b| u32::from(b)).sum();
        sum as f32 / (band.len() as f32 * f32::from(SampleBuffer::MAX_VALUE))
    }
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(BeatConfig::default())
    }
}
