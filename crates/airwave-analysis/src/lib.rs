//! # Airwave Analysis
//!
//! Musically meaningful signals derived from analyser port data.
//!
//! - **[`BeatDetector`]**: energy-variance onset detection with a hard debounce
//! - **[`EnergyHistory`]**: the fixed-length energy ring behind it
//! - **[`TempoEstimator`]**: BPM from the intervals between recent beats
//!
//! Detectors are driven once per rendering tick with the latest frequency
//! buffer and the tick's timestamp. They never allocate after construction.
//!
//! ## Example
//!
//! ```rust
//! use airwave_analysis::{BeatConfig, BeatDetector};
//! use std::time::Duration;
//!
//! let mut detector = BeatDetector::new(BeatConfig::default());
//! for tick in 0..43u64 {
//!     let quiet = [20u8; 64];
//!     assert!(detector.process(&quiet, Duration::from_millis(tick * 23)).is_none());
//! }
//!
//! let beat = detector.process(&[255u8; 64], Duration::from_secs(1)).expect("beat");
//! assert!(beat.intensity > 0.99);
//! ```

mod beat;
mod history;
mod tempo;

pub use beat::{BeatConfig, BeatDetector, BeatEvent};
pub use history::EnergyHistory;
pub use tempo::{TempoEstimator, MAX_BPM, MIN_BPM};

pub use airwave_core::{Error, Result};
