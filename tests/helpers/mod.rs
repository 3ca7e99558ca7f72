//! Test helpers and fixtures for airwave integration tests
//!
//! A [`Rig`] drives an engine over the software platform with a manual
//! clock, one call per animation frame.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (floors, clamps)
//! - `SMOOTHING_EPSILON` (1e-3): Values reached through exponential smoothing
//! - `BEAT_INTENSITY_EPSILON` (0.05): "Near full" beat intensity

#![allow(dead_code)]

pub mod tolerances;

use airwave::prelude::*;
use airwave::software::{SampleFeed, SoftwarePlatform};
use std::time::Duration;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f32 = 44100.0;

/// One animation frame at ~60 Hz
pub const FRAME: Duration = Duration::from_millis(16);

/// Samples pushed per frame, enough to refill the largest port window
pub const SAMPLES_PER_FRAME: usize = 2048;

/// Ring buffer capacity in stereo frames
pub const FEED_CAPACITY: usize = 16384;

/// Engine plus the platform and stream behind it.
pub struct Rig {
    pub engine: AirwaveEngine,
    pub platform: SoftwarePlatform,
    pub feed: SampleFeed,
    pub station: PlaybackHandle,
    pub now: Duration,
}

impl Rig {
    /// Suspended platform, no gesture yet, nothing playing.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let platform = SoftwarePlatform::new(TEST_SAMPLE_RATE);
        let station = PlaybackHandle::new(1);
        let feed = platform.register_stream(station, FEED_CAPACITY);

        let engine = AirwaveEngine::builder()
            .platform(platform.clone())
            .config(config)
            .build()
            .expect("Failed to create test engine");

        Self {
            engine,
            platform,
            feed,
            station,
            now: Duration::ZERO,
        }
    }

    /// Gesture seen, station playing, graph running.
    pub fn live() -> Self {
        let mut rig = Self::new();
        rig.engine.notify_interaction();
        rig.engine.sync_playback(Some(rig.station), true);
        rig.tick();
        assert!(rig.engine.is_ready(), "rig graph should be running");
        rig
    }

    /// Advance the clock by one frame and tick the engine.
    pub fn tick(&mut self) -> TickContext {
        self.now += FRAME;
        self.engine.tick(self.now)
    }

    /// Push `samples` and tick.
    pub fn tick_with(&mut self, samples: &[f32]) -> TickContext {
        self.feed.push_mono(samples);
        self.tick()
    }

    /// Render `widget` for the current tick.
    pub fn render<'w>(&mut self, widget: &'w mut Widget) -> RenderFrame<'w> {
        self.engine.render(widget)
    }
}

/// Generate a sine wave at given frequency.
pub fn generate_sine(frequency: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / TEST_SAMPLE_RATE;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Generate white noise (random samples in -amplitude..amplitude).
pub fn generate_noise(num_samples: usize, amplitude: f32, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let unit = (rng >> 40) as f32 / (1u64 << 24) as f32;
            amplitude * (unit * 2.0 - 1.0)
        })
        .collect()
}

/// Frequency-domain bytes for a constant energy level.
pub fn flat_bins(level: u8, bins: usize) -> Vec<u8> {
    vec![level; bins]
}

/// Peak absolute value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Distinct beat timestamps observed by polling `engine.beat()` once per tick.
#[derive(Debug, Default)]
pub struct BeatLog {
    pub timestamps: Vec<Duration>,
}

impl BeatLog {
    pub fn observe(&mut self, beat: Option<BeatEvent>) {
        if let Some(beat) = beat {
            if self.timestamps.last() != Some(&beat.timestamp) {
                self.timestamps.push(beat.timestamp);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn min_gap(&self) -> Option<Duration> {
        self.timestamps.windows(2).map(|w| w[1] - w[0]).min()
    }
}
