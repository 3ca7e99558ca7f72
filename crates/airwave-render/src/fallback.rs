//! Synthetic motion for renderers without a port.
//!
//! Each slot (bar, channel, waveform point) gets three sine/cosine voices
//! with seeded random frequency, phase and weight. The result looks alive
//! without any audio, and the same seed always produces the same motion.

use crate::TickContext;
use airwave_core::{Error, Result};
use core::f32::consts::TAU;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

const VOICES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct FallbackConfig {
    /// Seed for per-slot frequencies and phases
    pub seed: u64,
    /// Target level while playback is stopped
    pub rest_level: f32,
    /// Centre of the motion while playing
    pub base_level: f32,
    /// Swing around `base_level`
    pub amplitude: f32,
    /// Time multiplier
    pub speed: f32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_A1B2,
            rest_level: 0.05,
            base_level: 0.35,
            amplitude: 0.3,
            speed: 1.0,
        }
    }
}

impl FallbackConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("rest level", self.rest_level), ("base level", self.base_level)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "fallback {name} {value} out of range (0.0-1.0)"
                )));
            }
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fallback amplitude {} must be non-negative",
                self.amplitude
            )));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fallback speed {} must be positive",
                self.speed
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Voice {
    frequency: [f32; VOICES],
    phase: [f32; VOICES],
    weight: [f32; VOICES],
}

impl Voice {
    fn random(rng: &mut SmallRng) -> Self {
        let mut voice = Voice {
            frequency: [0.0; VOICES],
            phase: [0.0; VOICES],
            weight: [0.0; VOICES],
        };
        for k in 0..VOICES {
            voice.frequency[k] = rng.gen_range(0.3..2.5);
            voice.phase[k] = rng.gen_range(0.0..TAU);
            voice.weight[k] = rng.gen_range(0.3..1.0);
        }
        voice
    }

    /// Weighted superposition in `-1.0..=1.0`.
    fn sample(&self, t: f32) -> f32 {
        let mut sum = 0.0;
        let mut total = 0.0;
        for k in 0..VOICES {
            let arg = TAU * self.frequency[k] * t + self.phase[k];
            let wave = if k % 2 == 0 { arg.sin() } else { arg.cos() };
            sum += self.weight[k] * wave;
            total += self.weight[k];
        }
        if total > 0.0 {
            sum / total
        } else {
            0.0
        }
    }
}

/// Generates synthetic per-slot targets.
///
/// Owned by a widget; one animator can drive any renderer.
#[derive(Debug, Clone)]
pub struct FallbackAnimator {
    config: FallbackConfig,
    rng: SmallRng,
    voices: Vec<Voice>,
    output: Vec<f32>,
}

impl FallbackAnimator {
    pub fn new(config: FallbackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            voices: Vec::new(),
            output: Vec::new(),
        })
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Levels in `0.0..=1.0` for `count` slots.
    ///
    /// Every slot sits at the rest level while playback is stopped.
    pub fn targets(&mut self, count: usize, cx: &TickContext) -> &[f32] {
        self.prepare(count);
        if !cx.playing {
            self.output.fill(self.config.rest_level);
            return &self.output;
        }

        let t = self.time(cx);
        let FallbackConfig {
            base_level,
            amplitude,
            ..
        } = self.config;
        for (out, voice) in self.output.iter_mut().zip(&self.voices) {
            *out = (base_level + amplitude * voice.sample(t)).clamp(0.0, 1.0);
        }
        &self.output
    }

    /// Signed swings in `-1.0..=1.0` for `count` slots; zero while stopped.
    pub fn oscillation(&mut self, count: usize, cx: &TickContext) -> &[f32] {
        self.prepare(count);
        if !cx.playing {
            self.output.fill(0.0);
            return &self.output;
        }

        let t = self.time(cx);
        let amplitude = self.config.amplitude.min(1.0);
        for (out, voice) in self.output.iter_mut().zip(&self.voices) {
            *out = amplitude * voice.sample(t);
        }
        &self.output
    }

    fn time(&self, cx: &TickContext) -> f32 {
        cx.now.as_secs_f32() * self.config.speed
    }

    fn prepare(&mut self, count: usize) {
        if self.voices.len() < count {
            trace!(from = self.voices.len(), to = count, "seeding fallback voices");
        }
        while self.voices.len() < count {
            self.voices.push(Voice::random(&mut self.rng));
        }
        self.output.resize(count, 0.0);
    }
}

impl Default for FallbackAnimator {
    fn default() -> Self {
        let config = FallbackConfig::default();
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            voices: Vec::new(),
            output: Vec::new(),
        }
    }
}
