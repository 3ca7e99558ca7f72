//! Dual-channel level meters.
//!
//! The frequency buffer is split in two: the lower half drives the "left"
//! meter and the upper half the "right" one. The upper half carries less
//! energy, so it gets the larger default gain.

use crate::bars::validate_alpha;
use crate::smoothing::{approach, PeakHold};
use crate::{
    ChannelLevel, FallbackAnimator, RenderFrame, RendererKind, SignalRenderer, StereoFrame,
    TickContext,
};
use airwave_core::{Error, PortConfig, Result, SampleBuffer};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StereoMeterConfig {
    pub bins: usize,
    pub left_gain: f32,
    pub right_gain: f32,
    /// Lowest displayed level
    pub floor: f32,
    pub alpha: f32,
    pub peak_hold_frames: u32,
    /// Peak decay per tick, in normalized level units
    pub peak_decay: f32,
}

impl Default for StereoMeterConfig {
    fn default() -> Self {
        Self {
            bins: 64,
            left_gain: 1.4,
            right_gain: 2.2,
            floor: 0.02,
            alpha: 0.25,
            peak_hold_frames: 30,
            peak_decay: 0.01,
        }
    }
}

impl StereoMeterConfig {
    pub fn port_config(&self) -> PortConfig {
        PortConfig::frequency(self.bins)
    }

    pub fn validate(&self) -> Result<()> {
        self.port_config().validate()?;
        for (name, gain) in [("left", self.left_gain), ("right", self.right_gain)] {
            if !gain.is_finite() || gain <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} gain {gain} must be positive"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.floor) {
            return Err(Error::InvalidConfig(format!(
                "meter floor {} out of range (0.0-1.0)",
                self.floor
            )));
        }
        if !self.peak_decay.is_finite() || self.peak_decay < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "peak decay {} must be non-negative",
                self.peak_decay
            )));
        }
        validate_alpha(self.alpha)
    }
}

#[derive(Debug, Clone)]
struct Channel {
    gain: f32,
    level: f32,
    peak: PeakHold,
}

impl Channel {
    fn new(gain: f32, config: &StereoMeterConfig) -> Self {
        Self {
            gain,
            level: config.floor,
            peak: PeakHold::new(config.floor, config.peak_hold_frames, config.peak_decay),
        }
    }

    fn update(&mut self, raw: f32, floor: f32, alpha: f32) -> ChannelLevel {
        let raw = if raw.is_finite() { raw } else { floor };
        self.level = approach(self.level, raw.clamp(floor, 1.0), alpha).clamp(floor, 1.0);
        ChannelLevel {
            level: self.level,
            peak: self.peak.update(self.level),
        }
    }
}

/// Two meters with independent gain and peak hold.
#[derive(Debug, Clone)]
pub struct StereoMeter {
    config: StereoMeterConfig,
    left: Channel,
    right: Channel,
    frame: StereoFrame,
}

impl StereoMeter {
    pub fn new(config: StereoMeterConfig) -> Result<Self> {
        config.validate()?;
        let rest = ChannelLevel {
            level: config.floor,
            peak: config.floor,
        };
        Ok(Self {
            left: Channel::new(config.left_gain, &config),
            right: Channel::new(config.right_gain, &config),
            frame: StereoFrame {
                left: rest,
                right: rest,
            },
            config,
        })
    }

    pub fn config(&self) -> &StereoMeterConfig {
        &self.config
    }

    pub fn levels(&self) -> &StereoFrame {
        &self.frame
    }

    fn update(&mut self, left: f32, right: f32) {
        let floor = self.config.floor;
        let alpha = self.config.alpha;
        self.frame = StereoFrame {
            left: self.left.update(left, floor, alpha),
            right: self.right.update(right, floor, alpha),
        };
    }
}

fn mean_level(bytes: &[u8]) -> f32 {
    if bytes.is_empty() {
        return 0.0;
    }
    let sum: u32 = bytes.iter().map(|&b| u32::from(b)).sum();
    sum as f32 / (bytes.len() as f32 * f32::from(SampleBuffer::MAX_VALUE))
}

impl SignalRenderer for StereoMeter {
    fn kind(&self) -> RendererKind {
        RendererKind::Stereo
    }

    fn port_config(&self) -> PortConfig {
        self.config.port_config()
    }

    fn produce_frame(&mut self, samples: &SampleBuffer, _cx: &TickContext) -> RenderFrame<'_> {
        let (low, high) = samples.as_slice().split_at(samples.len() / 2);
        let left = mean_level(low) * self.left.gain;
        let right = mean_level(high) * self.right.gain;
        self.update(left, right);
        RenderFrame::Stereo(&self.frame)
    }

    fn produce_fallback(
        &mut self,
        animator: &mut FallbackAnimator,
        cx: &TickContext,
    ) -> RenderFrame<'_> {
        let targets = animator.targets(2, cx);
        let (left, right) = (targets[0], targets[1]);
        self.update(left, right);
        RenderFrame::Stereo(&self.frame)
    }

    fn frame(&self) -> RenderFrame<'_> {
        RenderFrame::Stereo(&self.frame)
    }

    fn reset(&mut self) {
        let floor = self.config.floor;
        for channel in [&mut self.left, &mut self.right] {
            channel.level = floor;
            channel.peak.reset(floor);
        }
        let rest = ChannelLevel {
            level: floor,
            peak: floor,
        };
        self.frame = StereoFrame {
            left: rest,
            right: rest,
        };
    }
}
