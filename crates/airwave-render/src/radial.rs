//! Radial burst renderer.

use crate::{
    BarSpectrum, BarSpectrumConfig, FallbackAnimator, Point, RadialFrame, RenderFrame,
    RendererKind, SignalRenderer, Spoke, TickContext,
};
use airwave_core::{Error, PortConfig, Result, SampleBuffer};
use core::f32::consts::{FRAC_PI_2, TAU};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RadialConfig {
    /// Amplitude mapping shared with the bar spectrum
    pub bars: BarSpectrumConfig,
    pub center: Point,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Extra length at full beat intensity, as a fraction
    pub amplitude_boost: f32,
    /// Spoke width as a fraction of its angular slot
    pub base_width: f32,
    /// Extra width at full beat intensity, as a fraction
    pub width_boost: f32,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            bars: BarSpectrumConfig::default().with_bars(64),
            center: Point::default(),
            inner_radius: 0.25,
            outer_radius: 1.0,
            amplitude_boost: 0.5,
            base_width: 0.6,
            width_boost: 0.8,
        }
    }
}

impl RadialConfig {
    pub fn validate(&self) -> Result<()> {
        self.bars.validate()?;
        if !(self.inner_radius >= 0.0 && self.outer_radius > self.inner_radius) {
            return Err(Error::InvalidConfig(format!(
                "radii {}..{} must be increasing and non-negative",
                self.inner_radius, self.outer_radius
            )));
        }
        if !(self.base_width > 0.0 && self.base_width <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "spoke width {} out of range (0.0-1.0]",
                self.base_width
            )));
        }
        for (name, boost) in [
            ("amplitude", self.amplitude_boost),
            ("width", self.width_boost),
        ] {
            if !boost.is_finite() || boost < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} boost {boost} must be non-negative"
                )));
            }
        }
        Ok(())
    }
}

/// Bars arranged around a centre point, pulsing with the beat.
#[derive(Debug, Clone)]
pub struct RadialBurst {
    config: RadialConfig,
    bars: BarSpectrum,
    frame: RadialFrame,
}

impl RadialBurst {
    pub fn new(config: RadialConfig) -> Result<Self> {
        config.validate()?;
        let bars = BarSpectrum::new(config.bars.clone())?;
        let frame = RadialFrame {
            center: config.center,
            spokes: vec![Spoke::default(); config.bars.bar_count],
        };
        let mut burst = Self {
            config,
            bars,
            frame,
        };
        burst.layout(0.0);
        Ok(burst)
    }

    pub fn config(&self) -> &RadialConfig {
        &self.config
    }

    pub fn radial(&self) -> &RadialFrame {
        &self.frame
    }

    fn layout(&mut self, beat_intensity: f32) {
        let count = self.frame.spokes.len();
        let slot = TAU / count as f32;
        let span = self.config.outer_radius - self.config.inner_radius;
        let intensity = beat_intensity.clamp(0.0, 1.0);
        let stretch = 1.0 + self.config.amplitude_boost * intensity;
        let width =
            (slot * self.config.base_width * (1.0 + self.config.width_boost * intensity)).min(slot);

        for (i, (spoke, amplitude)) in self
            .frame
            .spokes
            .iter_mut()
            .zip(self.bars.normalized())
            .enumerate()
        {
            *spoke = Spoke {
                angle: i as f32 * slot - FRAC_PI_2,
                inner: self.config.inner_radius,
                length: span * amplitude * stretch,
                width,
            };
        }
    }
}

impl SignalRenderer for RadialBurst {
    fn kind(&self) -> RendererKind {
        RendererKind::Radial
    }

    fn port_config(&self) -> PortConfig {
        self.config.bars.port_config()
    }

    fn produce_frame(&mut self, samples: &SampleBuffer, cx: &TickContext) -> RenderFrame<'_> {
        self.bars.update_from_buffer(samples.as_slice());
        self.layout(cx.beat_intensity);
        RenderFrame::Radial(&self.frame)
    }

    fn produce_fallback(
        &mut self,
        animator: &mut FallbackAnimator,
        cx: &TickContext,
    ) -> RenderFrame<'_> {
        let targets = animator.targets(self.config.bars.bar_count, cx);
        self.bars.update_from_targets(targets);
        self.layout(cx.beat_intensity);
        RenderFrame::Radial(&self.frame)
    }

    fn frame(&self) -> RenderFrame<'_> {
        RenderFrame::Radial(&self.frame)
    }

    fn reset(&mut self) {
        self.bars.reset();
        self.layout(0.0);
    }
}
