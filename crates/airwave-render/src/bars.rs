//! Bar spectrum renderer.

use crate::smoothing::{approach, GainCurve, PeakHold};
use crate::{
    BarFrame, FallbackAnimator, RenderFrame, RendererKind, SignalRenderer, TickContext,
};
use airwave_core::{Error, PortConfig, Result, SampleBuffer};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BarSpectrumConfig {
    /// Number of display bars
    pub bar_count: usize,
    /// Frequency bins requested from the port
    pub bins: usize,
    /// Minimum visible height
    pub floor: f32,
    /// Largest height, the buffer's max representable value
    pub max: f32,
    /// Boost applied progressively toward the higher bars
    pub gain: GainCurve,
    /// Smoothing factor toward the new raw value
    pub alpha: f32,
    /// Ticks a peak marker holds before decaying
    pub peak_hold_frames: u32,
    /// Peak decay per tick, in height units
    pub peak_decay: f32,
}

impl Default for BarSpectrumConfig {
    fn default() -> Self {
        Self {
            bar_count: 32,
            bins: 256,
            floor: 4.0,
            max: f32::from(SampleBuffer::MAX_VALUE),
            gain: GainCurve::default(),
            alpha: 0.3,
            peak_hold_frames: 20,
            peak_decay: 2.0,
        }
    }
}

impl BarSpectrumConfig {
    pub fn with_bars(mut self, bar_count: usize) -> Self {
        self.bar_count = bar_count;
        self
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_floor(mut self, floor: f32) -> Self {
        self.floor = floor;
        self
    }

    pub fn port_config(&self) -> PortConfig {
        PortConfig::frequency(self.bins)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bar_count == 0 {
            return Err(Error::InvalidConfig("bar count must be positive".into()));
        }
        self.port_config().validate()?;
        if !self.max.is_finite() || self.max > f32::from(SampleBuffer::MAX_VALUE) {
            return Err(Error::InvalidConfig(format!(
                "bar max {} must be finite and within the buffer maximum",
                self.max
            )));
        }
        // Written so a NaN floor fails too.
        if !(self.floor >= 0.0 && self.floor < self.max) {
            return Err(Error::InvalidConfig(format!(
                "bar floor {} must be in 0.0..{}",
                self.floor, self.max
            )));
        }
        validate_alpha(self.alpha)?;
        if !self.peak_decay.is_finite() || self.peak_decay < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "peak decay {} must be non-negative",
                self.peak_decay
            )));
        }
        if !self.gain.boost.is_finite() || self.gain.boost < 0.0 || !self.gain.exponent.is_finite()
        {
            return Err(Error::InvalidConfig(format!(
                "gain curve {:?} must be finite and non-negative",
                self.gain
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_alpha(alpha: f32) -> Result<()> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "smoothing factor {alpha} out of range (0.0-1.0]"
        )))
    }
}

/// Vertical bars over contiguous bin slices.
#[derive(Debug, Clone)]
pub struct BarSpectrum {
    config: BarSpectrumConfig,
    raw: Vec<f32>,
    peaks: Vec<PeakHold>,
    frame: BarFrame,
}

impl BarSpectrum {
    pub fn new(config: BarSpectrumConfig) -> Result<Self> {
        config.validate()?;
        let count = config.bar_count;
        Ok(Self {
            raw: vec![config.floor; count],
            peaks: vec![PeakHold::new(config.floor, config.peak_hold_frames, config.peak_decay); count],
            frame: BarFrame {
                heights: vec![config.floor; count],
                peaks: vec![config.floor; count],
                max: config.max,
            },
            config,
        })
    }

    pub fn config(&self) -> &BarSpectrumConfig {
        &self.config
    }

    pub fn bars(&self) -> &BarFrame {
        &self.frame
    }

    /// Heights normalized to `0.0..=1.0` of `max`.
    pub fn normalized(&self) -> impl Iterator<Item = f32> + '_ {
        let max = self.config.max;
        self.frame.heights.iter().map(move |&h| h / max)
    }

    pub(crate) fn update_from_buffer(&mut self, bins: &[u8]) {
        let count = self.config.bar_count;
        let len = bins.len();

        for (i, raw) in self.raw.iter_mut().enumerate() {
            let average = if len == 0 {
                0.0
            } else {
                let start = (i * len / count).min(len - 1);
                let end = ((i + 1) * len / count).clamp(start + 1, len);
                let slice = &bins[start..end];
                slice.iter().map(|&b| f32::from(b)).sum::<f32>() / slice.len() as f32
            };
            let position = if count > 1 {
                i as f32 / (count - 1) as f32
            } else {
                0.0
            };
            *raw = average * self.config.gain.gain(position);
        }

        self.settle();
    }

    pub(crate) fn update_from_targets(&mut self, targets: &[f32]) {
        let span = self.config.max - self.config.floor;
        for (raw, &target) in self.raw.iter_mut().zip(targets) {
            *raw = self.config.floor + target * span;
        }
        self.settle();
    }

    fn settle(&mut self) {
        let BarSpectrumConfig {
            floor, max, alpha, ..
        } = self.config;

        let bars = self
            .frame
            .heights
            .iter_mut()
            .zip(&mut self.frame.peaks)
            .zip(&mut self.peaks)
            .zip(&self.raw);
        for (((height, peak), hold), &raw) in bars {
            let target = if raw.is_finite() { raw } else { floor };
            let target = target.clamp(floor, max);
            *height = approach(*height, target, alpha).clamp(floor, max);
            *peak = hold.update(*height);
        }
    }
}

impl SignalRenderer for BarSpectrum {
    fn kind(&self) -> RendererKind {
        RendererKind::Bars
    }

    fn port_config(&self) -> PortConfig {
        self.config.port_config()
    }

    fn produce_frame(&mut self, samples: &SampleBuffer, _cx: &TickContext) -> RenderFrame<'_> {
        self.update_from_buffer(samples.as_slice());
        RenderFrame::Bars(&self.frame)
    }

    fn produce_fallback(
        &mut self,
        animator: &mut FallbackAnimator,
        cx: &TickContext,
    ) -> RenderFrame<'_> {
        let targets = animator.targets(self.config.bar_count, cx);
        self.update_from_targets(targets);
        RenderFrame::Bars(&self.frame)
    }

    fn frame(&self) -> RenderFrame<'_> {
        RenderFrame::Bars(&self.frame)
    }

    fn reset(&mut self) {
        let floor = self.config.floor;
        self.raw.fill(floor);
        self.frame.heights.fill(floor);
        self.frame.peaks.fill(floor);
        for hold in &mut self.peaks {
            hold.reset(floor);
        }
    }
}
