//! Oscilloscope renderer.

use crate::bars::validate_alpha;
use crate::smoothing::approach;
use crate::{
    FallbackAnimator, Point, RenderFrame, RendererKind, SignalRenderer, TickContext, WaveformFrame,
};
use airwave_core::{Error, PortConfig, Result, SampleBuffer};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WaveformConfig {
    /// Points in the polyline
    pub points: usize,
    /// Time samples requested from the port
    pub samples: usize,
    /// Display width the points span
    pub width: f32,
    /// Display height; full scale swings `height / 2` each way
    pub height: f32,
    pub alpha: f32,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            points: 256,
            samples: 1024,
            width: 1.0,
            height: 1.0,
            alpha: 0.35,
        }
    }
}

impl WaveformConfig {
    pub fn port_config(&self) -> PortConfig {
        PortConfig::time(self.samples)
    }

    pub fn validate(&self) -> Result<()> {
        if self.points < 2 {
            return Err(Error::InvalidConfig(format!(
                "waveform needs at least 2 points, got {}",
                self.points
            )));
        }
        self.port_config().validate()?;
        if !(self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "waveform size {}x{} must be positive",
                self.width, self.height
            )));
        }
        validate_alpha(self.alpha)
    }
}

/// Time-domain polyline by linear interpolation across the width.
#[derive(Debug, Clone)]
pub struct Oscilloscope {
    config: WaveformConfig,
    frame: WaveformFrame,
}

impl Oscilloscope {
    pub fn new(config: WaveformConfig) -> Result<Self> {
        config.validate()?;
        let last = (config.points - 1) as f32;
        let points = (0..config.points)
            .map(|i| Point::new(i as f32 / last * config.width, 0.0))
            .collect();
        Ok(Self {
            config,
            frame: WaveformFrame { points },
        })
    }

    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    pub fn waveform(&self) -> &WaveformFrame {
        &self.frame
    }

    fn update(&mut self, raw_at: impl Fn(f32) -> f32) {
        let last = (self.config.points - 1) as f32;
        let half = self.config.height * 0.5;
        let alpha = self.config.alpha;

        for (i, point) in self.frame.points.iter_mut().enumerate() {
            let raw = raw_at(i as f32 / last).clamp(-1.0, 1.0) * half;
            point.y = approach(point.y, raw, alpha);
        }
    }
}

/// Linearly interpolated amplitude in `-1.0..=1.0` at `position` (`0.0..=1.0`).
fn interpolate(bytes: &[u8], position: f32) -> f32 {
    let center = f32::from(SampleBuffer::TIME_ZERO);
    match bytes.len() {
        0 => 0.0,
        1 => (f32::from(bytes[0]) - center) / center,
        len => {
            let pos = position * (len - 1) as f32;
            let lo = (pos.floor() as usize).min(len - 1);
            let hi = (lo + 1).min(len - 1);
            let frac = pos - lo as f32;
            let a = f32::from(bytes[lo]);
            let b = f32::from(bytes[hi]);
            (a + (b - a) * frac - center) / center
        }
    }
}

impl SignalRenderer for Oscilloscope {
    fn kind(&self) -> RendererKind {
        RendererKind::Waveform
    }

    fn port_config(&self) -> PortConfig {
        self.config.port_config()
    }

    fn produce_frame(&mut self, samples: &SampleBuffer, _cx: &TickContext) -> RenderFrame<'_> {
        let bytes = samples.as_slice();
        self.update(|position| interpolate(bytes, position));
        RenderFrame::Waveform(&self.frame)
    }

    fn produce_fallback(
        &mut self,
        animator: &mut FallbackAnimator,
        cx: &TickContext,
    ) -> RenderFrame<'_> {
        let swings = animator.oscillation(self.config.points, cx);
        let last = (self.config.points - 1) as f32;
        self.update(|position| {
            let i = (position * last).round() as usize;
            swings.get(i).copied().unwrap_or(0.0)
        });
        RenderFrame::Waveform(&self.frame)
    }

    fn frame(&self) -> RenderFrame<'_> {
        RenderFrame::Waveform(&self.frame)
    }

    fn reset(&mut self) {
        for point in &mut self.frame.points {
            point.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn scope(points: usize, alpha: f32) -> Oscilloscope {
        Oscilloscope::new(WaveformConfig {
            points,
            alpha,
            height: 2.0,
            ..WaveformConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_points_span_width() {
        let scope = scope(5, 1.0);
        let xs: Vec<f32> = scope.waveform().points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_linear_interpolation() {
        let mut scope = scope(5, 1.0);
        let samples = SampleBuffer::time(vec![0, 128, 255]);
        scope.produce_frame(&samples, &TickContext::default());

        let ys: Vec<f32> = scope.waveform().points.iter().map(|p| p.y).collect();
        assert_relative_eq!(ys[0], -1.0);
        assert_relative_eq!(ys[1], -0.5);
        assert_relative_eq!(ys[2], 0.0);
        assert_relative_eq!(ys[4], 127.0 / 128.0);
    }

    #[test]
    fn test_smoothing_between_frames() {
        let mut scope = scope(2, 0.5);
        scope.produce_frame(&SampleBuffer::time(vec![0, 0]), &TickContext::default());
        assert_relative_eq!(scope.waveform().points[0].y, -0.5);
    }

    #[test]
    fn test_empty_buffer_is_flat() {
        let mut scope = scope(8, 1.0);
        scope.produce_frame(&SampleBuffer::time(vec![]), &TickContext::default());
        assert!(scope.waveform().points.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_fallback_flat_when_stopped() {
        let mut scope = scope(16, 1.0);
        let mut animator = FallbackAnimator::default();
        let playing = TickContext::new(Duration::from_millis(700), true);
        scope.produce_fallback(&mut animator, &playing);
        assert!(scope.waveform().points.iter().any(|p| p.y != 0.0));

        let stopped = TickContext::new(Duration::from_millis(700), false);
        scope.produce_fallback(&mut animator, &stopped);
        assert!(scope.waveform().points.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_invalid_config() {
        let config = WaveformConfig {
            points: 1,
            ..WaveformConfig::default()
        };
        assert!(Oscilloscope::new(config).is_err());
        let config = WaveformConfig {
            samples: 1000,
            ..WaveformConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
