//! Smoothing and peak-hold shared by all renderers.

/// One step of exponential smoothing: `prev + (raw - prev) * alpha`.
///
/// `alpha >= 1.0` lands exactly on `raw`.
#[inline]
pub fn approach(prev: f32, raw: f32, alpha: f32) -> f32 {
    if alpha >= 1.0 {
        raw
    } else {
        prev + (raw - prev) * alpha
    }
}

/// Position-dependent gain boosting the upper end of a spectrum.
///
/// `gain(p) = 1 + boost * p^exponent` for `p` in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GainCurve {
    pub boost: f32,
    pub exponent: f32,
}

impl Default for GainCurve {
    fn default() -> Self {
        Self {
            boost: 0.8,
            exponent: 1.5,
        }
    }
}

impl GainCurve {
    /// No boost anywhere.
    pub const FLAT: GainCurve = GainCurve {
        boost: 0.0,
        exponent: 1.0,
    };

    pub fn gain(&self, position: f32) -> f32 {
        1.0 + self.boost * position.clamp(0.0, 1.0).powf(self.exponent)
    }
}

/// Peak marker: jumps up instantly, holds, then decays at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakHold {
    value: f32,
    hold_frames: u32,
    decay: f32,
    remaining: u32,
}

impl PeakHold {
    pub fn new(initial: f32, hold_frames: u32, decay: f32) -> Self {
        Self {
            value: initial,
            hold_frames,
            decay,
            remaining: 0,
        }
    }

    /// Advance one tick with the current level and return the marker.
    ///
    /// The marker never drops below `level`.
    pub fn update(&mut self, level: f32) -> f32 {
        if level > self.value {
            self.value = level;
            self.remaining = self.hold_frames;
        } else if self.remaining > 0 {
            self.remaining -= 1;
        } else {
            self.value = (self.value - self.decay).max(level);
        }
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.remaining = 0;
    }
}
