//! Tempo estimation from beat timestamps.

use std::collections::VecDeque;
use std::time::Duration;

/// Lower edge of the reported tempo range.
pub const MIN_BPM: f32 = 60.0;

/// Upper edge of the reported tempo range.
pub const MAX_BPM: f32 = 200.0;

/// Beats kept for the estimate.
const BEAT_WINDOW: usize = 16;

/// Beats needed before an estimate is made.
const MIN_BEATS: usize = 4;

/// Estimates BPM from the intervals between the most recent beats.
///
/// Outlying intervals are dropped by keeping the interquartile range, and the
/// result is folded by octaves into [`MIN_BPM`]..=[`MAX_BPM`] since the
/// detector often locks onto half or double time.
#[derive(Debug, Clone, Default)]
pub struct TempoEstimator {
    beats: VecDeque<Duration>,
    intervals: Vec<f64>,
    bpm: Option<f32>,
}

impl TempoEstimator {
    pub fn new() -> Self {
        Self {
            beats: VecDeque::with_capacity(BEAT_WINDOW),
            intervals: Vec::with_capacity(BEAT_WINDOW),
            bpm: None,
        }
    }

    /// Record a beat and return the updated estimate.
    pub fn push(&mut self, timestamp: Duration) -> Option<f32> {
        if self.beats.back().is_some_and(|&last| timestamp <= last) {
            return self.bpm;
        }

        self.beats.push_back(timestamp);
        if self.beats.len() > BEAT_WINDOW {
            self.beats.pop_front();
        }

        self.bpm = self.estimate();
        self.bpm
    }

    /// Current estimate, rounded to 0.1 BPM.
    pub fn bpm(&self) -> Option<f32> {
        self.bpm
    }

    pub fn reset(&mut self) {
        self.beats.clear();
        self.bpm = None;
    }

    fn estimate(&mut self) -> Option<f32> {
        if self.beats.len() < MIN_BEATS {
            return None;
        }

        self.intervals.clear();
        self.intervals.extend(
            self.beats
                .iter()
                .zip(self.beats.iter().skip(1))
                .map(|(a, b)| (*b - *a).as_secs_f64()),
        );
        self.intervals.sort_by(f64::total_cmp);

        let trimmed = if self.intervals.len() >= 4 {
            let quarter = self.intervals.len() / 4;
            &self.intervals[quarter..self.intervals.len() - quarter]
        } else {
            &self.intervals[..]
        };

        let mean = trimmed.iter().sum::<f64>() / trimmed.len() as f64;
        if mean <= 0.001 {
            return None;
        }

        let mut bpm = (60.0 / mean) as f32;
        while bpm > MAX_BPM {
            bpm /= 2.0;
        }
        while bpm < MIN_BPM {
            bpm *= 2.0;
        }

        Some((bpm * 10.0).round() / 10.0)
    }
}
