//! Byte-scaled magnitude spectrum for frequency ports.
//!
//! Follows the conventional analyser transform: Blackman window, FFT,
//! magnitude normalized by the FFT size, temporal smoothing, then a linear
//! map of `[min_db, max_db]` onto `0..=255`.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

pub(crate) struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl SpectrumAnalyser {
    pub(crate) fn new(fft_size: usize, smoothing: f32, min_db: f32, max_db: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            fft,
            fft_size,
            window: blackman_window(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; fft_size / 2],
            smoothing,
            min_db,
            max_db,
        }
    }

    /// Transform `samples` (exactly `fft_size` long) into `out` (`fft_size / 2` bytes).
    pub(crate) fn process(&mut self, samples: &[f32], out: &mut [u8]) {
        debug_assert_eq!(samples.len(), self.fft_size);

        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let norm = 1.0 / self.fft_size as f32;
        let range = self.max_db - self.min_db;

        for ((byte, smoothed), bin) in out.iter_mut().zip(&mut self.smoothed).zip(&self.buffer) {
            let magnitude = bin.norm() * norm;
            let mut value = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;
            if !value.is_finite() {
                value = 0.0;
            }
            *smoothed = value;

            *byte = if value > 0.0 {
                let db = 20.0 * value.log10();
                (255.0 * (db - self.min_db) / range).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
    }

    #[cfg(test)]
    fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;

    (0..size)
        .map(|i| {
            let phase = 2.0 * core::f32::consts::PI * i as f32 / size as f32;
            A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos()
        })
        .collect()
}
