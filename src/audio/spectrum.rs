//! Windowed FFT turning mono PCM into byte-scaled spectrum frames.
//!
//! Magnitudes follow the browser analyser convention the magnitude floor is
//! tuned for: `|X[k]| / N` in decibels, mapped from `[-100, -30]` dB onto
//! `0..=255` and floored. Only the latest `fft_size` samples are analysed;
//! a partially filled history is zero-padded at the front.

use crate::pitch::SpectrumFrame;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    sample_rate: u32,
    window: Vec<f32>,
    history: VecDeque<f32>,
    scratch: Vec<Complex<f32>>,
}

impl fmt::Debug for SpectrumAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyser")
            .field("fft_size", &self.fft_size)
            .field("sample_rate", &self.sample_rate)
            .field("buffered", &self.history.len())
            .finish()
    }
}

impl SpectrumAnalyser {
    /// `fft_size` is rounded up to a power of two (minimum 2).
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        let fft_size = fft_size.max(2).next_power_of_two();
        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            fft_size,
            sample_rate,
            window: blackman_window(fft_size),
            history: VecDeque::with_capacity(fft_size),
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of bins per frame (half the FFT size).
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Append mono samples, keeping only the most recent `fft_size`.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let skip = samples.len().saturating_sub(self.fft_size);
        for &sample in &samples[skip..] {
            if self.history.len() == self.fft_size {
                self.history.pop_front();
            }
            self.history.push_back(if sample.is_finite() { sample } else { 0.0 });
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Spectrum of the current history.
    pub fn frame(&mut self) -> SpectrumFrame {
        let pad = self.fft_size - self.history.len();
        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { self.history[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let scale = 1.0 / self.fft_size as f32;
        let magnitudes = self.scratch[..self.bin_count()]
            .iter()
            .map(|c| to_byte_scale(c.norm() * scale))
            .collect();
        SpectrumFrame::new(magnitudes, self.sample_rate)
    }
}

fn blackman_window(len: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..len)
        .map(|i| {
            let x = i as f32 / len as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}

pub(super) fn to_byte_scale(magnitude: f32) -> f32 {
    if magnitude.is_nan() || magnitude <= 0.0 {
        return 0.0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0).floor()
}
