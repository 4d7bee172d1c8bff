use super::PitchWindow;

/// Magnitude spectrum for one tick. Bin `i` covers `i * nyquist / bin_count` Hz.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    magnitudes: Vec<f32>,
    sample_rate: u32,
}

impl SpectrumFrame {
    pub fn new(magnitudes: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            magnitudes,
            sample_rate,
        }
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bin_count(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn hz_per_bin(&self) -> f32 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        (self.sample_rate as f32 / 2.0) / self.magnitudes.len() as f32
    }

    pub fn bin_to_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.hz_per_bin()
    }
}

/// Picks the loudest bin and accepts it only when it is loud enough and in range.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyEstimator {
    window: PitchWindow,
    min_magnitude: f32,
}

impl FrequencyEstimator {
    pub fn new(window: PitchWindow, min_magnitude: f32) -> Self {
        Self {
            window,
            min_magnitude,
        }
    }

    pub fn window(&self) -> PitchWindow {
        self.window
    }

    /// Returns the estimated fundamental in Hz, or `None` for "no signal".
    pub fn estimate(&self, frame: &SpectrumFrame) -> Option<f32> {
        let (bin, magnitude) = peak_bin(frame.magnitudes())?;
        if magnitude <= self.min_magnitude {
            return None;
        }
        let hz = frame.bin_to_hz(bin);
        if hz.is_finite() && self.window.contains(hz) {
            Some(hz)
        } else {
            None
        }
    }
}

/// Loudest finite bin; the first one wins ties.
pub(super) fn peak_bin(magnitudes: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in magnitudes.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best
}
