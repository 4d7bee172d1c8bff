//! Pitch front end: spectral peak picking, smoothing, and zone mapping.
//!
//! Each tick turns one spectrum frame into an optional frequency, folds it
//! into a weighted rolling average, and maps the result onto one of four
//! zones spread evenly across the configured pitch window.

mod estimator;
mod note;
mod smoother;
#[cfg(test)]
mod tests;
mod zone;

pub use estimator::{FrequencyEstimator, SpectrumFrame};
pub use note::note_name;
pub use smoother::FrequencySmoother;
pub use zone::{zone_for_position, Zone, ZoneMapper};

/// Inclusive frequency range the engine listens to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchWindow {
    pub min_hz: f32,
    pub max_hz: f32,
}

impl PitchWindow {
    pub fn new(min_hz: f32, max_hz: f32) -> Self {
        Self { min_hz, max_hz }
    }

    pub fn contains(&self, hz: f32) -> bool {
        hz >= self.min_hz && hz <= self.max_hz
    }

    /// Position of `hz` inside the window as a percentage, clamped to `0..=100`.
    pub fn position_percent(&self, hz: f32) -> f32 {
        let span = self.max_hz - self.min_hz;
        if span.is_nan() || span <= 0.0 || !hz.is_finite() {
            return 0.0;
        }
        ((hz - self.min_hz) / span).clamp(0.0, 1.0) * 100.0
    }
}
