//! Audio front end: microphone capture, spectrum analysis, and offline replay.
//!
//! Live audio is captured via CPAL, downmixed to mono, and cut into
//! hop-sized chunks on the callback thread. The engine thread feeds those
//! chunks to a [`SpectrumAnalyser`] and hands the resulting frames to the
//! pitch session. Offline replay drives the same path from synthesized PCM.

/// Sample rate used for synthesized audio when no device is involved.
pub const SIMULATION_SAMPLE_RATE: u32 = 48_000;

mod capture;
mod dispatch;
mod offline;
mod spectrum;

pub use capture::{list_input_devices, MicInput, MicStream};
pub use dispatch::hop_samples;
pub use offline::{
    parse_tone_script, replay_pcm, synthesize_tones, ReplayOutcome, ToneSegment, TONE_AMPLITUDE,
};
pub use spectrum::{SpectrumAnalyser, MAX_DECIBELS, MIN_DECIBELS};
