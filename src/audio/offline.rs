//! Microphone-free replay: synthesize tone scripts and drive a session with
//! them on a virtual clock derived from the number of samples consumed.

use super::dispatch::hop_samples;
use super::spectrum::SpectrumAnalyser;
use crate::clock::Millis;
use crate::dwell::Action;
use crate::session::{PitchSession, SessionState, TickReport};
use anyhow::{bail, Context, Result};
use std::f32::consts::TAU;

/// Peak amplitude of synthesized tones. Loud enough to clear the magnitude
/// floor, quiet enough that the peak bin does not saturate the byte scale.
pub const TONE_AMPLITUDE: f32 = 0.1;

/// One step of a tone script. `hz == 0` is silence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSegment {
    pub hz: f32,
    pub duration_ms: u64,
}

/// Parse `HZ:MS[,HZ:MS...]`, e.g. `"300:1200,0:200,330:1500"`.
pub fn parse_tone_script(script: &str) -> Result<Vec<ToneSegment>> {
    let mut segments = Vec::new();
    for (index, part) in script.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (hz, ms) = part
            .split_once(':')
            .with_context(|| format!("segment {} ('{part}') must look like HZ:MS", index + 1))?;
        let hz: f32 = hz
            .trim()
            .parse()
            .with_context(|| format!("segment {}: invalid frequency '{hz}'", index + 1))?;
        if !hz.is_finite() || hz < 0.0 {
            bail!("segment {}: frequency must be zero or positive", index + 1);
        }
        let duration_ms: u64 = ms
            .trim()
            .parse()
            .with_context(|| format!("segment {}: invalid duration '{ms}'", index + 1))?;
        if duration_ms == 0 {
            bail!("segment {}: duration must be positive", index + 1);
        }
        segments.push(ToneSegment { hz, duration_ms });
    }
    if segments.is_empty() {
        bail!("tone script is empty");
    }
    Ok(segments)
}

/// Render the script as mono PCM. Phase carries across segments so tone
/// changes do not click.
pub fn synthesize_tones(segments: &[ToneSegment], sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate.max(1) as f32;
    let mut samples = Vec::new();
    let mut phase = 0.0f32;
    for segment in segments {
        let count = (u64::from(sample_rate) * segment.duration_ms / 1000) as usize;
        samples.reserve(count);
        let step = TAU * segment.hz / rate;
        for _ in 0..count {
            if segment.hz > 0.0 {
                samples.push(TONE_AMPLITUDE * phase.sin());
                phase = (phase + step) % TAU;
            } else {
                samples.push(0.0);
            }
        }
    }
    samples
}

/// Summary of an offline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub ticks: usize,
    pub actions: Vec<(Millis, Action)>,
    pub state: SessionState,
    pub ended_at: Millis,
}

/// Feed `pcm` to `session` one tick at a time. The tick timestamp is `start`
/// plus the audio consumed so far; replay stops as soon as the session ends.
pub fn replay_pcm<F>(
    session: &mut PitchSession,
    analyser: &mut SpectrumAnalyser,
    pcm: &[f32],
    tick_ms: u64,
    start: Millis,
    mut on_tick: F,
) -> ReplayOutcome
where
    F: FnMut(&TickReport),
{
    let sample_rate = analyser.sample_rate().max(1);
    let hop = hop_samples(sample_rate, tick_ms);
    let mut consumed: u64 = 0;
    let mut outcome = ReplayOutcome {
        ticks: 0,
        actions: Vec::new(),
        state: session.state(),
        ended_at: start,
    };

    for chunk in pcm.chunks(hop) {
        if !session.is_listening() {
            break;
        }
        analyser.push_samples(chunk);
        consumed += chunk.len() as u64;
        let now = start.plus(consumed * 1000 / u64::from(sample_rate));
        let frame = analyser.frame();
        let report = session.tick(Some(&frame), now);
        outcome.ticks += 1;
        outcome.ended_at = now;
        if let Some(action) = report.action {
            outcome.actions.push((now, action));
        }
        on_tick(&report);
    }

    outcome.state = session.state();
    outcome
}
