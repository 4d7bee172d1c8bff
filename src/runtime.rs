//! The single-threaded polling loop that ties capture, analysis, the pitch
//! session, and a renderer together.

use crate::audio::{MicStream, SpectrumAnalyser};
use crate::clock::{Clock, Millis};
use crate::config::EngineConfig;
use crate::date::DateSelection;
use crate::log_debug;
use crate::session::{PitchSession, SessionState, TickReport};
use anyhow::{bail, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Anything that yields mono PCM chunks for the loop.
pub trait ChunkSource {
    /// Wait up to `timeout`. `Ok(None)` means nothing arrived; `Err` ends the loop.
    fn recv_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<f32>>>;
}

impl ChunkSource for MicStream {
    fn recv_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<f32>>> {
        MicStream::recv_chunk(self, timeout)
    }
}

impl ChunkSource for Receiver<Vec<f32>> {
    fn recv_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<f32>>> {
        match self.recv_timeout(timeout) {
            Ok(chunk) => Ok(Some(chunk)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => bail!("audio input disconnected"),
        }
    }
}

/// Presentation seam. The loop calls these in order: `started`, then any mix
/// of `tick`/`repaint`, then `finished` (or `failed`).
pub trait DateRenderer {
    fn started(&mut self, selection: &DateSelection, now: Millis) -> Result<()>;

    fn tick(&mut self, report: &TickReport) -> Result<()>;

    /// Stateless progress refresh between ticks.
    fn repaint(&mut self, progress: Option<f32>, now: Millis) -> Result<()>;

    fn finished(&mut self, state: SessionState) -> Result<()>;

    fn failed(&mut self, _err: &anyhow::Error) -> Result<()> {
        Ok(())
    }

    /// Polled once per loop iteration; `true` cancels the session.
    fn cancel_requested(&mut self) -> Result<bool> {
        Ok(false)
    }
}

/// Run until the session submits, the renderer cancels, or the input fails.
pub fn run_loop<S, C, R>(
    session: &mut PitchSession,
    source: &mut S,
    analyser: &mut SpectrumAnalyser,
    clock: &C,
    renderer: &mut R,
    cfg: &EngineConfig,
) -> Result<SessionState>
where
    S: ChunkSource + ?Sized,
    C: Clock + ?Sized,
    R: DateRenderer + ?Sized,
{
    let wait = Duration::from_millis(cfg.tick_ms.max(1));
    let started_at = clock.now();
    renderer.started(&session.selection(), started_at)?;
    let mut last_repaint = started_at;
    log_debug(&format!(
        "runtime loop started: tick={}ms repaint={}ms",
        cfg.tick_ms, cfg.repaint_ms
    ));

    while session.is_listening() {
        if renderer.cancel_requested()? {
            session.cancel();
            break;
        }

        let stepped = step(session, source, analyser, clock, renderer, wait).and_then(|()| {
            let now = clock.now();
            if now.abs_diff(last_repaint) >= cfg.repaint_ms {
                renderer.repaint(session.submit_progress(now), now)?;
                last_repaint = now;
            }
            Ok(())
        });
        if let Err(err) = stepped {
            log_debug(&format!("runtime loop stopped: {err:#}"));
            tracing::error!(error = %format!("{err:#}"), "session loop failed");
            if let Err(report_err) = renderer.failed(&err) {
                log_debug(&format!("failed to report loop error: {report_err:#}"));
            }
            return Err(err);
        }
    }

    let state = session.state();
    renderer.finished(state)?;
    Ok(state)
}

/// One wait on the input. A quiet wait still runs the submit watchdog, so a
/// stuck device cannot hold a confirmation open.
fn step<S, C, R>(
    session: &mut PitchSession,
    source: &mut S,
    analyser: &mut SpectrumAnalyser,
    clock: &C,
    renderer: &mut R,
    wait: Duration,
) -> Result<()>
where
    S: ChunkSource + ?Sized,
    C: Clock + ?Sized,
    R: DateRenderer + ?Sized,
{
    match source.recv_chunk(wait)? {
        Some(chunk) => {
            analyser.push_samples(&chunk);
            let frame = analyser.frame();
            let report = session.tick(Some(&frame), clock.now());
            renderer.tick(&report)
        }
        None => {
            session.expire_stale(clock.now());
            Ok(())
        }
    }
}
