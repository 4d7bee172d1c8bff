//! One pitch-driven picking session: spectrum in, date actions out.


use crate::clock::Millis;
use crate::config::EngineConfig;
use crate::date::{ApplyOutcome, CalendarDate, DatePicker, DateSelection, YearBounds};
use crate::dwell::{Action, DwellConfig, DwellMachine, DwellPhase};
use crate::pitch::{
    FrequencyEstimator, FrequencySmoother, PitchWindow, SpectrumFrame, Zone, ZoneMapper,
};
use crate::{log_debug, log_debug_content};
use serde::Serialize;

/// Lifecycle of a session. Only `Listening` accepts ticks that change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Listening,
    Submitted { date: CalendarDate },
    Cancelled,
}

/// Everything one tick observed and decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub at: Millis,
    pub raw_hz: Option<f32>,
    pub smoothed_hz: Option<f32>,
    /// Present only when the tick carried a signal.
    pub zone: Option<Zone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_percent: Option<f32>,
    pub action: Option<Action>,
    pub progress: Option<f32>,
    pub phase: DwellPhase,
    pub selection: DateSelection,
    pub submitted: Option<CalendarDate>,
    /// Zone differs from the previous tick's.
    #[serde(skip)]
    pub zone_changed: bool,
}

pub struct PitchSession {
    estimator: FrequencyEstimator,
    smoother: FrequencySmoother,
    mapper: ZoneMapper,
    dwell: DwellMachine,
    picker: DatePicker,
    state: SessionState,
    last_zone: Option<Zone>,
}

impl PitchSession {
    pub fn new(cfg: &EngineConfig, start: CalendarDate) -> Self {
        let window = PitchWindow::new(cfg.min_freq_hz, cfg.max_freq_hz);
        Self {
            estimator: FrequencyEstimator::new(window, cfg.min_magnitude),
            smoother: FrequencySmoother::new(cfg.smoothing_window),
            mapper: ZoneMapper::new(window),
            dwell: DwellMachine::new(DwellConfig::from(cfg)),
            picker: DatePicker::new(start, YearBounds::new(cfg.min_year, cfg.max_year)),
            state: SessionState::Listening,
            last_zone: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Listening
    }

    pub fn selection(&self) -> DateSelection {
        self.picker.selection()
    }

    pub fn dwell_phase(&self) -> DwellPhase {
        self.dwell.phase()
    }

    /// Read-only submit progress for the repaint tick.
    pub fn submit_progress(&self, now: Millis) -> Option<f32> {
        if !self.is_listening() {
            return None;
        }
        self.dwell.submit_progress(now)
    }

    /// Run the stale-submit watchdog on a tick that brought no audio.
    pub fn expire_stale(&mut self, now: Millis) -> bool {
        if !self.is_listening() {
            return false;
        }
        let expired = self.dwell.expire_stale(now);
        if expired {
            log_debug(&format!("submit confirmation expired at {now} without input"));
        }
        expired
    }

    /// Stop listening without a date. No-op once the session has ended.
    pub fn cancel(&mut self) {
        if self.is_listening() {
            log_debug("session cancelled");
            tracing::info!("session cancelled");
            self.state = SessionState::Cancelled;
            self.dwell.reset();
        }
    }

    /// Process one spectrum frame. `None` (or an unusable frame) counts as no signal.
    pub fn tick(&mut self, frame: Option<&SpectrumFrame>, now: Millis) -> TickReport {
        let raw_hz = frame.and_then(|frame| self.estimator.estimate(frame));
        let smoothed_hz = self.smoother.push(raw_hz);
        let zone = match (raw_hz, smoothed_hz) {
            (Some(_), Some(hz)) => Some(self.mapper.map(hz)),
            _ => None,
        };
        let position_percent = match (zone, smoothed_hz) {
            (Some(_), Some(hz)) => Some(self.mapper.position_percent(hz)),
            _ => None,
        };

        let zone_changed = zone != self.last_zone;
        if zone_changed {
            tracing::debug!(
                from = self.last_zone.map(Zone::label),
                to = zone.map(Zone::label),
                now = now.0,
                "zone changed"
            );
            self.last_zone = zone;
        }

        let (action, progress) = if self.is_listening() {
            let outcome = self.dwell.observe(zone, now);
            if let Some(action) = outcome.action {
                self.apply(action, smoothed_hz);
            }
            (outcome.action, outcome.progress)
        } else {
            (None, None)
        };

        TickReport {
            at: now,
            raw_hz,
            smoothed_hz,
            zone,
            position_percent,
            action,
            progress,
            phase: self.dwell.phase(),
            selection: self.picker.selection(),
            submitted: self.picker.submitted(),
            zone_changed,
        }
    }

    fn apply(&mut self, action: Action, smoothed_hz: Option<f32>) {
        log_debug(&format!("action {}", action.label()));
        if let Some(hz) = smoothed_hz {
            log_debug_content(&format!("action {} at {hz:.1} Hz", action.label()));
        }
        match self.picker.apply(action) {
            ApplyOutcome::Updated => {
                let selection = self.picker.selection();
                tracing::info!(
                    action = action.label(),
                    focused = selection.focused.label(),
                    date = %selection.date(),
                    "selection updated"
                );
            }
            ApplyOutcome::Submitted(date) => {
                log_debug(&format!("date submitted: {date}"));
                tracing::info!(date = %date, "date submitted");
                self.state = SessionState::Submitted { date };
            }
            ApplyOutcome::Rejected => {
                tracing::warn!(action = action.label(), "action after submit ignored");
            }
        }
    }
}
