//! Dwell/debounce state machine.
//!
//! Turns the per-tick zone stream into deliberate actions:
//! - a navigation zone must be held for `action_threshold_ms` before it fires
//! - the submit zone must be held for `submit_threshold_ms`, with progress
//!   published while it is held
//! - after any action, input is ignored for `cooldown_ms`
//! - a submit confirmation that stops moving forward for `stale_submit_ms`
//!   is dropped by a watchdog
//!
//! Submit is terminal: once it fires the machine ignores further input.

#[cfg(test)]
mod tests;

use crate::clock::Millis;
use crate::config::{EngineConfig, SubmitDropoutPolicy};
use crate::pitch::Zone;
use serde::Serialize;

/// Discrete UI action emitted by a qualifying dwell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Decrement,
    Increment,
    AdvanceField,
    Submit,
}

impl Action {
    pub fn for_zone(zone: Zone) -> Self {
        match zone {
            Zone::Low => Action::Decrement,
            Zone::Mid => Action::Increment,
            Zone::High => Action::AdvanceField,
            Zone::Submit => Action::Submit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Decrement => "decrement",
            Action::Increment => "increment",
            Action::AdvanceField => "advance_field",
            Action::Submit => "submit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DwellConfig {
    pub action_threshold_ms: u64,
    pub submit_threshold_ms: u64,
    pub cooldown_ms: u64,
    pub stale_submit_ms: u64,
    pub submit_grace_ms: u64,
    pub dropout_policy: SubmitDropoutPolicy,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for DwellConfig {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            action_threshold_ms: cfg.action_threshold_ms,
            submit_threshold_ms: cfg.submit_threshold_ms,
            cooldown_ms: cfg.cooldown_ms,
            stale_submit_ms: cfg.stale_submit_ms,
            submit_grace_ms: cfg.submit_grace_ms,
            dropout_policy: cfg.submit_policy,
        }
    }
}

/// Public view of where the machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellPhase {
    Idle,
    Dwelling,
    Armed,
    Confirming,
    Submitted,
}

impl DwellPhase {
    pub fn label(self) -> &'static str {
        match self {
            DwellPhase::Idle => "idle",
            DwellPhase::Dwelling => "dwelling",
            DwellPhase::Armed => "armed",
            DwellPhase::Confirming => "confirming",
            DwellPhase::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Dwelling {
        zone: Zone,
        since: Millis,
    },
    /// A navigation action fired for `zone`; holding it again needs a fresh dwell.
    Armed {
        zone: Zone,
    },
    Confirming(Confirmation),
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Confirmation {
    since: Millis,
    /// Furthest elapsed time observed so far.
    progress_ms: u64,
    last_progress_at: Millis,
    /// First tick of the current dropout, grace policy only.
    grace_anchor: Option<Millis>,
    /// First tick of the unbroken `high` run inside the dropout.
    high_since: Option<Millis>,
}

impl Confirmation {
    fn start(now: Millis) -> Self {
        Self {
            since: now,
            progress_ms: 0,
            last_progress_at: now,
            grace_anchor: None,
            high_since: None,
        }
    }
}

/// What one tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DwellOutcome {
    pub action: Option<Action>,
    /// Submit progress in `0.0..=1.0`, only while confirming.
    pub progress: Option<f32>,
}

impl DwellOutcome {
    fn fired(action: Action, progress: Option<f32>) -> Self {
        Self {
            action: Some(action),
            progress,
        }
    }

    fn progress(progress: f32) -> Self {
        Self {
            action: None,
            progress: Some(progress),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DwellMachine {
    cfg: DwellConfig,
    phase: Phase,
    last_action_at: Option<Millis>,
}

impl DwellMachine {
    pub fn new(cfg: DwellConfig) -> Self {
        Self {
            cfg,
            phase: Phase::Idle,
            last_action_at: None,
        }
    }

    pub fn config(&self) -> &DwellConfig {
        &self.cfg
    }

    pub fn phase(&self) -> DwellPhase {
        match self.phase {
            Phase::Idle => DwellPhase::Idle,
            Phase::Dwelling { .. } => DwellPhase::Dwelling,
            Phase::Armed { .. } => DwellPhase::Armed,
            Phase::Confirming(_) => DwellPhase::Confirming,
            Phase::Submitted => DwellPhase::Submitted,
        }
    }

    /// Zone the machine is currently tracking, if any.
    pub fn active_zone(&self) -> Option<Zone> {
        match self.phase {
            Phase::Dwelling { zone, .. } | Phase::Armed { zone } => Some(zone),
            Phase::Confirming(_) => Some(Zone::Submit),
            Phase::Idle | Phase::Submitted => None,
        }
    }

    pub fn last_action_at(&self) -> Option<Millis> {
        self.last_action_at
    }

    pub fn in_cooldown(&self, now: Millis) -> bool {
        self.last_action_at
            .is_some_and(|at| now.saturating_since(at) < self.cfg.cooldown_ms)
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, Phase::Submitted)
    }

    /// Read-only progress for the repaint tick. Never changes state.
    /// A stalled confirmation reports nothing.
    pub fn submit_progress(&self, now: Millis) -> Option<f32> {
        let Phase::Confirming(confirmation) = self.phase else {
            return None;
        };
        if self.submit_stalled(now) {
            return None;
        }
        let elapsed = if confirmation.grace_anchor.is_some() {
            confirmation.progress_ms
        } else {
            now.saturating_since(confirmation.since)
                .max(confirmation.progress_ms)
        };
        Some(self.fraction(elapsed))
    }

    /// Feed one tick. `zone` is `None` when the tick carried no signal.
    pub fn observe(&mut self, zone: Option<Zone>, now: Millis) -> DwellOutcome {
        if self.is_submitted() {
            return DwellOutcome::default();
        }
        if self.expire_stale(now) {
            return DwellOutcome::default();
        }
        self.rebase_anchors(now);

        let Some(zone) = zone else {
            return self.on_silence(now);
        };
        if self.in_cooldown(now) {
            return DwellOutcome::default();
        }
        if zone == Zone::Submit {
            self.on_submit_zone(now)
        } else {
            self.on_navigation_zone(zone, now)
        }
    }

    /// Run the watchdog alone, for loops that went a tick without input.
    /// Returns true when a stalled confirmation was dropped.
    pub fn expire_stale(&mut self, now: Millis) -> bool {
        if !self.submit_stalled(now) {
            return false;
        }
        tracing::warn!(
            now = now.0,
            ceiling_ms = self.cfg.stale_submit_ms,
            "submit confirmation stalled; resetting"
        );
        self.phase = Phase::Idle;
        true
    }

    /// Drop any dwell or confirmation. Cooldown is kept.
    pub fn reset(&mut self) {
        if !self.is_submitted() {
            self.phase = Phase::Idle;
        }
    }

    fn on_silence(&mut self, now: Millis) -> DwellOutcome {
        let phase = self.phase;
        match phase {
            Phase::Idle | Phase::Submitted => DwellOutcome::default(),
            Phase::Confirming(_) if self.hold_through_dropout(None, now) => {
                DwellOutcome::progress(self.held_fraction())
            }
            _ => {
                tracing::debug!(now = now.0, "signal lost; dwell cleared");
                self.phase = Phase::Idle;
                DwellOutcome::default()
            }
        }
    }

    fn on_navigation_zone(&mut self, zone: Zone, now: Millis) -> DwellOutcome {
        let phase = self.phase;
        match phase {
            Phase::Dwelling {
                zone: current,
                since,
            } if current == zone => {
                if now.saturating_since(since) < self.cfg.action_threshold_ms {
                    return DwellOutcome::default();
                }
                let action = Action::for_zone(zone);
                tracing::info!(
                    action = action.label(),
                    zone = zone.label(),
                    now = now.0,
                    "dwell action fired"
                );
                self.last_action_at = Some(now);
                self.phase = Phase::Armed { zone };
                DwellOutcome::fired(action, None)
            }
            Phase::Confirming(_) if zone == Zone::High => {
                if self.hold_through_dropout(Some(zone), now) {
                    return DwellOutcome::progress(self.held_fraction());
                }
                // The excursion outlived the grace window, or the policy is
                // strict. Only its unbroken high run counts toward the dwell.
                let since = match self.phase {
                    Phase::Confirming(confirmation) => confirmation.high_since.unwrap_or(now),
                    _ => now,
                };
                self.start_dwell(zone, since);
                self.on_navigation_zone(zone, now)
            }
            _ => {
                self.start_dwell(zone, now);
                DwellOutcome::default()
            }
        }
    }

    fn on_submit_zone(&mut self, now: Millis) -> DwellOutcome {
        let mut confirmation = match self.phase {
            Phase::Confirming(confirmation) => confirmation,
            _ => {
                tracing::debug!(now = now.0, "submit confirmation started");
                let confirmation = Confirmation::start(now);
                self.phase = Phase::Confirming(confirmation);
                confirmation
            }
        };
        confirmation.grace_anchor = None;
        confirmation.high_since = None;
        let elapsed = now.saturating_since(confirmation.since);
        if elapsed > confirmation.progress_ms {
            confirmation.progress_ms = elapsed;
            confirmation.last_progress_at = now;
        }
        if elapsed >= self.cfg.submit_threshold_ms {
            tracing::info!(now = now.0, held_ms = elapsed, "submit fired");
            self.last_action_at = Some(now);
            self.phase = Phase::Submitted;
            return DwellOutcome::fired(Action::Submit, Some(1.0));
        }
        self.phase = Phase::Confirming(confirmation);
        DwellOutcome::progress(self.fraction(elapsed))
    }

    fn start_dwell(&mut self, zone: Zone, since: Millis) {
        tracing::debug!(zone = zone.label(), since = since.0, "dwell started");
        self.phase = Phase::Dwelling { zone, since };
    }

    /// Grace policy: keep the confirmation alive through a short dropout.
    /// `zone` is the dropout reading: silence or the adjacent high zone.
    /// Returns false when the dropout must cancel it.
    fn hold_through_dropout(&mut self, zone: Option<Zone>, now: Millis) -> bool {
        if self.cfg.dropout_policy != SubmitDropoutPolicy::Grace {
            return false;
        }
        let Phase::Confirming(mut confirmation) = self.phase else {
            return false;
        };
        let anchor = *confirmation.grace_anchor.get_or_insert(now);
        match zone {
            Some(Zone::High) => {
                confirmation.high_since.get_or_insert(now);
            }
            _ => confirmation.high_since = None,
        }
        self.phase = Phase::Confirming(confirmation);
        now.saturating_since(anchor) < self.cfg.submit_grace_ms
    }

    fn held_fraction(&self) -> f32 {
        match self.phase {
            Phase::Confirming(confirmation) => self.fraction(confirmation.progress_ms),
            _ => 0.0,
        }
    }

    fn fraction(&self, elapsed_ms: u64) -> f32 {
        let threshold = self.cfg.submit_threshold_ms.max(1);
        (elapsed_ms as f32 / threshold as f32).clamp(0.0, 1.0)
    }

    /// No forward progress for longer than the ceiling, in either clock direction.
    fn submit_stalled(&self, now: Millis) -> bool {
        match self.phase {
            Phase::Confirming(confirmation) => {
                now.abs_diff(confirmation.last_progress_at) > self.cfg.stale_submit_ms
            }
            _ => false,
        }
    }

    /// Pull stored anchors back to `now` when the clock stepped backwards.
    fn rebase_anchors(&mut self, now: Millis) {
        if let Some(at) = self.last_action_at {
            if now < at {
                self.last_action_at = Some(now);
            }
        }
        match &mut self.phase {
            Phase::Dwelling { since, .. } if now < *since => *since = now,
            Phase::Confirming(confirmation) => {
                if now < confirmation.since.plus(confirmation.progress_ms) {
                    confirmation.since = now.minus(confirmation.progress_ms);
                }
                if now < confirmation.last_progress_at {
                    confirmation.last_progress_at = now;
                }
                let dropout = [
                    &mut confirmation.grace_anchor,
                    &mut confirmation.high_since,
                ];
                for anchor in dropout {
                    if anchor.is_some_and(|at| now < at) {
                        *anchor = Some(now);
                    }
                }
            }
            _ => {}
        }
    }
}
