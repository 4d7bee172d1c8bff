use super::{Action, DwellConfig, DwellMachine, DwellPhase};
use crate::clock::Millis;
use crate::config::SubmitDropoutPolicy;
use crate::pitch::Zone;

const T0: u64 = 1_000_000;

fn at(offset_ms: u64) -> Millis {
    Millis(T0 + offset_ms)
}

fn machine() -> DwellMachine {
    DwellMachine::new(DwellConfig::default())
}

fn grace_machine() -> DwellMachine {
    DwellMachine::new(DwellConfig {
        dropout_policy: SubmitDropoutPolicy::Grace,
        ..DwellConfig::default()
    })
}

/// Feeds `zone` every `step_ms` over `[from, to]` and returns (offset, action) pairs.
fn hold(
    machine: &mut DwellMachine,
    zone: Option<Zone>,
    from: u64,
    to: u64,
    step_ms: u64,
) -> Vec<(u64, Action)> {
    let mut fired = Vec::new();
    let mut t = from;
    while t <= to {
        if let Some(action) = machine.observe(zone, at(t)).action {
            fired.push((t, action));
        }
        t += step_ms;
    }
    fired
}

#[test]
fn navigation_fires_at_exact_threshold() {
    let mut m = machine();
    assert_eq!(m.observe(Some(Zone::Low), at(0)).action, None);
    assert_eq!(m.observe(Some(Zone::Low), at(499)).action, None);
    assert_eq!(
        m.observe(Some(Zone::Low), at(500)).action,
        Some(Action::Decrement)
    );
    assert_eq!(m.phase(), DwellPhase::Armed);
}

#[test]
fn navigation_below_threshold_fires_nothing() {
    let mut m = machine();
    assert!(hold(&mut m, Some(Zone::Mid), 0, 499, 1).is_empty());
    assert_eq!(m.phase(), DwellPhase::Dwelling);
    assert_eq!(m.active_zone(), Some(Zone::Mid));
}

#[test]
fn each_navigation_zone_maps_to_its_action() {
    for (zone, expected) in [
        (Zone::Low, Action::Decrement),
        (Zone::Mid, Action::Increment),
        (Zone::High, Action::AdvanceField),
    ] {
        let mut m = machine();
        let fired = hold(&mut m, Some(zone), 0, 600, 16);
        assert_eq!(fired, vec![(512, expected)], "{zone:?}");
    }
}

#[test]
fn silence_restarts_the_dwell_timer() {
    let mut m = machine();
    m.observe(Some(Zone::Low), at(0));
    m.observe(Some(Zone::Low), at(400));
    m.observe(None, at(416));
    assert_eq!(m.phase(), DwellPhase::Idle);
    m.observe(Some(Zone::Low), at(432));
    assert_eq!(m.observe(Some(Zone::Low), at(900)).action, None);
    assert_eq!(
        m.observe(Some(Zone::Low), at(932)).action,
        Some(Action::Decrement)
    );
}

#[test]
fn zone_change_restarts_the_dwell_timer() {
    let mut m = machine();
    m.observe(Some(Zone::Low), at(0));
    m.observe(Some(Zone::Mid), at(300));
    assert_eq!(m.observe(Some(Zone::Mid), at(700)).action, None);
    assert_eq!(
        m.observe(Some(Zone::Mid), at(800)).action,
        Some(Action::Increment)
    );
}

#[test]
fn sustained_zone_never_fires_within_cooldown() {
    let mut m = machine();
    let fired = hold(&mut m, Some(Zone::Low), 0, 3_000, 10);
    let times: Vec<u64> = fired.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![500, 2_000]);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= m.config().cooldown_ms);
    }
}

#[test]
fn steady_high_for_1200ms_fires_one_advance() {
    let mut m = machine();
    let fired = hold(&mut m, Some(Zone::High), 0, 1_200, 16);
    assert_eq!(fired, vec![(512, Action::AdvanceField)]);
}

#[test]
fn other_zones_are_ignored_during_cooldown() {
    let mut m = machine();
    assert_eq!(hold(&mut m, Some(Zone::Low), 0, 500, 50).len(), 1);
    assert!(hold(&mut m, Some(Zone::Mid), 600, 1_450, 50).is_empty());
    assert_eq!(m.active_zone(), Some(Zone::Low));
    let fired = hold(&mut m, Some(Zone::Mid), 1_500, 2_000, 50);
    assert_eq!(fired, vec![(2_000, Action::Increment)]);
}

#[test]
fn silence_clears_dwell_but_keeps_cooldown() {
    let mut m = machine();
    hold(&mut m, Some(Zone::Low), 0, 500, 50);
    m.observe(None, at(600));
    assert_eq!(m.phase(), DwellPhase::Idle);
    assert!(m.in_cooldown(at(700)));
    m.observe(Some(Zone::Low), at(700));
    assert_eq!(m.phase(), DwellPhase::Idle);
}

#[test]
fn submit_reports_progress_then_fires_once() {
    let mut m = machine();
    assert_eq!(m.observe(Some(Zone::Submit), at(0)).progress, Some(0.0));
    let mid = m.observe(Some(Zone::Submit), at(500));
    assert_eq!(mid.action, None);
    assert_eq!(mid.progress, Some(0.5));
    let done = m.observe(Some(Zone::Submit), at(1_000));
    assert_eq!(done.action, Some(Action::Submit));
    assert!(m.is_submitted());
    assert!(hold(&mut m, Some(Zone::Submit), 1_016, 4_000, 16).is_empty());
    assert!(hold(&mut m, Some(Zone::Low), 4_016, 6_000, 16).is_empty());
}

#[test]
fn submit_sustained_1500ms_fires_exactly_once() {
    let mut m = machine();
    let fired = hold(&mut m, Some(Zone::Submit), 0, 1_500, 16);
    assert_eq!(fired, vec![(1_008, Action::Submit)]);
}

#[test]
fn submit_waits_for_cooldown_after_navigation() {
    let mut m = machine();
    hold(&mut m, Some(Zone::Low), 0, 500, 50);
    assert!(hold(&mut m, Some(Zone::Submit), 550, 1_450, 50).is_empty());
    assert_eq!(m.phase(), DwellPhase::Armed);
    let fired = hold(&mut m, Some(Zone::Submit), 1_500, 2_600, 50);
    assert_eq!(fired, vec![(2_500, Action::Submit)]);
}

#[test]
fn strict_policy_cancels_on_excursion() {
    let mut m = machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::Submit), at(400));
    m.observe(Some(Zone::High), at(416));
    assert_eq!(m.phase(), DwellPhase::Dwelling);
    let restarted = m.observe(Some(Zone::Submit), at(432));
    assert_eq!(restarted.progress, Some(0.0));
}

#[test]
fn strict_policy_cancels_on_silence() {
    let mut m = machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(None, at(16));
    assert_eq!(m.phase(), DwellPhase::Idle);
    assert_eq!(m.submit_progress(at(32)), None);
}

#[test]
fn grace_policy_survives_short_dropout() {
    let mut m = grace_machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::Submit), at(400));
    let held = m.observe(None, at(416));
    assert_eq!(held.progress, Some(0.4));
    assert_eq!(m.phase(), DwellPhase::Confirming);
    m.observe(Some(Zone::High), at(600));
    let resumed = m.observe(Some(Zone::Submit), at(650));
    assert_eq!(resumed.progress, Some(0.65));
    assert_eq!(
        m.observe(Some(Zone::Submit), at(1_000)).action,
        Some(Action::Submit)
    );
}

#[test]
fn grace_policy_cancels_after_window() {
    let mut m = grace_machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(None, at(100));
    assert_eq!(m.phase(), DwellPhase::Confirming);
    m.observe(None, at(400));
    assert_eq!(m.phase(), DwellPhase::Idle);
    assert_eq!(m.observe(Some(Zone::Submit), at(416)).progress, Some(0.0));
}

#[test]
fn grace_excursion_into_high_becomes_a_dwell() {
    let mut m = grace_machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::High), at(100));
    assert_eq!(m.phase(), DwellPhase::Confirming);
    m.observe(Some(Zone::High), at(400));
    assert_eq!(m.phase(), DwellPhase::Dwelling);
    assert_eq!(
        m.observe(Some(Zone::High), at(600)).action,
        Some(Action::AdvanceField)
    );
}

#[test]
fn grace_policy_still_cancels_on_distant_zone() {
    let mut m = grace_machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::Low), at(100));
    assert_eq!(m.phase(), DwellPhase::Dwelling);
    assert_eq!(m.active_zone(), Some(Zone::Low));
}

#[test]
fn watchdog_resets_after_backward_clock_jump() {
    let mut m = machine();
    m.observe(Some(Zone::Submit), at(0));
    let outcome = m.observe(Some(Zone::Submit), Millis(T0 - 6_000));
    assert_eq!(outcome.action, None);
    assert_eq!(m.phase(), DwellPhase::Idle);
}

#[test]
fn watchdog_resets_after_stalled_ticks() {
    let mut m = machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::Submit), at(200));
    let outcome = m.observe(Some(Zone::Submit), at(5_300));
    assert_eq!(outcome.action, None);
    assert_eq!(m.phase(), DwellPhase::Idle);
}

#[test]
fn small_backward_step_keeps_submit_credit() {
    let mut m = machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::Submit), at(600));
    let stepped = m.observe(Some(Zone::Submit), at(500));
    assert_eq!(stepped.progress, Some(0.6));
    assert_eq!(
        m.observe(Some(Zone::Submit), at(900)).action,
        Some(Action::Submit)
    );
}

#[test]
fn backward_clock_never_extends_cooldown() {
    let mut m = machine();
    hold(&mut m, Some(Zone::Low), 0, 500, 50);
    let jumped = Millis(T0 - 10_000);
    m.observe(Some(Zone::Low), jumped);
    assert!(m.in_cooldown(jumped.plus(999)));
    assert!(!m.in_cooldown(jumped.plus(1_000)));
    m.observe(Some(Zone::Low), jumped.plus(1_000));
    assert_eq!(
        m.observe(Some(Zone::Low), jumped.plus(1_500)).action,
        Some(Action::Decrement)
    );
}

#[test]
fn backward_step_clamps_dwell_to_zero() {
    let mut m = machine();
    m.observe(Some(Zone::Mid), at(100));
    m.observe(Some(Zone::Mid), at(50));
    assert_eq!(m.observe(Some(Zone::Mid), at(549)).action, None);
    assert_eq!(
        m.observe(Some(Zone::Mid), at(550)).action,
        Some(Action::Increment)
    );
}

#[test]
fn submit_progress_is_read_only() {
    let mut m = machine();
    m.observe(Some(Zone::Submit), at(0));
    assert_eq!(m.submit_progress(at(400)), Some(0.4));
    assert_eq!(m.submit_progress(at(5_000)), Some(1.0));
    assert_eq!(m.phase(), DwellPhase::Confirming);
    assert_eq!(machine().submit_progress(at(0)), None);
}

#[test]
fn stalled_confirmation_stops_reporting_progress() {
    let mut m = machine();
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::Submit), at(500));
    assert_eq!(m.submit_progress(at(3_000)), Some(1.0));
    assert_eq!(m.submit_progress(at(8_000)), None);
    assert_eq!(m.phase(), DwellPhase::Confirming);

    assert!(!m.expire_stale(at(3_000)));
    assert!(m.expire_stale(at(8_000)));
    assert_eq!(m.phase(), DwellPhase::Idle);
    assert!(!m.expire_stale(at(8_016)));
}

#[test]
fn grace_high_dwell_counts_only_the_high_run() {
    let mut m = DwellMachine::new(DwellConfig {
        action_threshold_ms: 100,
        submit_grace_ms: 300,
        dropout_policy: SubmitDropoutPolicy::Grace,
        ..DwellConfig::default()
    });
    m.observe(Some(Zone::Submit), at(0));
    m.observe(Some(Zone::Submit), at(400));
    assert!(hold(&mut m, None, 416, 632, 16).is_empty());
    assert_eq!(m.phase(), DwellPhase::Confirming);

    let fired = hold(&mut m, Some(Zone::High), 648, 800, 16);
    assert_eq!(fired, vec![(760, Action::AdvanceField)]);
}
