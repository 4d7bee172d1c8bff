//! SingDate entrypoint: pick a calendar date by singing into the microphone.
//!
//! Pitch is split into four zones across the configured range. Holding the
//! low, mid, or high zone decrements, increments, or moves to the next field;
//! holding the top zone submits the date.
//!
//! Modes:
//! - default: live microphone with a terminal UI
//! - `--json-events`: live microphone, newline-delimited JSON on stdout
//! - `--simulate SCRIPT`: offline tone script, JSON on stdout, no microphone

mod tui;

use anyhow::{anyhow, Result};
use singdate::audio::{
    list_input_devices, parse_tone_script, replay_pcm, synthesize_tones, MicInput,
    SpectrumAnalyser, SIMULATION_SAMPLE_RATE,
};
use singdate::clock::{Clock, SystemClock};
use singdate::config::{AppConfig, EngineConfig};
use singdate::date::{today_utc, CalendarDate};
use singdate::events::JsonEventRenderer;
use singdate::runtime::{run_loop, DateRenderer};
use singdate::telemetry::init_tracing;
use singdate::terminal_restore::install_terminal_panic_hook;
use singdate::{init_logging, log_debug, log_file_path, PitchSession, SessionState};
use std::io;

use crate::tui::TerminalRenderer;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    install_terminal_panic_hook();
    log_debug("=== SingDate started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    if config.list_input_devices {
        print_input_devices();
        return Ok(());
    }

    let engine = config.engine_config();
    let start = engine
        .start_date
        .unwrap_or_else(|| today_utc(SystemClock.now()));
    log_debug(&format!(
        "start date {start}, window {}-{} Hz, policy {}",
        engine.min_freq_hz,
        engine.max_freq_hz,
        engine.submit_policy.label()
    ));

    let result = match config.simulate.as_deref() {
        Some(script) => run_simulation(script, &engine, start),
        None => run_live(&config, &engine, start),
    };
    if let Err(err) = &result {
        log_debug(&format!("exiting with error: {err:#}"));
    }
    result
}

fn print_input_devices() {
    let devices = match std::env::var("SINGDATE_TEST_DEVICES") {
        Ok(raw) => raw
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Err(_) => list_input_devices().unwrap_or_else(|err| {
            eprintln!("Failed to list audio input devices: {err}");
            Vec::new()
        }),
    };

    if devices.is_empty() {
        println!("No audio input devices detected.");
    } else {
        println!("Available audio input devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
}

fn run_simulation(script: &str, engine: &EngineConfig, start: CalendarDate) -> Result<()> {
    let segments = parse_tone_script(script)?;
    let pcm = synthesize_tones(&segments, SIMULATION_SAMPLE_RATE);
    let mut session = PitchSession::new(engine, start);
    let mut analyser = SpectrumAnalyser::new(engine.fft_size, SIMULATION_SAMPLE_RATE);
    let mut renderer = JsonEventRenderer::new(io::stdout().lock(), "simulate");

    let started_at = SystemClock.now();
    renderer.started(&session.selection(), started_at)?;
    let mut write_error = None;
    let outcome = replay_pcm(
        &mut session,
        &mut analyser,
        &pcm,
        engine.tick_ms,
        started_at,
        |report| {
            if write_error.is_none() {
                write_error = renderer.tick(report).err();
            }
        },
    );
    if let Some(err) = write_error {
        return Err(err);
    }
    renderer.finished(outcome.state)?;

    log_debug(&format!(
        "simulation finished: {} ticks, {} actions, state {:?}",
        outcome.ticks,
        outcome.actions.len(),
        outcome.state
    ));
    if outcome.state == SessionState::Listening {
        eprintln!(
            "Simulation ended without a submitted date ({} actions).",
            outcome.actions.len()
        );
    }
    Ok(())
}

fn run_live(config: &AppConfig, engine: &EngineConfig, start: CalendarDate) -> Result<()> {
    let mic = MicInput::open(config.input_device.as_deref())?;
    let device = mic.device_name();
    let mut stream = mic.start(engine.tick_ms, engine.channel_capacity)?;
    log_debug(&format!(
        "capturing from '{device}' at {} Hz",
        stream.sample_rate()
    ));
    let mut analyser = SpectrumAnalyser::new(engine.fft_size, stream.sample_rate());
    let mut session = PitchSession::new(engine, start);

    if config.json_events {
        let mut renderer = JsonEventRenderer::new(io::stdout(), device);
        run_loop(
            &mut session,
            &mut stream,
            &mut analyser,
            &SystemClock,
            &mut renderer,
            engine,
        )?;
        return Ok(());
    }

    let mut renderer = TerminalRenderer::new(&device, session.selection())?;
    let result = run_loop(
        &mut session,
        &mut stream,
        &mut analyser,
        &SystemClock,
        &mut renderer,
        engine,
    );
    drop(renderer);

    match result? {
        SessionState::Submitted { date } => {
            println!("{date}");
            Ok(())
        }
        SessionState::Cancelled => {
            eprintln!("Cancelled; no date selected.");
            Ok(())
        }
        SessionState::Listening => Err(anyhow!("session stopped while still listening")),
    }
}
