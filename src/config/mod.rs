//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use crate::date::CalendarDate;
use clap::{Parser, ValueEnum};

pub use defaults::{
    default_submit_policy, DEFAULT_ACTION_THRESHOLD_MS, DEFAULT_CHANNEL_CAPACITY,
    DEFAULT_COOLDOWN_MS, DEFAULT_FFT_SIZE, DEFAULT_MAX_FREQ_HZ, DEFAULT_MAX_YEAR,
    DEFAULT_MIN_FREQ_HZ, DEFAULT_MIN_MAGNITUDE, DEFAULT_MIN_YEAR, DEFAULT_REPAINT_MS,
    DEFAULT_SMOOTHING_WINDOW, DEFAULT_STALE_SUBMIT_MS, DEFAULT_SUBMIT_GRACE_MS,
    DEFAULT_SUBMIT_THRESHOLD_MS, DEFAULT_TICK_MS,
};

/// CLI options for SingDate. Validated values keep the engine's timers sane.
#[derive(Debug, Parser, Clone)]
#[command(about = "SingDate: pick a calendar date by singing", author, version)]
pub struct AppConfig {
    /// Preferred audio input device name
    #[arg(long, env = "SINGDATE_INPUT_DEVICE")]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Lowest accepted pitch (Hz)
    #[arg(long = "min-freq-hz", default_value_t = DEFAULT_MIN_FREQ_HZ)]
    pub min_freq_hz: f32,

    /// Highest accepted pitch (Hz)
    #[arg(long = "max-freq-hz", default_value_t = DEFAULT_MAX_FREQ_HZ)]
    pub max_freq_hz: f32,

    /// Spectrum magnitude a peak must exceed (0-255 scale)
    #[arg(long = "min-magnitude", default_value_t = DEFAULT_MIN_MAGNITUDE)]
    pub min_magnitude: f32,

    /// Number of recent pitch estimates averaged together
    #[arg(long = "smoothing-window", default_value_t = DEFAULT_SMOOTHING_WINDOW)]
    pub smoothing_window: usize,

    /// Hold time before a navigation zone fires (milliseconds)
    #[arg(long = "action-threshold-ms", default_value_t = DEFAULT_ACTION_THRESHOLD_MS)]
    pub action_threshold_ms: u64,

    /// Hold time before the submit zone fires (milliseconds)
    #[arg(long = "submit-threshold-ms", default_value_t = DEFAULT_SUBMIT_THRESHOLD_MS)]
    pub submit_threshold_ms: u64,

    /// Quiet period after any action (milliseconds)
    #[arg(long = "cooldown-ms", default_value_t = DEFAULT_COOLDOWN_MS)]
    pub cooldown_ms: u64,

    /// Reset a submit confirmation that stalls this long (milliseconds)
    #[arg(long = "stale-submit-ms", default_value_t = DEFAULT_STALE_SUBMIT_MS)]
    pub stale_submit_ms: u64,

    /// Dropout tolerated during submit confirmation with the grace policy (milliseconds)
    #[arg(long = "submit-grace-ms", default_value_t = DEFAULT_SUBMIT_GRACE_MS)]
    pub submit_grace_ms: u64,

    /// How submit confirmation reacts to brief dropouts
    #[arg(
        long = "submit-policy",
        value_enum,
        default_value_t = default_submit_policy()
    )]
    pub submit_policy: SubmitDropoutPolicy,

    /// FFT window length (power of two)
    #[arg(long = "fft-size", default_value_t = DEFAULT_FFT_SIZE)]
    pub fft_size: usize,

    /// Audio hop between engine ticks (milliseconds)
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Submit progress repaint interval (milliseconds)
    #[arg(long = "repaint-ms", default_value_t = DEFAULT_REPAINT_MS)]
    pub repaint_ms: u64,

    /// Capture chunks buffered between the audio callback and the engine
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Earliest selectable year
    #[arg(long = "min-year", default_value_t = DEFAULT_MIN_YEAR)]
    pub min_year: i32,

    /// Latest selectable year
    #[arg(long = "max-year", default_value_t = DEFAULT_MAX_YEAR)]
    pub max_year: i32,

    /// Initial selection as YYYY-MM-DD (defaults to today, UTC)
    #[arg(long = "start-date")]
    pub start_date: Option<String>,

    /// Emit newline-delimited JSON events instead of the terminal UI
    #[arg(long = "json-events", default_value_t = false)]
    pub json_events: bool,

    /// Replay a tone script offline, e.g. "300:1200,0:200,330:1500" (HZ:MS, 0 = silence)
    #[arg(long = "simulate", value_name = "SCRIPT")]
    pub simulate: Option<String>,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SINGDATE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SINGDATE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Include pitch readings and panic payloads in the debug log
    #[arg(
        long = "log-content",
        env = "SINGDATE_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Parsed form of --start-date, filled in by `validate`.
    #[arg(skip)]
    pub resolved_start_date: Option<CalendarDate>,
}

/// Tunable parameters for the pitch-to-action engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub min_freq_hz: f32,
    pub max_freq_hz: f32,
    pub min_magnitude: f32,
    pub smoothing_window: usize,
    pub action_threshold_ms: u64,
    pub submit_threshold_ms: u64,
    pub cooldown_ms: u64,
    pub stale_submit_ms: u64,
    pub submit_grace_ms: u64,
    pub submit_policy: SubmitDropoutPolicy,
    pub fft_size: usize,
    pub tick_ms: u64,
    pub repaint_ms: u64,
    pub channel_capacity: usize,
    pub min_year: i32,
    pub max_year: i32,
    pub start_date: Option<CalendarDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_freq_hz: DEFAULT_MIN_FREQ_HZ,
            max_freq_hz: DEFAULT_MAX_FREQ_HZ,
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            action_threshold_ms: DEFAULT_ACTION_THRESHOLD_MS,
            submit_threshold_ms: DEFAULT_SUBMIT_THRESHOLD_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            stale_submit_ms: DEFAULT_STALE_SUBMIT_MS,
            submit_grace_ms: DEFAULT_SUBMIT_GRACE_MS,
            submit_policy: default_submit_policy(),
            fft_size: DEFAULT_FFT_SIZE,
            tick_ms: DEFAULT_TICK_MS,
            repaint_ms: DEFAULT_REPAINT_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            min_year: DEFAULT_MIN_YEAR,
            max_year: DEFAULT_MAX_YEAR,
            start_date: None,
        }
    }
}

/// What submit confirmation does when the singer briefly leaves the submit zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubmitDropoutPolicy {
    /// Any non-submit reading cancels the confirmation immediately.
    Strict,
    /// Silence or the adjacent high zone is tolerated for `submit_grace_ms`.
    Grace,
}

impl SubmitDropoutPolicy {
    pub fn label(self) -> &'static str {
        match self {
            SubmitDropoutPolicy::Strict => "strict",
            SubmitDropoutPolicy::Grace => "grace",
        }
    }
}
