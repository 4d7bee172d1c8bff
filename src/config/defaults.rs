use super::SubmitDropoutPolicy;

pub const DEFAULT_MIN_FREQ_HZ: f32 = 80.0;
pub const DEFAULT_MAX_FREQ_HZ: f32 = 350.0;
/// Floor on the 0..=255 spectrum scale.
pub const DEFAULT_MIN_MAGNITUDE: f32 = 80.0;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 8;

pub const DEFAULT_ACTION_THRESHOLD_MS: u64 = 500;
pub const DEFAULT_SUBMIT_THRESHOLD_MS: u64 = 1_000;
pub const DEFAULT_COOLDOWN_MS: u64 = 1_000;
pub const DEFAULT_STALE_SUBMIT_MS: u64 = 5_000;
pub const DEFAULT_SUBMIT_GRACE_MS: u64 = 300;

pub const DEFAULT_FFT_SIZE: usize = 2_048;
pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_REPAINT_MS: u64 = 50;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

pub const DEFAULT_MIN_YEAR: i32 = 1900;
pub const DEFAULT_MAX_YEAR: i32 = 2100;

pub(super) const MAX_FREQ_LIMIT_HZ: f32 = 20_000.0;
pub(super) const MAX_SMOOTHING_WINDOW: usize = 64;
pub(super) const MIN_THRESHOLD_MS: u64 = 50;
pub(super) const MAX_THRESHOLD_MS: u64 = 10_000;
pub(super) const MAX_STALE_SUBMIT_MS: u64 = 60_000;
pub(super) const MIN_FFT_SIZE: usize = 256;
pub(super) const MAX_FFT_SIZE: usize = 32_768;
pub(super) const MAX_SCRIPT_SEGMENTS: usize = 256;

pub fn default_submit_policy() -> SubmitDropoutPolicy {
    SubmitDropoutPolicy::Strict
}
