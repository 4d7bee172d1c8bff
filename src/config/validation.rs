use super::defaults::{
    MAX_FFT_SIZE, MAX_FREQ_LIMIT_HZ, MAX_SCRIPT_SEGMENTS, MAX_SMOOTHING_WINDOW,
    MAX_STALE_SUBMIT_MS, MAX_THRESHOLD_MS, MIN_FFT_SIZE, MIN_THRESHOLD_MS,
};
use super::{AppConfig, EngineConfig};
use crate::audio::parse_tone_script;
use crate::date::parse_calendar_date;
use anyhow::{bail, Context, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and resolve derived fields.
    pub fn validate(&mut self) -> Result<()> {
        if !self.min_freq_hz.is_finite() || self.min_freq_hz <= 0.0 {
            bail!(
                "--min-freq-hz must be a positive number, got {}",
                self.min_freq_hz
            );
        }
        if !self.max_freq_hz.is_finite()
            || self.max_freq_hz <= self.min_freq_hz
            || self.max_freq_hz > MAX_FREQ_LIMIT_HZ
        {
            bail!(
                "--max-freq-hz must be above --min-freq-hz ({}) and at most {MAX_FREQ_LIMIT_HZ}, got {}",
                self.min_freq_hz,
                self.max_freq_hz
            );
        }
        if !(0.0..=255.0).contains(&self.min_magnitude) {
            bail!(
                "--min-magnitude must be between 0 and 255, got {}",
                self.min_magnitude
            );
        }
        if !(1..=MAX_SMOOTHING_WINDOW).contains(&self.smoothing_window) {
            bail!(
                "--smoothing-window must be between 1 and {MAX_SMOOTHING_WINDOW}, got {}",
                self.smoothing_window
            );
        }
        if !(MIN_THRESHOLD_MS..=MAX_THRESHOLD_MS).contains(&self.action_threshold_ms) {
            bail!(
                "--action-threshold-ms must be between {MIN_THRESHOLD_MS} and {MAX_THRESHOLD_MS}, got {}",
                self.action_threshold_ms
            );
        }
        if !(MIN_THRESHOLD_MS..=MAX_THRESHOLD_MS).contains(&self.submit_threshold_ms) {
            bail!(
                "--submit-threshold-ms must be between {MIN_THRESHOLD_MS} and {MAX_THRESHOLD_MS}, got {}",
                self.submit_threshold_ms
            );
        }
        if self.cooldown_ms > MAX_THRESHOLD_MS {
            bail!(
                "--cooldown-ms must be at most {MAX_THRESHOLD_MS}, got {}",
                self.cooldown_ms
            );
        }
        if self.stale_submit_ms <= self.submit_threshold_ms
            || self.stale_submit_ms > MAX_STALE_SUBMIT_MS
        {
            bail!(
                "--stale-submit-ms must be above --submit-threshold-ms ({}) and at most {MAX_STALE_SUBMIT_MS}",
                self.submit_threshold_ms
            );
        }
        if self.submit_grace_ms >= self.submit_threshold_ms {
            bail!(
                "--submit-grace-ms ({}) must be shorter than --submit-threshold-ms ({})",
                self.submit_grace_ms,
                self.submit_threshold_ms
            );
        }
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            bail!(
                "--fft-size must be a power of two between {MIN_FFT_SIZE} and {MAX_FFT_SIZE}, got {}",
                self.fft_size
            );
        }
        if !(5..=120).contains(&self.tick_ms) {
            bail!("--tick-ms must be between 5 and 120, got {}", self.tick_ms);
        }
        if !(10..=1_000).contains(&self.repaint_ms) {
            bail!(
                "--repaint-ms must be between 10 and 1000, got {}",
                self.repaint_ms
            );
        }
        if !(4..=1_024).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between 4 and 1024, got {}",
                self.channel_capacity
            );
        }
        if !(1..=9_999).contains(&self.min_year) || !(1..=9_999).contains(&self.max_year) {
            bail!("--min-year and --max-year must be between 1 and 9999");
        }
        if self.min_year > self.max_year {
            bail!(
                "--min-year ({}) cannot exceed --max-year ({})",
                self.min_year,
                self.max_year
            );
        }

        self.resolved_start_date = match &self.start_date {
            Some(raw) => {
                let date = parse_calendar_date(raw).context("--start-date")?;
                if !(self.min_year..=self.max_year).contains(&date.year) {
                    bail!(
                        "--start-date year {} is outside {}..={}",
                        date.year,
                        self.min_year,
                        self.max_year
                    );
                }
                Some(date)
            }
            None => None,
        };

        if let Some(script) = &self.simulate {
            let segments = parse_tone_script(script).context("--simulate")?;
            if segments.len() > MAX_SCRIPT_SEGMENTS {
                bail!("--simulate accepts at most {MAX_SCRIPT_SEGMENTS} segments");
            }
        }

        Ok(())
    }

    /// Snapshot the CLI-controlled engine settings for downstream consumers.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            min_freq_hz: self.min_freq_hz,
            max_freq_hz: self.max_freq_hz,
            min_magnitude: self.min_magnitude,
            smoothing_window: self.smoothing_window,
            action_threshold_ms: self.action_threshold_ms,
            submit_threshold_ms: self.submit_threshold_ms,
            cooldown_ms: self.cooldown_ms,
            stale_submit_ms: self.stale_submit_ms,
            submit_grace_ms: self.submit_grace_ms,
            submit_policy: self.submit_policy,
            fft_size: self.fft_size,
            tick_ms: self.tick_ms,
            repaint_ms: self.repaint_ms,
            channel_capacity: self.channel_capacity,
            min_year: self.min_year,
            max_year: self.max_year,
            start_date: self.resolved_start_date,
        }
    }

    /// File logging is on when asked for and not vetoed by --no-logs.
    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}
