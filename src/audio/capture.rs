//! Live microphone input via CPAL.
//!
//! The callback thread only downmixes and forwards hop-sized chunks; all
//! analysis happens on the caller's thread through [`MicStream::recv_chunk`].

use super::dispatch::{hop_samples, i16_to_f32, u16_to_f32, ChunkPump};
use crate::lock::lock_or_recover;
use crate::log_debug;
use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// List microphone names so the CLI can expose a human-friendly selector.
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("no input devices available")?;
    Ok(devices.filter_map(|device| device.name().ok()).collect())
}

pub struct MicInput {
    device: cpal::Device,
}

impl MicInput {
    /// Open the named device, or the system default when `preferred_device` is `None`.
    pub fn open(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host.input_devices().context("no input devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("input device '{name}' not found"))?
            }
            None => host.default_input_device().ok_or_else(|| {
                anyhow!(
                    "no default input device available. {}",
                    mic_permission_hint()
                )
            })?,
        };
        Ok(Self { device })
    }

    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Start streaming `tick_ms` chunks of mono audio into a bounded channel.
    pub fn start(&self, tick_ms: u64, channel_capacity: usize) -> Result<MicStream> {
        let default_config = self.device.default_input_config().with_context(|| {
            format!(
                "cannot read the input configuration of '{}'. {}",
                self.device_name(),
                mic_permission_hint()
            )
        })?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.into();
        let sample_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));
        let hop = hop_samples(sample_rate, tick_ms);

        log_debug(&format!(
            "Mic config: format={format:?} sample_rate={sample_rate}Hz channels={channels} hop={hop}"
        ));

        let (sender, receiver) = bounded::<Vec<f32>>(channel_capacity.max(1));
        let dropped = Arc::new(AtomicUsize::new(0));
        let stream_error = Arc::new(Mutex::new(None::<String>));
        let pump = Arc::new(Mutex::new(ChunkPump::new(hop, sender, dropped.clone())));

        let err_slot = stream_error.clone();
        let err_fn = move |err: cpal::StreamError| {
            log_debug(&format!("audio_stream_error: {err}"));
            let mut slot = lock_or_recover(&err_slot, "mic stream error");
            slot.get_or_insert_with(|| err.to_string());
        };

        let stream = match format {
            SampleFormat::F32 => {
                let pump = pump.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| match pump.try_lock() {
                        Ok(mut pump) => pump.push(data, channels, |sample| sample),
                        Err(_) => {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let pump = pump.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| match pump.try_lock() {
                        Ok(mut pump) => pump.push(data, channels, i16_to_f32),
                        Err(_) => {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let pump = pump.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| match pump.try_lock() {
                        Ok(mut pump) => pump.push(data, channels, u16_to_f32),
                        Err(_) => {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            other => bail!("unsupported sample format: {other:?}"),
        }
        .with_context(|| {
            format!(
                "failed to open '{}' for capture. {}",
                self.device_name(),
                mic_permission_hint()
            )
        })?;

        stream
            .play()
            .with_context(|| format!("failed to start capture. {}", mic_permission_hint()))?;

        Ok(MicStream {
            stream,
            receiver,
            sample_rate,
            dropped,
            reported_dropped: 0,
            stream_error,
        })
    }
}

/// A running capture. Dropping it stops the stream.
pub struct MicStream {
    stream: cpal::Stream,
    receiver: Receiver<Vec<f32>>,
    sample_rate: u32,
    dropped: Arc<AtomicUsize>,
    reported_dropped: usize,
    stream_error: Arc<Mutex<Option<String>>>,
}

impl MicStream {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn dropped_chunks(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Wait up to `timeout` for the next chunk. `Ok(None)` means nothing arrived yet.
    pub fn recv_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<f32>>> {
        if let Some(err) = lock_or_recover(&self.stream_error, "mic stream error").take() {
            bail!("audio input failed: {err}. {}", mic_permission_hint());
        }
        let dropped = self.dropped_chunks();
        if dropped > self.reported_dropped {
            tracing::warn!(
                dropped_total = dropped,
                new = dropped - self.reported_dropped,
                "capture chunks dropped"
            );
            self.reported_dropped = dropped;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(chunk) => Ok(Some(chunk)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => bail!("audio input disconnected"),
        }
    }
}

impl Drop for MicStream {
    fn drop(&mut self) {
        if let Err(err) = self.stream.pause() {
            log_debug(&format!("failed to pause audio stream: {err}"));
        }
    }
}

pub(super) fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
