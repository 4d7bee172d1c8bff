use crossbeam_channel::{Sender, TrySendError};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Samples in one engine tick at `sample_rate`, never zero.
pub fn hop_samples(sample_rate: u32, tick_ms: u64) -> usize {
    ((u64::from(sample_rate) * tick_ms) / 1000).max(1) as usize
}

pub(super) fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32_768.0
}

pub(super) fn u16_to_f32(sample: u16) -> f32 {
    (f32::from(sample) - 32_768.0) / 32_768.0
}

/// Average interleaved frames into mono, converting each sample on the way.
/// A trailing partial frame is averaged over the channels it has.
pub(super) fn append_downmixed_samples<T, F>(
    buf: &mut Vec<f32>,
    data: &[T],
    channels: usize,
    mut convert: F,
) where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        buf.extend(data.iter().copied().map(&mut convert));
        return;
    }

    for frame in data.chunks(channels) {
        let sum: f32 = frame.iter().copied().map(&mut convert).sum();
        buf.push(sum / frame.len() as f32);
    }
}

/// Runs on the capture callback: downmixes, cuts hop-sized chunks, and hands
/// them to the engine without ever blocking. A full channel drops the chunk.
pub(super) struct ChunkPump {
    hop: usize,
    pending: Vec<f32>,
    sender: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
    disconnected: bool,
}

impl ChunkPump {
    pub(super) fn new(hop: usize, sender: Sender<Vec<f32>>, dropped: Arc<AtomicUsize>) -> Self {
        let hop = hop.max(1);
        Self {
            hop,
            pending: Vec::with_capacity(hop * 2),
            sender,
            dropped,
            disconnected: false,
        }
    }

    pub(super) fn push<T, F>(&mut self, data: &[T], channels: usize, convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        if self.disconnected {
            return;
        }
        append_downmixed_samples(&mut self.pending, data, channels, convert);

        let mut start = 0;
        while self.pending.len() - start >= self.hop {
            let chunk = self.pending[start..start + self.hop].to_vec();
            start += self.hop;
            match self.sender.try_send(chunk) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        self.pending.drain(..start);
    }
}
