// Audio clock - Time source shared between scheduler and audio callback
// Derived from the output stream's own sample counter so scheduled times and
// "now" live in the same clock domain, immune to UI-thread timer jitter

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic clock driven by the audio callback
///
/// The callback is the single writer (`advance`); every other thread only
/// reads. Cloning shares the underlying counter.
#[derive(Debug, Clone)]
pub struct AudioClock {
    sample_position: Arc<AtomicU64>,
    sample_rate: f64,
}

impl AudioClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    /// Current time in seconds since the stream started
    ///
    /// Never blocks; safe to call from any thread.
    pub fn now_secs(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }

    /// Current position in samples
    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Relaxed)
    }

    /// Advance the clock by one buffer's worth of frames (audio callback only)
    pub fn advance(&self, frames: usize) {
        self.sample_position
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Convert an absolute time in seconds to an absolute sample position
    pub fn secs_to_samples(&self, secs: f64) -> u64 {
        if secs <= 0.0 {
            return 0;
        }
        (secs * self.sample_rate).round() as u64
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}
