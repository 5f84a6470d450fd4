// Tap tempo - BPM estimation from user tap timestamps

use crate::engine::tempo::{MAX_BPM, MIN_BPM};

/// Number of taps kept for the rolling estimate
pub const MAX_TAPS: usize = 4;

/// A gap longer than this between taps starts a fresh buffer
pub const RESET_GAP_SECS: f64 = 3.0;

/// Rolling buffer of recent tap timestamps
///
/// Timestamps come from the audio clock so they share a domain with the
/// scheduler. The buffer is a fixed 4-slot array; older taps are shifted
/// out. Staleness is checked on the next tap, not by a background timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapTempo {
    taps: [f64; MAX_TAPS],
    len: usize,
}

impl TapTempo {
    pub fn new() -> Self {
        Self {
            taps: [0.0; MAX_TAPS],
            len: 0,
        }
    }

    /// Number of taps currently buffered
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard the tap history
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Record a tap and return a BPM estimate once two or more taps exist
    ///
    /// The estimate is the rounded inverse of the average delta between the
    /// buffered taps, clamped to [1, 300]. A tap arriving more than 3 s
    /// after the previous one replaces the stale buffer instead of
    /// extending it.
    pub fn record_tap(&mut self, at_secs: f64) -> Option<u16> {
        if self.len > 0 && at_secs - self.taps[self.len - 1] > RESET_GAP_SECS {
            self.len = 0;
        }

        if self.len == MAX_TAPS {
            self.taps.copy_within(1.., 0);
            self.len -= 1;
        }
        self.taps[self.len] = at_secs;
        self.len += 1;

        if self.len < 2 {
            return None;
        }

        let taps = &self.taps[..self.len];
        let total: f64 = taps.windows(2).map(|pair| pair[1] - pair[0]).sum();
        let average = total / (self.len - 1) as f64;
        if average <= 0.0 {
            return None;
        }

        let bpm = (60.0 / average).round();
        Some((bpm as i64).clamp(MIN_BPM as i64, MAX_BPM as i64) as u16)
    }
}

impl Default for TapTempo {
    fn default() -> Self {
        Self::new()
    }
}
