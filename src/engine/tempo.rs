// Tempo controller - Owns the current BPM and the trainer ramp
// BPM is an integer clamped to [1, 300]; the trainer nudges it at bar boundaries

/// Lowest accepted tempo
pub const MIN_BPM: u16 = 1;

/// Highest accepted tempo
pub const MAX_BPM: u16 = 300;

/// Tempo a fresh session starts at
pub const DEFAULT_BPM: u16 = 120;

/// Direction of the automatic trainer ramp
///
/// The trainer never changes its own mode; only external reconfiguration
/// moves between these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainerMode {
    #[default]
    Off,
    Increase,
    Decrease,
}

/// Bar-counted tempo ramp configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerConfig {
    pub mode: TrainerMode,
    /// BPM step applied per firing (at least 1)
    pub amount_bpm: u16,
    /// Fire every this many completed bars; 0 disables the trainer entirely
    pub interval_bars: u32,
    /// Ramp limit; steps that would pass it are skipped, not clamped
    pub stop_bpm: u16,
}

impl TrainerConfig {
    /// Disabled trainer
    pub fn off() -> Self {
        Self {
            mode: TrainerMode::Off,
            amount_bpm: 1,
            interval_bars: 1,
            stop_bpm: DEFAULT_BPM,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::off()
    }
}

/// Owns the live BPM value and applies the trainer policy
///
/// Everything here runs on the engine tick thread; the scheduler reads the
/// BPM through this controller each time it computes a note interval, so a
/// trainer step taken mid-tick is picked up by the very next note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoController {
    bpm: u16,
    trainer: TrainerConfig,
}

impl TempoController {
    pub fn new() -> Self {
        Self::with_bpm(DEFAULT_BPM)
    }

    pub fn with_bpm(bpm: u16) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            trainer: TrainerConfig::off(),
        }
    }

    /// Current tempo
    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// Set the tempo, clamping silently into [1, 300]
    ///
    /// Returns the new value when it actually changed, `None` otherwise, so
    /// callers know whether to notify observers.
    pub fn set_bpm(&mut self, bpm: u16) -> Option<u16> {
        let clamped = bpm.clamp(MIN_BPM, MAX_BPM);
        if clamped == self.bpm {
            return None;
        }
        self.bpm = clamped;
        Some(clamped)
    }

    /// Nudge the tempo by a signed delta, clamping at the bounds
    pub fn adjust_bpm(&mut self, delta: i16) -> Option<u16> {
        let target = (self.bpm as i32 + delta as i32).clamp(MIN_BPM as i32, MAX_BPM as i32);
        self.set_bpm(target as u16)
    }

    pub fn trainer(&self) -> &TrainerConfig {
        &self.trainer
    }

    /// Install a new trainer configuration
    ///
    /// `amount_bpm` is raised to at least 1 and `stop_bpm` clamped into the
    /// valid tempo range, mirroring the clamp-don't-reject policy for BPM.
    pub fn set_trainer(&mut self, config: TrainerConfig) {
        self.trainer = TrainerConfig {
            amount_bpm: config.amount_bpm.max(1),
            stop_bpm: config.stop_bpm.clamp(MIN_BPM, MAX_BPM),
            ..config
        };
    }

    /// Seconds between consecutive notes at the current tempo
    pub fn note_interval_secs(&self, subdivision: u8) -> f64 {
        60.0 / self.bpm as f64 / subdivision as f64
    }

    /// Trainer policy, invoked once per completed bar
    ///
    /// Fires only when `bar_count` is a whole multiple of `interval_bars`.
    /// A step that would overshoot `stop_bpm` leaves the tempo unchanged and
    /// the ramp halted. Returns the new BPM when a step was taken.
    pub fn on_bar_complete(&mut self, bar_count: u64) -> Option<u16> {
        let trainer = self.trainer;
        if trainer.interval_bars == 0 || !bar_count.is_multiple_of(trainer.interval_bars as u64) {
            return None;
        }

        let next = match trainer.mode {
            TrainerMode::Off => return None,
            TrainerMode::Increase => {
                let next = self.bpm.saturating_add(trainer.amount_bpm);
                if next > trainer.stop_bpm {
                    return None;
                }
                next
            }
            TrainerMode::Decrease => {
                let next = self.bpm.saturating_sub(trainer.amount_bpm);
                if next < trainer.stop_bpm {
                    return None;
                }
                next
            }
        };

        self.set_bpm(next)
    }
}

impl Default for TempoController {
    fn default() -> Self {
        Self::new()
    }
}
