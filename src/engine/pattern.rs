// Beat pattern - Per-session meter configuration
// Beats per bar, subdivisions per beat, and per-beat emphasis

use crate::engine::ConfigError;

/// Upper bound on beats per bar; the emphasis array is padded to this size
pub const MAX_BEATS_PER_BAR: u8 = 16;

/// Highest supported subdivision count per beat
pub const MAX_SUBDIVISION: u8 = 8;

/// How a beat is voiced by the click track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    /// Louder downbeat-style click
    Accent,
    #[default]
    Normal,
    /// No sound at all (the sequencer still advances through the beat)
    Mute,
}

impl Emphasis {
    /// Next emphasis in the UI rotation: Normal → Accent → Mute → Normal
    pub fn cycled(self) -> Self {
        match self {
            Emphasis::Normal => Emphasis::Accent,
            Emphasis::Accent => Emphasis::Mute,
            Emphasis::Mute => Emphasis::Normal,
        }
    }
}

/// Meter configuration read by the scheduler on every note
///
/// The emphasis array is a fixed 16-slot block: changing `beats_per_bar`
/// re-indexes into it without resizing, so per-slot settings survive meter
/// changes and lookups stay O(1) with no reallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatPattern {
    beats_per_bar: u8,
    subdivision: u8,
    emphasis: [Emphasis; MAX_BEATS_PER_BAR as usize],
}

impl BeatPattern {
    /// Default pattern: 4 beats per bar, no subdivisions, accented downbeat
    pub fn new() -> Self {
        let mut emphasis = [Emphasis::Normal; MAX_BEATS_PER_BAR as usize];
        emphasis[0] = Emphasis::Accent;
        Self {
            beats_per_bar: 4,
            subdivision: 1,
            emphasis,
        }
    }

    /// Number of beats in a bar (1..=16)
    pub fn beats_per_bar(&self) -> u8 {
        self.beats_per_bar
    }

    /// Number of subdivisions per beat (1..=8); 1 means beats only
    pub fn subdivision(&self) -> u8 {
        self.subdivision
    }

    /// Emphasis of the given beat slot
    pub fn emphasis(&self, beat: u8) -> Emphasis {
        debug_assert!(beat < MAX_BEATS_PER_BAR);
        self.emphasis[beat as usize]
    }

    /// Set beats per bar, rejecting values outside 1..=16
    ///
    /// Emphasis slots are left untouched so shrinking and re-growing the bar
    /// restores the previous per-beat settings.
    pub fn set_beats_per_bar(&mut self, n: u8) -> Result<(), ConfigError> {
        if n == 0 || n > MAX_BEATS_PER_BAR {
            return Err(ConfigError::BeatsPerBarOutOfRange(n));
        }
        self.beats_per_bar = n;
        Ok(())
    }

    /// Set subdivisions per beat, rejecting values outside 1..=8
    pub fn set_subdivision(&mut self, n: u8) -> Result<(), ConfigError> {
        if n == 0 || n > MAX_SUBDIVISION {
            return Err(ConfigError::SubdivisionOutOfRange(n));
        }
        self.subdivision = n;
        Ok(())
    }

    /// Rotate the emphasis of one beat slot, returning the new value
    pub fn cycle_emphasis(&mut self, beat: u8) -> Result<Emphasis, ConfigError> {
        if beat >= self.beats_per_bar {
            return Err(ConfigError::BeatIndexOutOfRange(beat));
        }
        let next = self.emphasis[beat as usize].cycled();
        self.emphasis[beat as usize] = next;
        Ok(next)
    }
}

impl Default for BeatPattern {
    fn default() -> Self {
        Self::new()
    }
}
