// Click synthesis - Pre-rendered metronome click variants
// Short sine bursts with exponential decay, rendered once at stream start
// for zero per-click synthesis cost in the audio callback

use crate::engine::pattern::Emphasis;
use std::f32::consts::PI;

/// Which click sample a scheduled note plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Downbeat-style click (brighter, louder)
    Accent,
    /// Regular beat click
    Normal,
    /// Quieter sub-beat tick
    Tick,
}

impl ClickKind {
    /// Pick the sound variant for a note, `None` when the beat is muted
    ///
    /// Subdivisions between beats always use the quiet tick; they are never
    /// individually accented.
    pub fn select(emphasis: Emphasis, is_subdivision: bool) -> Option<ClickKind> {
        match (emphasis, is_subdivision) {
            (Emphasis::Mute, _) => None,
            (_, true) => Some(ClickKind::Tick),
            (Emphasis::Accent, false) => Some(ClickKind::Accent),
            (Emphasis::Normal, false) => Some(ClickKind::Normal),
        }
    }
}

/// The three click buffers at the stream's sample rate
#[derive(Debug, Clone)]
pub struct ClickSound {
    accent: Vec<f32>,
    normal: Vec<f32>,
    tick: Vec<f32>,
}

impl ClickSound {
    /// Duration of every click variant
    const CLICK_DURATION_MS: f32 = 10.0;

    pub fn new(sample_rate: f32) -> Self {
        let length = ((Self::CLICK_DURATION_MS / 1000.0) * sample_rate) as usize;
        Self {
            accent: Self::render(sample_rate, length, 1200.0, 0.6),
            normal: Self::render(sample_rate, length, 800.0, 0.4),
            tick: Self::render(sample_rate, length, 1500.0, 0.2),
        }
    }

    /// Sine burst with a fast exponential decay envelope
    fn render(sample_rate: f32, length: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
        let phase_increment = 2.0 * PI * frequency / sample_rate;
        (0..length)
            .map(|i| {
                let t = i as f32 / length as f32;
                let envelope = (-t * 8.0).exp();
                (i as f32 * phase_increment).sin() * envelope * amplitude
            })
            .collect()
    }

    pub fn samples(&self, kind: ClickKind) -> &[f32] {
        match kind {
            ClickKind::Accent => &self.accent,
            ClickKind::Normal => &self.normal,
            ClickKind::Tick => &self.tick,
        }
    }

    /// Length of a click in samples (all variants are equal)
    pub fn duration_samples(&self) -> usize {
        self.accent.len()
    }
}

/// A click being played back at an absolute sample position
///
/// Playback is addressed by absolute sample rather than a running offset so
/// a voice that starts mid-buffer stays sample-accurate.
#[derive(Debug, Clone, Copy)]
pub struct ClickVoice {
    kind: ClickKind,
    start_sample: u64,
}

impl ClickVoice {
    pub fn new(kind: ClickKind, start_sample: u64) -> Self {
        Self { kind, start_sample }
    }

    /// Amplitude of this voice at an absolute sample position
    pub fn sample_at(&self, sample: u64, sound: &ClickSound) -> f32 {
        if sample < self.start_sample {
            return 0.0;
        }
        let offset = (sample - self.start_sample) as usize;
        sound
            .samples(self.kind)
            .get(offset)
            .copied()
            .unwrap_or(0.0)
    }

    /// True once the whole click has been rendered up to `sample`
    pub fn finished_by(&self, sample: u64, sound: &ClickSound) -> bool {
        sample >= self.start_sample + sound.duration_samples() as u64
    }
}
