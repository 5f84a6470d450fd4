// Command types - Control surface → engine thread

use crate::engine::tempo::TrainerConfig;

#[derive(Debug, Clone, Copy)]
pub enum Command {
    Start,
    Stop,
    SetBpm(u16),
    AdjustBpm(i16),
    SetBeatsPerBar(u8),
    SetSubdivision(u8),
    CycleEmphasis(u8),
    /// Tap timestamp, captured from the audio clock at the call site so
    /// command-queue latency does not skew the estimate
    Tap(f64),
    SetTrainer(TrainerConfig),
    Shutdown,
}
