// Engine events - Notifications published by the engine for any observer
// The engine owns its state; front-ends subscribe to these instead of the
// engine knowing anything about rendering

/// State change notifications, engine thread → UI
///
/// Beat and subdivision events carry the scheduled clock time of the note,
/// which may be up to the lookahead window ahead of the audible click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A new beat was scheduled (fires on the first subdivision of the beat)
    BeatChanged { beat: u8, at_secs: f64 },
    /// A note was scheduled within the current beat
    SubdivisionChanged { subdivision: u8, at_secs: f64 },
    /// The tempo changed, whether from a direct set, the trainer, or a tap
    BpmChanged { bpm: u16 },
    Started,
    Stopped,
}
