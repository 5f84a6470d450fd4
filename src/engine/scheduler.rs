// Lookahead scheduler - The metronome's timing core
// Emits every note due inside a short future window; spacing is computed
// additively from the previous scheduled time, never from elapsed wall time,
// so tick jitter cannot accumulate into audible drift.

use crate::engine::pattern::{BeatPattern, Emphasis};
use crate::engine::tempo::TempoController;
use crate::messaging::event::EngineEvent;

/// How far ahead of the clock notes are scheduled, in seconds
pub const LOOKAHEAD_SECS: f64 = 0.1;

/// Recommended period of the scheduling tick, in milliseconds
pub const TICK_PERIOD_MS: u64 = 25;

/// Consumer of scheduled note times
///
/// Implementations request sample-accurate playback of the matching click
/// variant at the given absolute clock time. Muted beats never reach the
/// dispatcher; the scheduler short-circuits them while still advancing the
/// sequencer and notifying observers.
pub trait SoundDispatcher {
    fn schedule_click(&mut self, at_secs: f64, emphasis: Emphasis, is_subdivision: bool);
}

/// Observer notification seam
///
/// The engine owns its state and publishes changes through this trait, so
/// any front-end can subscribe without the core knowing about it.
pub trait EventSink {
    fn emit(&mut self, event: EngineEvent);
}

/// Handy for tests and for batching before a ring buffer push
impl EventSink for Vec<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        self.push(event);
    }
}

/// Mutable position of the sequencer, zeroed on every start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerState {
    /// Absolute clock time of the next note to dispatch
    pub next_note_time: f64,
    pub current_beat: u8,
    pub current_subdivision: u8,
    /// Completed bars since start; drives the trainer policy
    pub bar_count: u64,
}

impl SchedulerState {
    fn zero() -> Self {
        Self {
            next_note_time: 0.0,
            current_beat: 0,
            current_subdivision: 0,
            bar_count: 0,
        }
    }
}

/// The lookahead scheduling loop
///
/// `advance` is driven by a periodic tick (`TICK_PERIOD_MS`); each call
/// drains the window `[now, now + lookahead)`. The tick may fire late or
/// early without affecting note spacing because every note time derives
/// from the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduler {
    state: SchedulerState,
    lookahead_secs: f64,
    running: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_lookahead(LOOKAHEAD_SECS)
    }

    pub fn with_lookahead(lookahead_secs: f64) -> Self {
        Self {
            state: SchedulerState::zero(),
            lookahead_secs,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Anchor the first note to `now_secs` and begin scheduling from beat 0
    pub fn start(&mut self, now_secs: f64) {
        self.state = SchedulerState {
            next_note_time: now_secs,
            ..SchedulerState::zero()
        };
        self.running = true;
    }

    /// Halt scheduling and discard the position
    ///
    /// There is no separate pause: restarting re-anchors to a fresh clock
    /// reading with a zeroed sequencer.
    pub fn stop(&mut self) {
        self.running = false;
        self.state = SchedulerState::zero();
    }

    /// Dispatch every note due before `now_secs + lookahead`
    ///
    /// The interval is recomputed from the live BPM for each note rather
    /// than cached at tick start, so a trainer step at a bar boundary takes
    /// effect on the very next note of the same tick.
    pub fn advance(
        &mut self,
        now_secs: f64,
        tempo: &mut TempoController,
        pattern: &BeatPattern,
        dispatcher: &mut impl SoundDispatcher,
        events: &mut impl EventSink,
    ) {
        if !self.running {
            return;
        }
        while self.state.next_note_time < now_secs + self.lookahead_secs {
            let interval = tempo.note_interval_secs(pattern.subdivision());
            self.dispatch_note(tempo, pattern, dispatcher, events);
            self.state.next_note_time += interval;
        }
    }

    fn dispatch_note(
        &mut self,
        tempo: &mut TempoController,
        pattern: &BeatPattern,
        dispatcher: &mut impl SoundDispatcher,
        events: &mut impl EventSink,
    ) {
        let at_secs = self.state.next_note_time;
        let beat = self.state.current_beat;
        let subdivision = self.state.current_subdivision;
        let is_subdivision = subdivision != 0;

        // A muted beat silences itself and its subdivisions, but observers
        // still see the position change.
        if pattern.emphasis(beat) != Emphasis::Mute {
            dispatcher.schedule_click(at_secs, pattern.emphasis(beat), is_subdivision);
        }
        if !is_subdivision {
            events.emit(EngineEvent::BeatChanged { beat, at_secs });
        }
        events.emit(EngineEvent::SubdivisionChanged {
            subdivision,
            at_secs,
        });

        self.state.current_subdivision += 1;
        if self.state.current_subdivision >= pattern.subdivision() {
            self.state.current_subdivision = 0;
            self.state.current_beat += 1;
            if self.state.current_beat >= pattern.beats_per_bar() {
                self.state.current_beat = 0;
                self.state.bar_count += 1;
                if let Some(bpm) = tempo.on_bar_complete(self.state.bar_count) {
                    events.emit(EngineEvent::BpmChanged { bpm });
                }
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
