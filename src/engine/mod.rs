// Engine module - Scheduling core and the Metronome facade
// The core types (pattern, tempo, tap, scheduler) are plain state machines
// with no audio or thread dependencies; `Metronome` wires them to the CPAL
// output and a ~25 ms tick thread.

pub mod pattern;
pub mod scheduler;
pub mod tap;
pub mod tempo;

pub use pattern::{BeatPattern, Emphasis, MAX_BEATS_PER_BAR, MAX_SUBDIVISION};
pub use scheduler::{EventSink, LOOKAHEAD_SECS, Scheduler, SchedulerState, SoundDispatcher};
pub use tap::TapTempo;
pub use tempo::{DEFAULT_BPM, MAX_BPM, MIN_BPM, TempoController, TrainerConfig, TrainerMode};

use crate::audio::clock::AudioClock;
use crate::audio::output::{AudioOutput, ChannelDispatcher, create_click_channel};
use crate::audio::AudioError;
use crate::messaging::channels::{
    CommandConsumer, CommandProducer, EventConsumer, EventProducer, create_command_channel,
    create_event_channel,
};
use crate::messaging::command::Command;
use crate::messaging::event::EngineEvent;
use ringbuf::traits::{Consumer, Producer};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// Channel capacities. Commands and events are tiny Copy values; these sizes
// cover several seconds of backlog at the highest event rate (300 BPM x 8
// subdivisions = 40 notes/s, two events per note).
const COMMAND_CHANNEL_CAPACITY: usize = 256;
const EVENT_CHANNEL_CAPACITY: usize = 1024;
const CLICK_CHANNEL_CAPACITY: usize = 256;

/// Rejected configuration values
///
/// Invalid meter values never reach the sequencer; the prior valid
/// configuration stays in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("beats per bar must be between 1 and 16, got {0}")]
    BeatsPerBarOutOfRange(u8),

    #[error("subdivision must be between 1 and 8, got {0}")]
    SubdivisionOutOfRange(u8),

    #[error("beat index {0} is outside the current bar")]
    BeatIndexOutOfRange(u8),
}

/// The metronome control surface
///
/// Owns the audio output and the engine tick thread. Every method is
/// non-blocking: it validates what it can synchronously and enqueues a
/// command for the engine thread. State change notifications arrive on the
/// `EventConsumer` returned by [`Metronome::new`].
pub struct Metronome {
    commands: CommandProducer,
    clock: AudioClock,
    output: AudioOutput,
    engine_thread: Option<JoinHandle<()>>,
}

impl Metronome {
    /// Open the default audio output and spawn the engine thread
    pub fn new() -> Result<(Self, EventConsumer), AudioError> {
        let (click_tx, click_rx) = create_click_channel(CLICK_CHANNEL_CAPACITY);
        let output = AudioOutput::new(click_rx)?;
        let clock = output.clock();

        let (command_tx, command_rx) = create_command_channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = create_event_channel(EVENT_CHANNEL_CAPACITY);

        let engine_clock = clock.clone();
        let engine_thread = thread::spawn(move || {
            engine_loop(command_rx, event_tx, ChannelDispatcher::new(click_tx), engine_clock);
        });

        Ok((
            Self {
                commands: command_tx,
                clock,
                output,
                engine_thread: Some(engine_thread),
            },
            event_rx,
        ))
    }

    /// Begin playback from beat 0, anchored to the current clock reading
    pub fn start(&mut self) {
        self.send(Command::Start);
    }

    /// Halt playback, discard the sequencer position, and cancel clicks
    /// scheduled into the lookahead window
    pub fn stop(&mut self) {
        self.send(Command::Stop);
    }

    /// Set the tempo; out-of-range values are clamped to [1, 300]
    pub fn set_bpm(&mut self, bpm: u16) {
        self.send(Command::SetBpm(bpm));
    }

    /// Nudge the tempo by a signed delta
    pub fn adjust_bpm(&mut self, delta: i16) {
        self.send(Command::AdjustBpm(delta));
    }

    /// Set the number of beats per bar (1..=16)
    pub fn set_beats_per_bar(&mut self, n: u8) -> Result<(), ConfigError> {
        if n == 0 || n > MAX_BEATS_PER_BAR {
            return Err(ConfigError::BeatsPerBarOutOfRange(n));
        }
        self.send(Command::SetBeatsPerBar(n));
        Ok(())
    }

    /// Set the subdivisions per beat (1..=8)
    pub fn set_subdivision(&mut self, n: u8) -> Result<(), ConfigError> {
        if n == 0 || n > MAX_SUBDIVISION {
            return Err(ConfigError::SubdivisionOutOfRange(n));
        }
        self.send(Command::SetSubdivision(n));
        Ok(())
    }

    /// Rotate one beat's emphasis: Normal → Accent → Mute → Normal
    pub fn cycle_beat_emphasis(&mut self, beat: u8) -> Result<(), ConfigError> {
        if beat >= MAX_BEATS_PER_BAR {
            return Err(ConfigError::BeatIndexOutOfRange(beat));
        }
        self.send(Command::CycleEmphasis(beat));
        Ok(())
    }

    /// Record a tap at the current clock time
    pub fn tap(&mut self) {
        let at_secs = self.clock.now_secs();
        self.send(Command::Tap(at_secs));
    }

    /// Install a trainer configuration (takes effect at the next bar boundary)
    pub fn set_trainer(&mut self, config: TrainerConfig) {
        self.send(Command::SetTrainer(config));
    }

    /// Master volume, clamped to [0.0, 1.0]; applied directly, no queueing
    pub fn set_volume(&mut self, volume: f32) {
        self.output.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.output.volume()
    }

    /// Clock handle, for observers that want to compare event times to now
    pub fn clock(&self) -> AudioClock {
        self.clock.clone()
    }

    fn send(&mut self, command: Command) {
        let _ = self.commands.try_push(command);
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        let _ = self.commands.try_push(Command::Shutdown);
        if let Some(handle) = self.engine_thread.take() {
            let _ = handle.join();
        }
    }
}

/// The engine tick thread: drain commands, run the scheduler, publish events
///
/// All mutable engine state lives in this function; the only shared values
/// are the clock (written by the audio callback) and the ring buffer ends.
fn engine_loop(
    mut commands: CommandConsumer,
    mut events: EventProducer,
    mut dispatcher: ChannelDispatcher,
    clock: AudioClock,
) {
    let mut tempo = TempoController::new();
    let mut pattern = BeatPattern::new();
    let mut taps = TapTempo::new();
    let mut scheduler = Scheduler::new();
    let mut pending_events: Vec<EngineEvent> = Vec::with_capacity(64);

    loop {
        while let Some(command) = commands.try_pop() {
            match command {
                Command::Shutdown => return,
                Command::Start => {
                    scheduler.start(clock.now_secs());
                    pending_events.emit(EngineEvent::Started);
                }
                Command::Stop => {
                    scheduler.stop();
                    dispatcher.clear();
                    pending_events.emit(EngineEvent::Stopped);
                }
                Command::SetBpm(value) => {
                    if let Some(bpm) = tempo.set_bpm(value) {
                        pending_events.emit(EngineEvent::BpmChanged { bpm });
                    }
                }
                Command::AdjustBpm(delta) => {
                    if let Some(bpm) = tempo.adjust_bpm(delta) {
                        pending_events.emit(EngineEvent::BpmChanged { bpm });
                    }
                }
                // Facade-validated; a rejected value here means a racing
                // reconfiguration and is dropped, prior state intact
                Command::SetBeatsPerBar(n) => {
                    let _ = pattern.set_beats_per_bar(n);
                }
                Command::SetSubdivision(n) => {
                    let _ = pattern.set_subdivision(n);
                }
                Command::CycleEmphasis(beat) => {
                    let _ = pattern.cycle_emphasis(beat);
                }
                Command::Tap(at_secs) => {
                    if let Some(estimate) = taps.record_tap(at_secs) {
                        if let Some(bpm) = tempo.set_bpm(estimate) {
                            pending_events.emit(EngineEvent::BpmChanged { bpm });
                        }
                    }
                }
                Command::SetTrainer(config) => {
                    tempo.set_trainer(config);
                }
            }
        }

        scheduler.advance(
            clock.now_secs(),
            &mut tempo,
            &pattern,
            &mut dispatcher,
            &mut pending_events,
        );

        for event in pending_events.drain(..) {
            let _ = events.try_push(event);
        }

        thread::sleep(Duration::from_millis(scheduler::TICK_PERIOD_MS));
    }
}
