// clicktrack - Library exports for tests and benchmarks

pub mod audio;
pub mod engine;
pub mod messaging;

// Re-export commonly used types for convenience
pub use audio::click::{ClickKind, ClickSound};
pub use audio::clock::AudioClock;
pub use audio::output::{AudioOutput, ChannelDispatcher, MasterVolume, create_click_channel};
pub use audio::AudioError;
pub use engine::pattern::{BeatPattern, Emphasis};
pub use engine::scheduler::{EventSink, Scheduler, SchedulerState, SoundDispatcher};
pub use engine::tap::TapTempo;
pub use engine::tempo::{TempoController, TrainerConfig, TrainerMode};
pub use engine::{ConfigError, Metronome};
pub use messaging::channels::{create_command_channel, create_event_channel};
pub use messaging::command::Command;
pub use messaging::event::EngineEvent;
