// Audio module - Clock, click synthesis, and CPAL output

pub mod click;
pub mod clock;
pub mod output;

pub use click::{ClickKind, ClickSound, ClickVoice};
pub use clock::AudioClock;
pub use output::{
    AudioOutput, ChannelDispatcher, ClickConsumer, ClickMessage, ClickProducer, MasterVolume,
    ScheduledClick, create_click_channel,
};

use thiserror::Error;

/// Audio device and stream errors
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("failed to query device configuration: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
