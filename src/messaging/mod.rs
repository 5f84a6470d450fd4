// Messaging module - Ring buffer channels between UI, engine, and audio

pub mod channels;
pub mod command;
pub mod event;

pub use channels::{
    CommandConsumer, CommandProducer, EventConsumer, EventProducer, create_command_channel,
    create_event_channel,
};
pub use command::Command;
pub use event::EngineEvent;
