// Audio output - CPAL stream that turns scheduled clicks into sound
//
// The engine thread sends `ClickMessage`s over a lock-free ring buffer; the
// callback promotes due clicks to voices at their exact sample offset, mixes
// in f32, and converts to the device format at the buffer edge via CPAL's
// `FromSample`. The callback is also the sole writer of the audio clock.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::{
    HeapRb,
    traits::{Consumer, Producer, Split},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::audio::AudioError;
use crate::audio::click::{ClickKind, ClickSound, ClickVoice};
use crate::audio::clock::AudioClock;
use crate::engine::pattern::Emphasis;
use crate::engine::scheduler::SoundDispatcher;

/// Upper bound on clicks waiting inside the lookahead window
const MAX_PENDING_CLICKS: usize = 64;

/// Upper bound on simultaneously sounding clicks
const MAX_ACTIVE_VOICES: usize = 16;

/// A click with its absolute play time, as sent to the audio callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledClick {
    pub at_secs: f64,
    pub kind: ClickKind,
}

/// Engine-to-callback messages
///
/// `Clear` cancels clicks that were scheduled into the lookahead window but
/// have not started sounding yet; stop uses it so no stray clicks play after
/// the sequencer state is discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickMessage {
    Click(ScheduledClick),
    Clear,
}

pub type ClickProducer = ringbuf::HeapProd<ClickMessage>;
pub type ClickConsumer = ringbuf::HeapCons<ClickMessage>;

pub fn create_click_channel(capacity: usize) -> (ClickProducer, ClickConsumer) {
    let rb = HeapRb::<ClickMessage>::new(capacity);
    rb.split()
}

/// `SoundDispatcher` that forwards clicks to the audio callback
///
/// A full ring buffer drops the click; the scheduler keeps advancing and
/// observers keep getting notified regardless.
pub struct ChannelDispatcher {
    clicks: ClickProducer,
}

impl ChannelDispatcher {
    pub fn new(clicks: ClickProducer) -> Self {
        Self { clicks }
    }

    /// Cancel everything queued but not yet sounding
    pub fn clear(&mut self) {
        let _ = self.clicks.try_push(ClickMessage::Clear);
    }
}

impl SoundDispatcher for ChannelDispatcher {
    fn schedule_click(&mut self, at_secs: f64, emphasis: Emphasis, is_subdivision: bool) {
        if let Some(kind) = ClickKind::select(emphasis, is_subdivision) {
            let _ = self
                .clicks
                .try_push(ClickMessage::Click(ScheduledClick { at_secs, kind }));
        }
    }
}

/// Master volume cell shared between the control surface and the callback
///
/// f32 stored as bits in an `AtomicU32`; single writer (the control
/// surface), read once per buffer by the callback.
#[derive(Debug, Clone)]
pub struct MasterVolume {
    bits: Arc<AtomicU32>,
}

impl MasterVolume {
    const DEFAULT: f32 = 0.8;

    pub fn new() -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(Self::DEFAULT.to_bits())),
        }
    }

    /// Set the volume, clamped to [0.0, 1.0]
    pub fn set(&self, volume: f32) {
        self.bits
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the CPAL output stream, the audio clock, and the volume cell
pub struct AudioOutput {
    _stream: Stream,
    clock: AudioClock,
    volume: MasterVolume,
    sample_rate: f32,
}

impl AudioOutput {
    /// Open the default output device and start the stream
    pub fn new(clicks: ClickConsumer) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let clock = AudioClock::new(sample_rate as f64);
        let volume = MasterVolume::new();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                sample_rate,
                clicks,
                clock.clone(),
                volume.clone(),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                sample_rate,
                clicks,
                clock.clone(),
                volume.clone(),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                sample_rate,
                clicks,
                clock.clone(),
                volume.clone(),
            ),
            other => return Err(AudioError::UnsupportedSampleFormat(format!("{other:?}"))),
        }?;

        stream.play()?;

        Ok(Self {
            _stream: stream,
            clock,
            volume,
            sample_rate,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        sample_rate: f32,
        mut clicks: ClickConsumer,
        clock: AudioClock,
        volume: MasterVolume,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let sound = ClickSound::new(sample_rate);
        let mut pending: Vec<ScheduledClick> = Vec::with_capacity(MAX_PENDING_CLICKS);
        let mut active: Vec<ClickVoice> = Vec::with_capacity(MAX_ACTIVE_VOICES);

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // No allocations, no I/O, no blocking locks in here
                let frames = data.len() / channels;
                let buffer_start = clock.current_sample();
                let buffer_end = buffer_start + frames as u64;

                while let Some(message) = clicks.try_pop() {
                    match message {
                        ClickMessage::Click(click) => {
                            if pending.len() < MAX_PENDING_CLICKS {
                                pending.push(click);
                            }
                        }
                        ClickMessage::Clear => {
                            pending.clear();
                            active.clear();
                        }
                    }
                }

                // Promote clicks that start inside (or before) this buffer.
                // A click that arrived late starts at the buffer head so it
                // plays in full rather than truncated.
                let mut index = 0;
                while index < pending.len() {
                    let start = clock.secs_to_samples(pending[index].at_secs);
                    if start < buffer_end {
                        if active.len() < MAX_ACTIVE_VOICES {
                            active.push(ClickVoice::new(
                                pending[index].kind,
                                start.max(buffer_start),
                            ));
                        }
                        pending.swap_remove(index);
                    } else {
                        index += 1;
                    }
                }

                let gain = volume.get();
                for frame in 0..frames {
                    let sample_index = buffer_start + frame as u64;
                    let mut mixed = 0.0f32;
                    for voice in &active {
                        mixed += voice.sample_at(sample_index, &sound);
                    }
                    let value = (mixed * gain).clamp(-1.0, 1.0);
                    let converted = T::from_sample(value);
                    for channel in 0..channels {
                        data[frame * channels + channel] = converted;
                    }
                }

                active.retain(|voice| !voice.finished_by(buffer_end, &sound));
                clock.advance(frames);
            },
            move |err| {
                eprintln!("Audio stream error: {err}");
            },
            None,
        )?;

        Ok(stream)
    }

    /// Clock handle for the scheduler thread
    pub fn clock(&self) -> AudioClock {
        self.clock.clone()
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.set(volume);
    }

    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_volume_clamps() {
        let volume = MasterVolume::new();
        assert_eq!(volume.get(), 0.8);

        volume.set(1.5);
        assert_eq!(volume.get(), 1.0);

        volume.set(-0.5);
        assert_eq!(volume.get(), 0.0);

        volume.set(0.25);
        assert_eq!(volume.get(), 0.25);
    }

    #[test]
    fn test_dispatcher_maps_emphasis_to_kind() {
        let (tx, mut rx) = create_click_channel(8);
        let mut dispatcher = ChannelDispatcher::new(tx);

        dispatcher.schedule_click(1.0, Emphasis::Accent, false);
        dispatcher.schedule_click(1.5, Emphasis::Normal, false);
        dispatcher.schedule_click(1.75, Emphasis::Accent, true);
        dispatcher.schedule_click(2.0, Emphasis::Mute, false);

        assert_eq!(
            rx.try_pop(),
            Some(ClickMessage::Click(ScheduledClick {
                at_secs: 1.0,
                kind: ClickKind::Accent
            }))
        );
        assert_eq!(
            rx.try_pop(),
            Some(ClickMessage::Click(ScheduledClick {
                at_secs: 1.5,
                kind: ClickKind::Normal
            }))
        );
        assert_eq!(
            rx.try_pop(),
            Some(ClickMessage::Click(ScheduledClick {
                at_secs: 1.75,
                kind: ClickKind::Tick
            }))
        );
        // The muted beat never produced a message
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_dispatcher_clear_message() {
        let (tx, mut rx) = create_click_channel(8);
        let mut dispatcher = ChannelDispatcher::new(tx);

        dispatcher.schedule_click(1.0, Emphasis::Normal, false);
        dispatcher.clear();

        assert!(matches!(rx.try_pop(), Some(ClickMessage::Click(_))));
        assert_eq!(rx.try_pop(), Some(ClickMessage::Clear));
    }

    #[test]
    fn test_full_channel_drops_clicks() {
        let (tx, mut rx) = create_click_channel(2);
        let mut dispatcher = ChannelDispatcher::new(tx);

        for n in 0..5 {
            dispatcher.schedule_click(n as f64, Emphasis::Normal, false);
        }

        // Only the first two made it; the rest were dropped, not queued
        assert!(rx.try_pop().is_some());
        assert!(rx.try_pop().is_some());
        assert_eq!(rx.try_pop(), None);
    }
}
