// clicktrack - Terminal metronome with trainer ramp and tap tempo

use anyhow::{Context, Result};
use clicktrack::messaging::channels::EventConsumer;
use clicktrack::{EngineEvent, Metronome, TrainerConfig, TrainerMode};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use ringbuf::traits::Consumer;
use std::io::{Write, stdout};
use std::time::Duration;

/// Keyboard poll period; events are drained at the same cadence
const POLL_PERIOD_MS: u64 = 10;

/// Trainer presets the `t` key cycles through
const TRAINER_PRESETS: [(&str, TrainerConfig); 3] = [
    (
        "off",
        TrainerConfig {
            mode: TrainerMode::Off,
            amount_bpm: 1,
            interval_bars: 1,
            stop_bpm: 120,
        },
    ),
    (
        "+5 BPM every 4 bars up to 180",
        TrainerConfig {
            mode: TrainerMode::Increase,
            amount_bpm: 5,
            interval_bars: 4,
            stop_bpm: 180,
        },
    ),
    (
        "-5 BPM every 4 bars down to 60",
        TrainerConfig {
            mode: TrainerMode::Decrease,
            amount_bpm: 5,
            interval_bars: 4,
            stop_bpm: 60,
        },
    ),
];

fn main() -> Result<()> {
    println!("=== clicktrack ===");
    let (mut metronome, events) = Metronome::new().context("failed to open audio output")?;

    println!("keys:");
    println!("  s        start / stop");
    println!("  space    tap tempo");
    println!("  + / -    bpm +1 / -1      ] / [   bpm +10 / -10");
    println!("  1..8     subdivisions per beat");
    println!("  b        cycle beats per bar (1..16)");
    println!("  e        cycle downbeat emphasis (normal/accent/mute)");
    println!("  t        cycle trainer preset");
    println!("  . / ,    volume up / down");
    println!("  q        quit");
    println!();

    terminal::enable_raw_mode().context("failed to enter raw mode")?;
    let result = run(&mut metronome, events);
    terminal::disable_raw_mode().context("failed to leave raw mode")?;
    println!();
    result
}

fn run(metronome: &mut Metronome, mut events: EventConsumer) -> Result<()> {
    let mut out = stdout();
    let mut running = false;
    let mut beats_per_bar: u8 = 4;
    let mut trainer_preset = 0usize;
    let mut volume = metronome.volume();

    loop {
        if event::poll(Duration::from_millis(POLL_PERIOD_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => metronome.tap(),
                    KeyCode::Char('s') => {
                        if running {
                            metronome.stop();
                        } else {
                            metronome.start();
                        }
                        running = !running;
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => metronome.adjust_bpm(1),
                    KeyCode::Char('-') => metronome.adjust_bpm(-1),
                    KeyCode::Char(']') => metronome.adjust_bpm(10),
                    KeyCode::Char('[') => metronome.adjust_bpm(-10),
                    KeyCode::Char(c @ '1'..='8') => {
                        let n = c as u8 - b'0';
                        metronome.set_subdivision(n)?;
                        status(&mut out, &format!("subdivision: {n}"))?;
                    }
                    KeyCode::Char('b') => {
                        beats_per_bar = beats_per_bar % 16 + 1;
                        metronome.set_beats_per_bar(beats_per_bar)?;
                        status(&mut out, &format!("beats per bar: {beats_per_bar}"))?;
                    }
                    KeyCode::Char('e') => {
                        metronome.cycle_beat_emphasis(0)?;
                        status(&mut out, "downbeat emphasis cycled")?;
                    }
                    KeyCode::Char('t') => {
                        trainer_preset = (trainer_preset + 1) % TRAINER_PRESETS.len();
                        let (name, config) = TRAINER_PRESETS[trainer_preset];
                        metronome.set_trainer(config);
                        status(&mut out, &format!("trainer: {name}"))?;
                    }
                    KeyCode::Char('.') => {
                        volume = (volume + 0.1).min(1.0);
                        metronome.set_volume(volume);
                        status(&mut out, &format!("volume: {volume:.1}"))?;
                    }
                    KeyCode::Char(',') => {
                        volume = (volume - 0.1).max(0.0);
                        metronome.set_volume(volume);
                        status(&mut out, &format!("volume: {volume:.1}"))?;
                    }
                    _ => {}
                }
            }
        }

        while let Some(engine_event) = events.try_pop() {
            match engine_event {
                EngineEvent::BeatChanged { beat, .. } => {
                    if beat == 0 {
                        write!(out, "\r\n| ")?;
                    }
                    write!(out, "{} ", beat + 1)?;
                }
                EngineEvent::SubdivisionChanged { subdivision, .. } => {
                    if subdivision != 0 {
                        write!(out, ". ")?;
                    }
                }
                EngineEvent::BpmChanged { bpm } => {
                    status(&mut out, &format!("{bpm} bpm"))?;
                }
                EngineEvent::Started => status(&mut out, "started")?,
                EngineEvent::Stopped => status(&mut out, "stopped")?,
            }
            out.flush()?;
        }
    }

    Ok(())
}

/// One status line; raw mode needs the explicit carriage return
fn status(out: &mut impl Write, message: &str) -> Result<()> {
    write!(out, "\r\n[{message}]\r\n")?;
    out.flush()?;
    Ok(())
}
