//! Behavior tests for the scheduling core
//!
//! These drive the scheduler, tempo controller, trainer, and tap estimator
//! together the way the engine thread does, without opening an audio device:
//! the clock is a plain number and the dispatcher records what it is asked
//! to play.

use clicktrack::{
    BeatPattern, Emphasis, EngineEvent, Scheduler, SoundDispatcher, TapTempo, TempoController,
    TrainerConfig, TrainerMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Dispatcher that records every requested click
#[derive(Default)]
struct Recorder {
    clicks: Vec<(f64, Emphasis, bool)>,
}

impl SoundDispatcher for Recorder {
    fn schedule_click(&mut self, at_secs: f64, emphasis: Emphasis, is_subdivision: bool) {
        self.clicks.push((at_secs, emphasis, is_subdivision));
    }
}

/// Scheduled times never drift, no matter how raggedly the tick fires
#[test]
fn test_thousand_notes_without_drift() {
    let mut scheduler = Scheduler::new();
    let mut tempo = TempoController::with_bpm(120);
    let pattern = BeatPattern::new();

    let mut recorder = Recorder::default();
    let mut events: Vec<EngineEvent> = Vec::new();
    let mut rng = StdRng::seed_from_u64(7);

    scheduler.start(0.0);
    let mut now = 0.0;
    while recorder.clicks.len() < 1000 {
        // Nominal 25 ms tick with up to 40 ms of extra latency
        now += 0.025 + rng.gen_range(0.0..0.040);
        scheduler.advance(now, &mut tempo, &pattern, &mut recorder, &mut events);
    }

    // At 120 BPM with no subdivisions the n-th note lands on n * 0.5 s
    for (n, (at, _, _)) in recorder.clicks.iter().take(1000).enumerate() {
        let expected = n as f64 * 0.5;
        assert!(
            (at - expected).abs() < 1e-9,
            "note {} drifted: {} vs {}",
            n,
            at,
            expected
        );
    }
}

/// Full trainer ramp: 120 to 140 in +5 steps every 4 bars, then flat forever
#[test]
fn test_trainer_ramp_levels_off() {
    let mut scheduler = Scheduler::new();
    let mut tempo = TempoController::with_bpm(120);
    tempo.set_trainer(TrainerConfig {
        mode: TrainerMode::Increase,
        amount_bpm: 5,
        interval_bars: 4,
        stop_bpm: 140,
    });
    let pattern = BeatPattern::new();

    let mut recorder = Recorder::default();
    let mut events: Vec<EngineEvent> = Vec::new();

    scheduler.start(0.0);
    let mut now = 0.0;
    let mut bpm_history: Vec<u16> = Vec::new();
    // Enough ticks for well over 40 bars even at the final tempo
    for _ in 0..6000 {
        now += 0.025;
        scheduler.advance(now, &mut tempo, &pattern, &mut recorder, &mut events);
        for event in events.drain(..) {
            if let EngineEvent::BpmChanged { bpm } = event {
                bpm_history.push(bpm);
            }
        }
    }

    assert_eq!(bpm_history, vec![125, 130, 135, 140]);
    assert_eq!(tempo.bpm(), 140);
    assert!(scheduler.state().bar_count > 40);
}

/// The ramp steps exactly at the configured bar boundaries
#[test]
fn test_trainer_fires_on_bar_multiples_only() {
    let mut scheduler = Scheduler::new();
    let mut tempo = TempoController::with_bpm(60);
    tempo.set_trainer(TrainerConfig {
        mode: TrainerMode::Increase,
        amount_bpm: 10,
        interval_bars: 2,
        stop_bpm: 300,
    });
    let mut pattern = BeatPattern::new();
    pattern.set_beats_per_bar(2).unwrap();

    let mut recorder = Recorder::default();
    let mut events: Vec<EngineEvent> = Vec::new();

    scheduler.start(0.0);
    let mut bars_at_change: Vec<u64> = Vec::new();
    let mut now = 0.0;
    for _ in 0..2000 {
        now += 0.025;
        scheduler.advance(now, &mut tempo, &pattern, &mut recorder, &mut events);
        for event in events.drain(..) {
            if matches!(event, EngineEvent::BpmChanged { .. }) {
                bars_at_change.push(scheduler.state().bar_count);
            }
        }
        if bars_at_change.len() >= 4 {
            break;
        }
    }

    assert_eq!(&bars_at_change[..4], &[2, 4, 6, 8]);
}

/// Steady 500 ms taps mean 120 BPM, a 400 ms pair means 150, and a lone
/// tap means nothing
#[test]
fn test_tap_sequences() {
    let mut taps = TapTempo::new();
    assert_eq!(taps.record_tap(0.0), None);
    assert_eq!(taps.record_tap(0.5), Some(120));
    assert_eq!(taps.record_tap(1.0), Some(120));
    assert_eq!(taps.record_tap(1.5), Some(120));

    let mut taps = TapTempo::new();
    taps.record_tap(100.0);
    assert_eq!(taps.record_tap(100.4), Some(150));

    let tempo = TempoController::with_bpm(90);
    let mut taps = TapTempo::new();
    assert_eq!(taps.record_tap(5.0), None);
    // No estimate, so the controller is never touched
    assert_eq!(tempo.bpm(), 90);
}

/// A tap estimate flows through the tempo controller like any other set
#[test]
fn test_tap_estimate_applies_through_controller() {
    let mut tempo = TempoController::with_bpm(90);
    let mut taps = TapTempo::new();

    taps.record_tap(0.0);
    let estimate = taps.record_tap(0.5).unwrap();
    assert_eq!(tempo.set_bpm(estimate), Some(120));
    assert_eq!(tempo.bpm(), 120);
}

/// Muting the downbeat silences it for ten straight bars while observers
/// keep seeing every bar start
#[test]
fn test_muted_downbeat_stays_visible_to_observers() {
    let mut scheduler = Scheduler::new();
    let mut tempo = TempoController::with_bpm(120);
    let mut pattern = BeatPattern::new();
    // Accent -> Mute on beat 0
    assert_eq!(pattern.cycle_emphasis(0).unwrap(), Emphasis::Mute);

    let mut recorder = Recorder::default();
    let mut events: Vec<EngineEvent> = Vec::new();
    let mut beat0_notifications = 0u64;

    scheduler.start(0.0);
    let mut now = 0.0;
    while scheduler.state().bar_count < 10 {
        now += 0.025;
        scheduler.advance(now, &mut tempo, &pattern, &mut recorder, &mut events);
        for event in events.drain(..) {
            if matches!(event, EngineEvent::BeatChanged { beat: 0, .. }) {
                beat0_notifications += 1;
            }
        }
    }

    // Bar duration is 2 s at 120 BPM in 4/4, so beat 0 falls on even seconds
    for (at, _, _) in &recorder.clicks {
        assert!(
            at.rem_euclid(2.0) > 0.25,
            "click at {} landed on the muted downbeat",
            at
        );
    }
    assert!(beat0_notifications >= 10);
}

/// Invalid meter values leave the prior configuration fully intact
#[test]
fn test_rejected_config_preserves_state() {
    let mut pattern = BeatPattern::new();
    pattern.set_subdivision(3).unwrap();
    pattern.set_beats_per_bar(7).unwrap();

    assert!(pattern.set_subdivision(9).is_err());
    assert!(pattern.set_beats_per_bar(0).is_err());
    assert!(pattern.set_beats_per_bar(17).is_err());

    assert_eq!(pattern.subdivision(), 3);
    assert_eq!(pattern.beats_per_bar(), 7);

    // The sequencer keeps running cleanly on the preserved configuration
    let mut scheduler = Scheduler::new();
    let mut tempo = TempoController::with_bpm(210);
    let mut recorder = Recorder::default();
    let mut events: Vec<EngineEvent> = Vec::new();

    scheduler.start(0.0);
    let mut now = 0.0;
    for _ in 0..400 {
        now += 0.025;
        scheduler.advance(now, &mut tempo, &pattern, &mut recorder, &mut events);
    }

    let max_beat = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::BeatChanged { beat, .. } => Some(*beat),
            _ => None,
        })
        .max()
        .unwrap();
    let max_subdivision = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::SubdivisionChanged { subdivision, .. } => Some(*subdivision),
            _ => None,
        })
        .max()
        .unwrap();

    assert_eq!(max_beat, 6);
    assert_eq!(max_subdivision, 2);
}

/// Changing the subdivision mid-flight keeps spacing consistent with the
/// live configuration from the next note on
#[test]
fn test_subdivision_change_mid_session() {
    let mut scheduler = Scheduler::new();
    let mut tempo = TempoController::with_bpm(120);
    let mut pattern = BeatPattern::new();

    let mut recorder = Recorder::default();
    let mut events: Vec<EngineEvent> = Vec::new();

    scheduler.start(0.0);
    scheduler.advance(0.9, &mut tempo, &pattern, &mut recorder, &mut events);
    let scheduled_before = recorder.clicks.len();

    pattern.set_subdivision(2).unwrap();
    scheduler.advance(1.9, &mut tempo, &pattern, &mut recorder, &mut events);

    // New notes are 0.25 s apart
    let new_deltas: Vec<f64> = recorder.clicks[scheduled_before..]
        .windows(2)
        .map(|pair| pair[1].0 - pair[0].0)
        .collect();
    assert!(!new_deltas.is_empty());
    for delta in new_deltas {
        assert!((delta - 0.25).abs() < 1e-9);
    }
}
