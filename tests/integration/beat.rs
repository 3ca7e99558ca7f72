//! Beat detection integration tests
//!
//! The engine's own frequency port feeds the detector once per tick.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use airwave::prelude::*;
use std::time::Duration;

const BURST_AMPLITUDE: f32 = 0.8;

fn quiet(rig: &mut Rig) -> TickContext {
    rig.tick_with(&generate_silence(SAMPLES_PER_FRAME))
}

fn burst(rig: &mut Rig, seed: u64) -> TickContext {
    rig.tick_with(&generate_noise(SAMPLES_PER_FRAME, BURST_AMPLITUDE, seed))
}

#[test]
fn test_silence_never_beats() {
    let mut rig = Rig::live();
    let mut log = BeatLog::default();

    for _ in 0..100 {
        let cx = quiet(&mut rig);
        log.observe(rig.engine.beat());
        assert!(cx.beat_intensity.abs() < FLOAT_EPSILON);
    }
    assert_eq!(log.len(), 0);
    assert!(rig.engine.tempo_bpm().is_none());
}

#[test]
fn test_single_burst_is_one_beat() {
    let mut rig = Rig::live();
    let mut log = BeatLog::default();

    for _ in 0..60 {
        quiet(&mut rig);
    }
    let cx = burst(&mut rig, 7);
    log.observe(rig.engine.beat());
    assert!(cx.beat_intensity > 0.5, "intensity {}", cx.beat_intensity);

    for _ in 0..40 {
        quiet(&mut rig);
        log.observe(rig.engine.beat());
    }
    assert_eq!(log.len(), 1);
}

#[test]
fn test_beat_stays_active_briefly() {
    let mut rig = Rig::live();
    for _ in 0..60 {
        quiet(&mut rig);
    }
    burst(&mut rig, 11);
    let beat = rig.engine.beat().expect("beat on burst");
    assert_eq!(beat.timestamp, rig.now);

    // 120 ms active window at 16 ms per frame.
    for _ in 0..7 {
        quiet(&mut rig);
        assert_eq!(rig.engine.beat().map(|b| b.timestamp), Some(beat.timestamp));
    }
    for _ in 0..3 {
        quiet(&mut rig);
    }
    assert!(rig.engine.beat().is_none());
    assert!(rig.engine.context().beat_intensity.abs() < FLOAT_EPSILON);
}

#[test]
fn test_debounce_holds_under_dense_bursts() {
    let mut rig = Rig::live();
    let mut log = BeatLog::default();

    for _ in 0..50 {
        quiet(&mut rig);
    }
    // A burst every other frame would beat every 32 ms without debounce.
    for i in 0..120u64 {
        if i % 2 == 0 {
            burst(&mut rig, i);
        } else {
            quiet(&mut rig);
        }
        log.observe(rig.engine.beat());
    }

    assert!(log.len() >= 2, "expected several beats, got {}", log.len());
    let debounce = rig.engine.config().beat.debounce;
    assert!(log.min_gap().unwrap() >= debounce);
}

#[test]
fn test_tempo_follows_regular_bursts() {
    let mut rig = Rig::live();
    for _ in 0..50 {
        quiet(&mut rig);
    }

    // A burst every 32 frames (512 ms) is ~117 BPM.
    for bar in 0..12u64 {
        burst(&mut rig, bar);
        for _ in 0..31 {
            quiet(&mut rig);
        }
    }

    let bpm = rig.engine.tempo_bpm().expect("tempo after regular beats");
    assert!((bpm - 117.2).abs() < 1.0, "bpm {bpm}");
}

#[test]
fn test_stop_resets_beat_state() {
    let mut rig = Rig::live();
    for _ in 0..60 {
        quiet(&mut rig);
    }
    burst(&mut rig, 3);
    assert!(rig.engine.beat().is_some());

    rig.engine.sync_playback(Some(rig.station), false);
    assert!(rig.engine.beat().is_none());

    // Paused ticks leave the detector untouched.
    rig.tick_with(&generate_noise(SAMPLES_PER_FRAME, BURST_AMPLITUDE, 4));
    assert!(rig.engine.beat().is_none());
    assert!(rig.engine.tempo_bpm().is_none());
}

#[test]
fn test_custom_debounce_from_config() {
    let config = EngineConfig {
        beat: BeatConfig::default().with_debounce(Duration::from_millis(400)),
        ..EngineConfig::default()
    };
    let mut rig = Rig::with_config(config);
    rig.engine.notify_interaction();
    rig.engine.sync_playback(Some(rig.station), true);

    let mut log = BeatLog::default();
    for _ in 0..50 {
        quiet(&mut rig);
    }
    for i in 0..100u64 {
        if i % 3 == 0 {
            burst(&mut rig, i);
        } else {
            quiet(&mut rig);
        }
        log.observe(rig.engine.beat());
    }
    assert!(log.min_gap().unwrap() >= Duration::from_millis(400));
}
