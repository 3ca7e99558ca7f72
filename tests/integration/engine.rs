//! Engine integration tests
//!
//! Playback events, extra ports and teardown.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use airwave::prelude::*;
use airwave::{AttachError, Domain, Error, SampleBuffer, TapError};
use std::thread;

#[test]
fn test_engine_starts_idle() {
    let rig = Rig::new();
    assert_eq!(rig.engine.state(), GraphState::Uninitialized);
    assert!(!rig.engine.is_ready());
    assert!(!rig.engine.is_playing());
    assert_eq!(rig.engine.playback(), None);
    assert!(rig.engine.beat().is_none());
    assert!(rig.engine.tempo_bpm().is_none());
}

#[test]
fn test_port_unavailable_until_running() {
    let mut rig = Rig::new();

    let err = rig.engine.create_port(PortConfig::frequency(64)).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(airwave::core::Error::PortUnavailable(GraphState::Uninitialized))
    ));
    assert!(err.is_transient());
}

#[test]
fn test_invalid_port_config_rejected() {
    let mut rig = Rig::live();
    let err = rig
        .engine
        .create_port(PortConfig::frequency(100))
        .unwrap_err();
    assert!(matches!(err, Error::Core(airwave::core::Error::InvalidConfig(_))));
    assert!(!err.is_transient());
}

#[test]
fn test_time_port_reads_stream() {
    let mut rig = Rig::live();
    let mut port = rig.engine.create_port(PortConfig::time(256)).unwrap();
    assert_eq!(port.domain(), Domain::Time);

    rig.tick_with(&[0.5; SAMPLES_PER_FRAME]);
    let buffer = port.read();
    assert_eq!(buffer.len(), 256);
    assert!(buffer.as_slice().iter().all(|&b| b == 192));
}

#[test]
fn test_frequency_port_sees_tone() {
    let mut rig = Rig::live();
    let mut port = rig
        .engine
        .create_port(PortConfig::frequency(256).with_smoothing(0.0))
        .unwrap();

    rig.tick_with(&generate_silence(SAMPLES_PER_FRAME));
    assert!(port.read().as_slice().iter().all(|&b| b == 0));

    rig.tick_with(&generate_sine(2000.0, 0.8, SAMPLES_PER_FRAME));
    let buffer = port.read();
    assert!(buffer.as_slice().iter().any(|&b| b > 128));
    assert!(buffer.mean() > 0.0);
}

#[test]
fn test_ports_share_one_tap() {
    let mut rig = Rig::live();
    let mut low = rig.engine.create_port(PortConfig::frequency(64)).unwrap();
    let mut wave = rig.engine.create_port(PortConfig::time(1024)).unwrap();

    rig.tick_with(&generate_sine(440.0, 0.5, SAMPLES_PER_FRAME));
    assert_eq!(low.read().len(), 64);
    assert_eq!(wave.read().len(), 1024);
    assert_eq!(rig.platform.taps_created(), 1);
}

#[test]
fn test_release_tears_down_ports() {
    let mut rig = Rig::live();
    let mut port = rig.engine.create_port(PortConfig::time(128)).unwrap();
    rig.tick_with(&[0.5; SAMPLES_PER_FRAME]);
    assert!(port.is_connected());

    assert_eq!(rig.engine.release(), Some(rig.station));
    assert!(!port.is_connected());
    assert!(!rig.engine.is_ready());
    assert!(port
        .read()
        .as_slice()
        .iter()
        .all(|&b| b == SampleBuffer::TIME_ZERO));
    assert_eq!(rig.engine.graph().port_count(), 0);
}

#[test]
fn test_playback_cleared_keeps_tap() {
    let mut rig = Rig::live();
    assert!(rig.platform.is_routed(rig.station));

    rig.engine.sync_playback(None, false);
    assert_eq!(rig.engine.playback(), None);
    assert!(!rig.engine.is_playing());
    assert_eq!(rig.engine.graph().tap_owner(), Some(rig.station));
    assert!(rig.platform.is_routed(rig.station));

    rig.engine.sync_playback(Some(rig.station), true);
    assert!(rig.engine.is_playing());
    assert_eq!(rig.platform.taps_created(), 1);
}

#[test]
fn test_retap_after_release_is_permanent() {
    let mut rig = Rig::live();
    rig.engine.release();

    let err = rig.engine.on_playback_started(rig.station).unwrap_err();
    assert!(matches!(
        err,
        Error::Attach(AttachError::Platform(TapError::AlreadyTapped(h))) if h == rig.station
    ));
    assert!(!err.is_transient());
}

#[test]
fn test_pause_keeps_tap() {
    let mut rig = Rig::live();

    rig.engine.sync_playback(Some(rig.station), false);
    rig.tick();
    assert!(!rig.engine.is_playing());
    assert!(!rig.engine.context().playing);
    assert_eq!(rig.engine.graph().tap_owner(), Some(rig.station));
    assert!(rig.engine.is_ready());
}

#[test]
fn test_tick_context_tracks_clock() {
    let mut rig = Rig::live();
    let before = rig.now;
    let cx = rig.tick();
    assert_eq!(cx.now, before + FRAME);
    assert!(cx.playing);
    assert!(cx.beat_intensity.abs() < FLOAT_EPSILON);
}

#[test]
fn test_feed_from_decoder_thread() {
    let mut rig = Rig::live();
    let mut port = rig.engine.create_port(PortConfig::time(512)).unwrap();

    let spare = rig.platform.register_stream(PlaybackHandle::new(99), 1);
    let mut feed = std::mem::replace(&mut rig.feed, spare);

    let written = thread::spawn(move || feed.push_mono(&[0.5; 512]))
        .join()
        .unwrap();
    assert_eq!(written, 512);

    rig.tick();
    assert!(port.read().as_slice().iter().all(|&b| b == 192));
}
