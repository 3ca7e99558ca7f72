//! Activation lifecycle integration tests
//!
//! Gesture gating, single-tap ownership and the suspended/running cycle.

use crate::helpers::*;
use airwave::prelude::*;
use airwave::{AttachError, Error};

#[test]
fn test_attach_waits_for_gesture() {
    let mut rig = Rig::new();

    let err = rig.engine.on_playback_started(rig.station).unwrap_err();
    assert!(matches!(err, Error::Attach(AttachError::AwaitingGesture)));
    assert!(err.is_transient());
    assert_eq!(rig.engine.state(), GraphState::AwaitingGesture);
    assert_eq!(rig.platform.taps_created(), 0);

    // The interaction retries the pending attach.
    rig.engine.notify_interaction();
    assert_eq!(rig.engine.graph().tap_owner(), Some(rig.station));
    assert_eq!(rig.platform.taps_created(), 1);

    rig.tick();
    assert!(rig.engine.is_ready());
    assert!(rig.platform.is_routed(rig.station));
}

#[test]
fn test_attach_is_idempotent() {
    let mut rig = Rig::live();

    let first = rig.engine.graph().tap().cloned().unwrap();
    let again = rig.engine.graph_mut().attach(rig.station).unwrap();
    let via_play = rig.engine.on_playback_started(rig.station).unwrap();

    assert_eq!(first, again);
    assert_eq!(first, via_play);
    assert_eq!(rig.platform.taps_created(), 1);
}

#[test]
fn test_second_handle_rejected_until_release() {
    let mut rig = Rig::live();
    let other = PlaybackHandle::new(2);
    let _other_feed = rig.platform.register_stream(other, FEED_CAPACITY);

    let err = rig.engine.graph_mut().attach(other).unwrap_err();
    assert_eq!(
        err,
        AttachError::AlreadyBound {
            bound: rig.station,
            requested: other,
        }
    );

    assert_eq!(rig.engine.release(), Some(rig.station));
    let tap = rig.engine.graph_mut().attach(other).unwrap();
    assert_eq!(tap.handle(), other);
}

#[test]
fn test_switching_stations_rebinds_tap() {
    let mut rig = Rig::live();
    let other = PlaybackHandle::new(2);
    let _other_feed = rig.platform.register_stream(other, FEED_CAPACITY);

    rig.engine.sync_playback(Some(other), true);
    rig.tick();

    assert_eq!(rig.engine.graph().tap_owner(), Some(other));
    assert!(!rig.platform.is_routed(rig.station));
    assert!(rig.platform.is_routed(other));
    assert!(rig.engine.is_ready());
}

#[test]
fn test_policy_block_is_permanent() {
    let mut rig = Rig::new();
    rig.platform.block(rig.station);
    rig.engine.notify_interaction();

    let err = rig.engine.on_playback_started(rig.station).unwrap_err();
    assert!(matches!(
        err,
        Error::Attach(AttachError::BlockedByPolicy(handle)) if handle == rig.station
    ));
    assert!(!err.is_transient());
    assert_eq!(rig.engine.state(), GraphState::Blocked);

    // Retries never reach the platform again.
    for _ in 0..10 {
        rig.engine.notify_interaction();
        rig.engine.sync_playback(Some(rig.station), false);
        rig.engine.sync_playback(Some(rig.station), true);
        rig.tick();
    }
    assert_eq!(rig.platform.taps_created(), 0);
    assert_eq!(rig.engine.state(), GraphState::Blocked);
    assert!(!rig.engine.is_ready());
}

#[test]
fn test_suspension_heals_on_next_play() {
    let mut rig = Rig::live();
    let attempts = rig.engine.graph().activation_attempts();

    rig.platform.suspend();
    rig.tick();
    assert_eq!(rig.engine.state(), GraphState::Suspended);
    assert!(!rig.engine.is_ready());

    rig.engine.sync_playback(Some(rig.station), false);
    rig.engine.sync_playback(Some(rig.station), true);
    rig.tick();

    assert_eq!(rig.engine.state(), GraphState::Running);
    assert!(rig.engine.graph().activation_attempts() > attempts);
}

#[test]
fn test_rejected_resume_retried_without_limit() {
    let mut rig = Rig::live();
    rig.platform.suspend();
    rig.platform.set_accept_resume(false);
    rig.tick();

    for _ in 0..5 {
        rig.engine.notify_interaction();
        rig.tick();
        assert_eq!(rig.engine.state(), GraphState::Suspended);
    }

    rig.platform.set_accept_resume(true);
    rig.engine.notify_interaction();
    rig.tick();
    assert_eq!(rig.engine.state(), GraphState::Running);
    assert!(rig.platform.resume_requests() >= 6);
}

#[test]
fn test_slow_resume_observed_on_later_tick() {
    let mut rig = Rig::new();
    rig.platform.set_resume_latency(4);
    rig.engine.notify_interaction();
    rig.engine.sync_playback(Some(rig.station), true);
    assert_eq!(rig.engine.state(), GraphState::Suspended);

    rig.tick();
    rig.tick();
    assert_eq!(rig.engine.state(), GraphState::Suspended);
    assert!(!rig.engine.is_ready());

    rig.tick();
    assert_eq!(rig.engine.state(), GraphState::Running);
}
