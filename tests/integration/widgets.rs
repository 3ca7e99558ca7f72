//! Widget integration tests
//!
//! Mounting, port acquisition, synthetic fallback and teardown.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use airwave::prelude::*;
use airwave::{FallbackConfig, RendererKind};

fn bars() -> BarSpectrum {
    BarSpectrum::new(BarSpectrumConfig::default()).unwrap()
}

fn all_renderers(rig: &mut Rig) -> Vec<Widget> {
    vec![
        rig.engine.mount(bars()),
        rig.engine
            .mount(Oscilloscope::new(WaveformConfig::default()).unwrap()),
        rig.engine
            .mount(StereoMeter::new(StereoMeterConfig::default()).unwrap()),
        rig.engine
            .mount(RadialBurst::new(RadialConfig::default()).unwrap()),
    ]
}

fn assert_frame_in_range(frame: RenderFrame<'_>) {
    match frame {
        RenderFrame::Bars(bars) => {
            for (&h, &p) in bars.heights.iter().zip(&bars.peaks) {
                assert!((4.0..=bars.max).contains(&h), "height {h}");
                assert!(p >= h - FLOAT_EPSILON, "peak {p} below height {h}");
            }
        }
        RenderFrame::Waveform(wave) => {
            // Offsets from the centre line, half the default height either way.
            assert!(wave.points.iter().all(|p| p.y.abs() <= 0.5 + FLOAT_EPSILON));
        }
        RenderFrame::Stereo(stereo) => {
            for channel in [stereo.left, stereo.right] {
                assert!((0.0..=1.0).contains(&channel.level));
                assert!(channel.peak >= channel.level - FLOAT_EPSILON);
            }
        }
        RenderFrame::Radial(radial) => {
            assert!(radial.spokes.iter().all(|s| s.length >= 0.0 && s.width > 0.0));
        }
    }
}

#[test]
fn test_widget_waits_then_goes_live() {
    let mut rig = Rig::new();
    let mut widget = rig.engine.mount(bars());
    assert_eq!(widget.kind(), RendererKind::Bars);

    rig.tick();
    let frame = rig.render(&mut widget);
    assert!(frame.as_bars().is_some());
    assert_eq!(widget.mode(), WidgetMode::Waiting);
    assert!(!widget.has_port());

    rig.engine.notify_interaction();
    rig.engine.sync_playback(Some(rig.station), true);
    rig.tick();
    rig.render(&mut widget);

    assert_eq!(widget.mode(), WidgetMode::Live);
    assert!(widget.has_port());
}

#[test]
fn test_widget_ids_are_unique() {
    let mut rig = Rig::new();
    let widgets = all_renderers(&mut rig);
    for (i, a) in widgets.iter().enumerate() {
        for b in &widgets[i + 1..] {
            assert_ne!(a.id(), b.id());
        }
    }
}

#[test]
fn test_silence_keeps_bars_at_floor() {
    let mut rig = Rig::live();
    let mut widget = rig.engine.mount(bars());

    for _ in 0..100 {
        rig.tick_with(&generate_silence(SAMPLES_PER_FRAME));
        let frame = rig.render(&mut widget).as_bars().unwrap();
        assert!(frame.heights.iter().all(|&h| (h - 4.0).abs() < FLOAT_EPSILON));
        assert!(frame.peaks.iter().all(|&p| (p - 4.0).abs() < FLOAT_EPSILON));
    }
    assert_eq!(widget.mode(), WidgetMode::Live);
}

#[test]
fn test_live_tone_raises_bars() {
    let mut rig = Rig::live();
    let mut widget = rig.engine.mount(bars());

    for _ in 0..30 {
        rig.tick_with(&generate_noise(SAMPLES_PER_FRAME, 0.8, 5));
        assert_frame_in_range(rig.render(&mut widget));
    }
    let frame = widget.frame().as_bars().unwrap().clone();
    assert!(frame.heights.iter().any(|&h| h > 100.0));

    // Peaks hold above the falling bars once the signal stops.
    rig.tick_with(&generate_silence(SAMPLES_PER_FRAME));
    let after = rig.render(&mut widget).as_bars().unwrap();
    for (i, (&h, &p)) in after.heights.iter().zip(&after.peaks).enumerate() {
        assert!(h <= frame.heights[i] + FLOAT_EPSILON);
        assert!(p >= h);
    }
}

#[test]
fn test_blocked_stream_falls_back_indefinitely() {
    let mut rig = Rig::new();
    rig.platform.block(rig.station);
    rig.engine.notify_interaction();
    rig.engine.sync_playback(Some(rig.station), true);
    assert_eq!(rig.engine.state(), GraphState::Blocked);

    let mut widgets = all_renderers(&mut rig);
    let mut first_bars = None;

    for tick in 0..500 {
        rig.tick();
        for widget in &mut widgets {
            let frame = rig.engine.render(widget);
            assert_frame_in_range(frame);
            if tick == 10 {
                if let Some(bars) = frame.as_bars() {
                    first_bars = Some(bars.heights.clone());
                }
            }
        }
    }

    for widget in &widgets {
        assert_eq!(widget.mode(), WidgetMode::Fallback);
        assert!(!widget.has_port());
    }

    // Synthetic motion keeps moving.
    let last = widgets[0].frame().as_bars().unwrap().heights.clone();
    assert_ne!(first_bars.unwrap(), last);
}

#[test]
fn test_paused_widget_rests() {
    let mut rig = Rig::live();
    let mut widget = rig.engine.mount(bars());
    let rest = 4.0 + FallbackConfig::default().rest_level * (255.0 - 4.0);

    rig.engine.sync_playback(Some(rig.station), false);
    for _ in 0..200 {
        rig.tick_with(&generate_noise(SAMPLES_PER_FRAME, 0.8, 9));
        rig.render(&mut widget);
    }

    let frame = widget.frame().as_bars().unwrap();
    assert!(frame
        .heights
        .iter()
        .all(|&h| (h - rest).abs() < SMOOTHING_EPSILON));
    assert_eq!(widget.mode(), WidgetMode::Live);
}

#[test]
fn test_unmount_disconnects_port() {
    let mut rig = Rig::live();
    let ports_before = rig.engine.graph().port_count();

    let mut widget = rig.engine.mount(bars());
    rig.tick();
    rig.render(&mut widget);
    assert_eq!(rig.engine.graph().port_count(), ports_before + 1);

    widget.unmount();
    rig.tick();
    assert_eq!(rig.engine.graph().port_count(), ports_before);
}

#[test]
fn test_same_station_after_cleared_playback_goes_live() {
    let mut rig = Rig::live();
    let mut widget = rig.engine.mount(bars());
    rig.tick();
    rig.render(&mut widget);
    assert_eq!(widget.mode(), WidgetMode::Live);

    rig.engine.sync_playback(None, false);
    rig.tick();
    rig.render(&mut widget);

    rig.engine.sync_playback(Some(rig.station), true);
    for seed in 0..50 {
        rig.engine.notify_interaction();
        rig.tick_with(&generate_noise(SAMPLES_PER_FRAME, 0.5, seed));
        rig.render(&mut widget);
    }

    assert_eq!(rig.engine.state(), GraphState::Running);
    assert_eq!(rig.engine.graph().tap_owner(), Some(rig.station));
    assert!(rig.engine.is_ready());
    assert_eq!(widget.mode(), WidgetMode::Live);
}

#[test]
fn test_release_sends_widgets_back_to_waiting() {
    let mut rig = Rig::live();
    let mut widget = rig.engine.mount(bars());
    rig.tick();
    rig.render(&mut widget);
    assert_eq!(widget.mode(), WidgetMode::Live);

    rig.engine.release();
    rig.tick();
    rig.render(&mut widget);
    assert_eq!(widget.mode(), WidgetMode::Waiting);

    // A new station brings the widget back.
    let next = PlaybackHandle::new(2);
    let mut feed = rig.platform.register_stream(next, FEED_CAPACITY);
    rig.engine.sync_playback(Some(next), true);
    feed.push_mono(&generate_silence(SAMPLES_PER_FRAME));
    rig.tick();
    rig.render(&mut widget);
    assert_eq!(widget.mode(), WidgetMode::Live);
}
