//! # Console Visualizer
//!
//! Feed a synthetic radio stream from a decoder thread and draw the bar
//! spectrum and beats in the terminal.
//!
//! **Concepts:** Engine setup, gesture gating, widgets, beat and tempo
//!
//! ```bash
//! RUST_LOG=debug cargo run --example console_visualizer
//! ```

use airwave::prelude::*;
use airwave::software::SoftwarePlatform;
use std::f32::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

const SAMPLE_RATE: f32 = 44100.0;
const FRAME: Duration = Duration::from_millis(16);
const BPM: f32 = 124.0;

/// Kick drum on every beat over a sustained chord.
fn synth_block(start: usize, len: usize) -> Vec<f32> {
    let beat_len = (SAMPLE_RATE * 60.0 / BPM) as usize;
    (start..start + len)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE;
            let since_beat = (n % beat_len) as f32 / SAMPLE_RATE;
            let kick = (TAU * 55.0 * since_beat).sin() * (-since_beat * 18.0).exp();
            let chord = [220.0, 277.2, 329.6]
                .iter()
                .map(|f| (TAU * f * t).sin())
                .sum::<f32>()
                * 0.05;
            (kick * 0.9 + chord).clamp(-1.0, 1.0)
        })
        .collect()
}

fn draw(bars: &[f32], max: f32, beat: bool, bpm: Option<f32>) {
    const LEVELS: &[char] = &[' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let line: String = bars
        .iter()
        .map(|&h| {
            let index = ((h / max) * (LEVELS.len() - 1) as f32).round() as usize;
            LEVELS[index.min(LEVELS.len() - 1)]
        })
        .collect();
    let marker = if beat { "●" } else { " " };
    let tempo = bpm.map_or_else(|| "  --.-".to_string(), |bpm| format!("{bpm:6.1}"));
    print!("\r{line} {marker} {tempo} BPM");
}

fn main() -> airwave::Result<()> {
    tracing_subscriber::fmt::init();

    let platform = SoftwarePlatform::new(SAMPLE_RATE);
    let station = PlaybackHandle::new(1);
    let mut feed = platform.register_stream(station, 1 << 16);

    let mut engine = AirwaveEngine::builder()
        .platform(platform)
        .on_state_change(|from, to| tracing::info!(%from, %to, "graph state"))
        .build()?;
    let mut bars = engine.mount(BarSpectrum::new(BarSpectrumConfig::default().with_bars(48))?);

    // Decoder thread: push audio at roughly real-time pace.
    let decoder = thread::spawn(move || {
        let block = (SAMPLE_RATE * FRAME.as_secs_f32()) as usize;
        let mut position = 0;
        let started = Instant::now();
        while started.elapsed() < Duration::from_secs(8) {
            let samples = synth_block(position, block);
            let mut written = 0;
            while written < samples.len() {
                written += feed.push_mono(&samples[written..]);
                if written < samples.len() {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            position += block;
            thread::sleep(FRAME);
        }
    });

    // Playback starts before the listener has clicked anything.
    engine.sync_playback(Some(station), true);

    let started = Instant::now();
    let mut frame_count = 0u32;
    while !decoder.is_finished() {
        if frame_count == 60 {
            println!("\n(click)");
            engine.notify_interaction();
        }

        engine.tick(started.elapsed());
        if let Some(frame) = engine.render(&mut bars).as_bars() {
            draw(
                &frame.heights,
                frame.max,
                engine.beat().is_some(),
                engine.tempo_bpm(),
            );
        }

        frame_count += 1;
        thread::sleep(FRAME);
    }

    engine.sync_playback(Some(station), false);
    println!("\nwidget {} ended in {:?} mode", bars.id(), bars.mode());
    bars.unmount();
    engine.release();
    Ok(())
}
