//! The single tap and its shared signal window.

use crate::{PlaybackHandle, TapSource};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Length of the rolling mono window shared by all ports.
pub const WINDOW_CAPACITY: usize = crate::config::MAX_FFT_SIZE;

/// Samples drained from the source per pull.
const PULL_CHUNK: usize = 1024;

/// Upper bound on samples drained in one tick, so a backlog cannot stall it.
const MAX_PULL_PER_TICK: usize = WINDOW_CAPACITY * 4;

/// Identifier of a created tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TapId(pub(crate) u64);

/// Rolling window of the most recent decoded samples.
pub(crate) struct SignalWindow {
    samples: Vec<f32>,
    write_pos: usize,
    sample_rate: f32,
    /// Bumped once per graph tick while running; ports cache on it.
    generation: u64,
    total_samples: u64,
}

impl SignalWindow {
    fn new(sample_rate: f32) -> Self {
        Self {
            samples: vec![0.0; WINDOW_CAPACITY],
            write_pos: 0,
            sample_rate,
            generation: 0,
            total_samples: 0,
        }
    }

    fn push(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.samples[self.write_pos] = if sample.is_finite() { sample } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % WINDOW_CAPACITY;
        }
        self.total_samples += samples.len() as u64;
    }

    /// Copy the last `out.len()` samples, oldest first.
    pub(crate) fn copy_latest(&self, out: &mut [f32]) {
        let len = out.len().min(WINDOW_CAPACITY);
        let start = (self.write_pos + WINDOW_CAPACITY - len) % WINDOW_CAPACITY;
        let first = (WINDOW_CAPACITY - start).min(len);
        out[..first].copy_from_slice(&self.samples[start..start + first]);
        out[first..len].copy_from_slice(&self.samples[..len - first]);
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Handle to the single tap of a playback element.
///
/// Cloning is cheap; every clone refers to the same tap. Two taps compare
/// equal only if they are the same tap.
#[derive(Clone)]
pub struct Tap {
    id: TapId,
    handle: PlaybackHandle,
    signal: Rc<RefCell<SignalWindow>>,
}

impl Tap {
    pub(crate) fn new(id: TapId, handle: PlaybackHandle, sample_rate: f32) -> Self {
        Self {
            id,
            handle,
            signal: Rc::new(RefCell::new(SignalWindow::new(sample_rate))),
        }
    }

    pub fn id(&self) -> TapId {
        self.id
    }

    /// The playback element this tap belongs to.
    pub fn handle(&self) -> PlaybackHandle {
        self.handle
    }

    pub fn sample_rate(&self) -> f32 {
        self.signal.borrow().sample_rate()
    }

    /// Total samples received since the tap was created.
    pub fn total_samples(&self) -> u64 {
        self.signal.borrow().total_samples
    }

    pub(crate) fn signal(&self) -> Rc<RefCell<SignalWindow>> {
        Rc::clone(&self.signal)
    }
}

impl PartialEq for Tap {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.signal, &other.signal)
    }
}

impl Eq for Tap {}

impl fmt::Debug for Tap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tap")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// A tap together with the platform source feeding it. Owned by the graph.
pub(crate) struct BoundTap {
    tap: Tap,
    source: Box<dyn TapSource>,
    scratch: Vec<f32>,
}

impl BoundTap {
    pub(crate) fn new(tap: Tap, source: Box<dyn TapSource>) -> Self {
        Self {
            tap,
            source,
            scratch: vec![0.0; PULL_CHUNK],
        }
    }

    pub(crate) fn tap(&self) -> &Tap {
        &self.tap
    }

    /// Drain pending samples into the window and start a new generation.
    pub(crate) fn pump(&mut self) -> usize {
        let mut signal = self.tap.signal.borrow_mut();
        let mut pulled = 0;

        while pulled < MAX_PULL_PER_TICK {
            let n = self.source.pull(&mut self.scratch);
            if n == 0 {
                break;
            }
            signal.push(&self.scratch[..n]);
            pulled += n;
        }

        signal.generation += 1;
        trace!(pulled, generation = signal.generation, "tap pumped");
        pulled
    }

    pub(crate) fn disconnect(mut self) -> Tap {
        self.source.disconnect();
        self.tap
    }
}
