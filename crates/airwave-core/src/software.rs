//! In-process audio platform.
//!
//! Decoded audio is pushed by the decoder (or an audio callback) into a
//! lock-free SPSC ring buffer per stream; the tap drains it on the tick
//! thread. Activation behaviour is configurable so hosts without a gesture
//! policy, and tests, can drive every graph state.
//!
//! ```rust
//! use airwave_core::software::SoftwarePlatform;
//! use airwave_core::{AudioPlatform, ContextState, PlaybackHandle};
//!
//! let mut platform = SoftwarePlatform::new(48000.0);
//! platform.set_resume_latency(1);
//! platform.request_resume();
//! assert_eq!(platform.context_state(), ContextState::Suspended);
//! assert_eq!(platform.context_state(), ContextState::Running);
//! ```

use crate::{AudioPlatform, ContextState, PlaybackHandle, TapError, TapSource};
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::debug;

enum Stream {
    Ready(HeapCons<(f32, f32)>),
    Tapped,
}

struct Context {
    sample_rate: f32,
    running: bool,
    accept_resume: bool,
    resume_latency: u32,
    pending_resume: Option<u32>,
    streams: HashMap<PlaybackHandle, Stream>,
    blocked: HashSet<PlaybackHandle>,
    routed: HashSet<PlaybackHandle>,
    taps_created: u32,
    resume_requests: u32,
}

/// Software audio context shared between the host and the graph.
///
/// Clones refer to the same context, so a host can keep one to drive
/// playback while the graph owns another.
#[derive(Clone)]
pub struct SoftwarePlatform {
    context: Rc<RefCell<Context>>,
}

impl SoftwarePlatform {
    /// A context that starts suspended, like browser contexts before a gesture.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            context: Rc::new(RefCell::new(Context {
                sample_rate,
                running: false,
                accept_resume: true,
                resume_latency: 0,
                pending_resume: None,
                streams: HashMap::new(),
                blocked: HashSet::new(),
                routed: HashSet::new(),
                taps_created: 0,
                resume_requests: 0,
            })),
        }
    }

    /// A context that is already processing.
    pub fn running(sample_rate: f32) -> Self {
        let platform = Self::new(sample_rate);
        platform.context.borrow_mut().running = true;
        platform
    }

    /// Register the stream produced by `handle`.
    ///
    /// Returns the producer half of a ring buffer holding `capacity` stereo
    /// frames. Re-registering a handle replaces its stream.
    pub fn register_stream(&self, handle: PlaybackHandle, capacity: usize) -> SampleFeed {
        let (producer, consumer) = HeapRb::<(f32, f32)>::new(capacity.max(1)).split();
        self.context
            .borrow_mut()
            .streams
            .insert(handle, Stream::Ready(consumer));
        SampleFeed { producer }
    }

    /// Refuse taps of `handle`, as a cross-origin stream would.
    pub fn block(&self, handle: PlaybackHandle) {
        self.context.borrow_mut().blocked.insert(handle);
    }

    /// Whether activation requests are honoured.
    pub fn set_accept_resume(&self, accept: bool) {
        self.context.borrow_mut().accept_resume = accept;
    }

    /// Number of state polls that still report suspended after an accepted
    /// activation request.
    pub fn set_resume_latency(&self, polls: u32) {
        self.context.borrow_mut().resume_latency = polls;
    }

    /// Suspend the context, as the platform does when the page is backgrounded.
    pub fn suspend(&self) {
        let mut context = self.context.borrow_mut();
        context.running = false;
        context.pending_resume = None;
    }

    /// Current context state without advancing pending activation.
    pub fn state(&self) -> ContextState {
        if self.context.borrow().running {
            ContextState::Running
        } else {
            ContextState::Suspended
        }
    }

    /// Whether the tap of `handle` is routed to the audible output.
    pub fn is_routed(&self, handle: PlaybackHandle) -> bool {
        self.context.borrow().routed.contains(&handle)
    }

    /// Taps created so far.
    pub fn taps_created(&self) -> u32 {
        self.context.borrow().taps_created
    }

    /// Activation requests received so far.
    pub fn resume_requests(&self) -> u32 {
        self.context.borrow().resume_requests
    }

    pub fn sample_rate(&self) -> f32 {
        self.context.borrow().sample_rate
    }
}

impl AudioPlatform for SoftwarePlatform {
    fn context_state(&mut self) -> ContextState {
        let mut context = self.context.borrow_mut();
        match context.pending_resume {
            Some(0) => {
                context.pending_resume = None;
                context.running = true;
            }
            Some(polls) => context.pending_resume = Some(polls - 1),
            None => {}
        }
        drop(context);
        self.state()
    }

    fn request_resume(&mut self) {
        let mut context = self.context.borrow_mut();
        context.resume_requests += 1;
        if context.running || !context.accept_resume || context.pending_resume.is_some() {
            return;
        }
        if context.resume_latency == 0 {
            context.running = true;
        } else {
            context.pending_resume = Some(context.resume_latency);
        }
    }

    fn create_tap(&mut self, handle: PlaybackHandle) -> Result<Box<dyn TapSource>, TapError> {
        let mut context = self.context.borrow_mut();
        if context.blocked.contains(&handle) {
            return Err(TapError::SecurityViolation(format!(
                "{handle} serves cross-origin media without CORS approval"
            )));
        }

        let consumer = match context.streams.insert(handle, Stream::Tapped) {
            Some(Stream::Ready(consumer)) => consumer,
            Some(Stream::Tapped) => {
                return Err(TapError::AlreadyTapped(handle));
            }
            None => {
                context.streams.remove(&handle);
                return Err(TapError::Unavailable(format!("{handle} has no stream")));
            }
        };

        context.taps_created += 1;
        debug!(%handle, "software tap created");
        Ok(Box::new(SoftwareTap {
            handle,
            sample_rate: context.sample_rate,
            consumer,
            frames: Vec::new(),
            context: Rc::clone(&self.context),
        }))
    }
}

/// Producer half of a stream, usable from the decoder thread.
pub struct SampleFeed {
    producer: HeapProd<(f32, f32)>,
}

impl SampleFeed {
    /// Push stereo frames; returns how many fit.
    pub fn push_frames(&mut self, frames: &[(f32, f32)]) -> usize {
        self.producer.push_slice(frames)
    }

    /// Push mono samples to both channels; returns how many fit.
    pub fn push_mono(&mut self, samples: &[f32]) -> usize {
        samples
            .iter()
            .take_while(|&&s| self.producer.try_push((s, s)).is_ok())
            .count()
    }

    /// Push interleaved `L R L R ...` samples; returns frames written.
    pub fn push_interleaved(&mut self, samples: &[f32]) -> usize {
        samples
            .chunks_exact(2)
            .take_while(|frame| self.producer.try_push((frame[0], frame[1])).is_ok())
            .count()
    }

    /// Frames that can be pushed without dropping.
    pub fn vacant_len(&self) -> usize {
        self.producer.vacant_len()
    }
}

struct SoftwareTap {
    handle: PlaybackHandle,
    sample_rate: f32,
    consumer: HeapCons<(f32, f32)>,
    frames: Vec<(f32, f32)>,
    context: Rc<RefCell<Context>>,
}

impl TapSource for SoftwareTap {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn pull(&mut self, out: &mut [f32]) -> usize {
        self.frames.resize(out.len(), (0.0, 0.0));
        let n = self.consumer.pop_slice(&mut self.frames);
        for (sample, &(left, right)) in out.iter_mut().zip(&self.frames[..n]) {
            let mono = (left + right) * 0.5;
            *sample = if mono.is_finite() { mono } else { 0.0 };
        }
        n
    }

    fn connect_to_output(&mut self) -> Result<(), TapError> {
        self.context.borrow_mut().routed.insert(self.handle);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.context.borrow_mut().routed.remove(&self.handle);
        debug!(handle = %self.handle, "software tap disconnected");
    }
}
