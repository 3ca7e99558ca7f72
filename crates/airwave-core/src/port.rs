//! Analyser ports: independent views onto the shared tap.

use crate::spectrum::SpectrumAnalyser;
use crate::tap::SignalWindow;
use crate::{Domain, PortConfig};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Identifier of a created port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub(crate) u64);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port#{}", self.0)
    }
}

/// Byte-scaled samples, either magnitudes per frequency bin or amplitudes
/// centred on [`SampleBuffer::TIME_ZERO`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    domain: Domain,
    data: Vec<u8>,
}

impl SampleBuffer {
    /// Largest representable value.
    pub const MAX_VALUE: u8 = u8::MAX;

    /// Time-domain value of a zero amplitude sample.
    pub const TIME_ZERO: u8 = 128;

    pub fn frequency(data: Vec<u8>) -> Self {
        Self {
            domain: Domain::Frequency,
            data,
        }
    }

    pub fn time(data: Vec<u8>) -> Self {
        Self {
            domain: Domain::Time,
            data,
        }
    }

    /// A silent buffer of `len` values.
    pub fn silent(domain: Domain, len: usize) -> Self {
        let value = Self::silence_value(domain);
        Self {
            domain,
            data: vec![value; len],
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mean value normalized to `0.0..=1.0`.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.data.iter().map(|&v| u32::from(v)).sum();
        sum as f32 / (self.data.len() as f32 * f32::from(Self::MAX_VALUE))
    }

    fn silence_value(domain: Domain) -> u8 {
        match domain {
            Domain::Time => Self::TIME_ZERO,
            Domain::Frequency => 0,
        }
    }

    fn fill_silence(&mut self) {
        let value = Self::silence_value(self.domain);
        self.data.fill(value);
    }
}

/// Connection flag shared between a port and the graph's weak registry.
pub(crate) struct PortLink {
    id: PortId,
    connected: Cell<bool>,
}

impl PortLink {
    pub(crate) fn new(id: PortId) -> Self {
        Self {
            id,
            connected: Cell::new(true),
        }
    }

    pub(crate) fn id(&self) -> PortId {
        self.id
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub(crate) fn disconnect(&self) {
        self.connected.set(false);
    }
}

/// A read-only, independently configured view onto the tap's signal.
///
/// Owned by whichever consumer created it. Dropping the port (or calling
/// [`disconnect`](AnalyserPort::disconnect)) tears it down; the graph only
/// keeps a weak link for bulk teardown.
pub struct AnalyserPort {
    id: PortId,
    config: PortConfig,
    signal: Rc<RefCell<SignalWindow>>,
    link: Rc<PortLink>,
    spectrum: Option<SpectrumAnalyser>,
    window: Vec<f32>,
    buffer: SampleBuffer,
    last_generation: Option<u64>,
}

impl AnalyserPort {
    pub(crate) fn new(
        id: PortId,
        config: PortConfig,
        signal: Rc<RefCell<SignalWindow>>,
        link: Rc<PortLink>,
    ) -> Self {
        let domain = config.domain();
        let spectrum = match domain {
            Domain::Frequency => Some(SpectrumAnalyser::new(
                config.resolution.window_len(),
                config.smoothing,
                config.min_db,
                config.max_db,
            )),
            Domain::Time => None,
        };

        Self {
            id,
            config,
            signal,
            link,
            spectrum,
            window: vec![0.0; config.resolution.window_len()],
            buffer: SampleBuffer::silent(domain, config.resolution.len()),
            last_generation: None,
        }
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn domain(&self) -> Domain {
        self.config.domain()
    }

    /// Number of values returned by [`read`](AnalyserPort::read).
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// False once the port or its tap has been torn down.
    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Latest buffer for this port's domain.
    ///
    /// Never waits for new data. The transform runs at most once per graph
    /// tick; repeated reads within a tick return the cached buffer. A
    /// disconnected port reads as silence.
    pub fn read(&mut self) -> &SampleBuffer {
        if !self.link.is_connected() {
            if self.last_generation.is_some() {
                self.buffer.fill_silence();
                self.last_generation = None;
            }
            return &self.buffer;
        }

        let signal = self.signal.borrow();
        let generation = signal.generation();
        if self.last_generation == Some(generation) {
            return &self.buffer;
        }

        signal.copy_latest(&mut self.window);
        drop(signal);

        match self.spectrum.as_mut() {
            Some(spectrum) => spectrum.process(&self.window, &mut self.buffer.data),
            None => encode_time(&self.window, &mut self.buffer.data),
        }
        self.last_generation = Some(generation);

        &self.buffer
    }

    /// Tear the port down.
    pub fn disconnect(self) {
        drop(self);
    }
}

impl Drop for AnalyserPort {
    fn drop(&mut self) {
        if self.link.is_connected() {
            self.link.disconnect();
            debug!(port = %self.id, "analyser port disconnected");
        }
    }
}

impl fmt::Debug for AnalyserPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyserPort")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

fn encode_time(samples: &[f32], out: &mut [u8]) {
    for (byte, &sample) in out.iter_mut().zip(samples) {
        *byte = (128.0 * (1.0 + sample)).clamp(0.0, 255.0) as u8;
    }
}
