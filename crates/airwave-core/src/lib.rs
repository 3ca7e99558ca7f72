//! # Airwave Core
//!
//! The single-tap analysis graph behind the radio visualizers.
//!
//! A playing audio element can be tapped exactly once, yet several widgets
//! (spectrum bars, oscilloscope, level meters, beat effects) want its signal
//! at the same time. This crate owns that one tap and hands out cheap,
//! independently configured views onto it:
//!
//! - **[`AnalysisGraph`]**: owns the tap, the activation state machine and the
//!   platform seam
//! - **[`AnalyserPort`]**: a per-consumer frequency or time-domain view
//! - **[`AudioPlatform`] / [`TapSource`]**: what the host platform provides
//! - **[`software`]**: an in-process platform fed from a decoder thread
//!
//! Everything runs on the rendering tick. Nothing blocks: activation waits are
//! state transitions observed on later ticks.
//!
//! ## Example
//!
//! ```rust
//! use airwave_core::software::SoftwarePlatform;
//! use airwave_core::{AnalysisGraph, PlaybackHandle, PortConfig};
//!
//! let platform = SoftwarePlatform::new(44100.0);
//! let handle = PlaybackHandle::new(1);
//! let mut feed = platform.register_stream(handle, 8192);
//!
//! let mut graph = AnalysisGraph::new(platform);
//! graph.notify_interaction();
//! let _tap = graph.attach(handle).expect("tap");
//! graph.tick();
//!
//! let mut port = graph.create_port(PortConfig::frequency(128)).expect("port");
//! feed.push_mono(&[0.25; 512]);
//! graph.tick();
//! assert_eq!(port.read().len(), 128);
//! ```

pub mod error;
pub use error::{AttachError, Error, Result, TapError};

mod activation;
pub use activation::{GraphEvent, GraphState};

mod config;
pub use config::{Domain, PortConfig, Resolution};

mod graph;
pub use graph::{AnalysisGraph, StatusListener};

mod platform;
pub use platform::{AudioPlatform, ContextState, PlaybackHandle, TapSource};

mod port;
pub use port::{AnalyserPort, PortId, SampleBuffer};

mod spectrum;

mod tap;
pub use tap::{Tap, TapId, WINDOW_CAPACITY};

#[cfg(feature = "software")]
pub mod software;
