//! Integration test modules for airwave
//!
//! - activation: gesture gating, tap ownership, policy blocks, suspension
//! - engine: playback events, extra ports, teardown
//! - beat: beat detection and tempo through live ports
//! - widgets: mount, acquire, fallback and unmount

pub mod activation;
pub mod beat;
pub mod engine;
pub mod widgets;
