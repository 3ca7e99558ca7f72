//! Tolerance constants for analysis and rendering tests.

/// Floating point rounding errors.
/// Use for values that are clamped or assigned exactly.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Values approached through exponential smoothing after many frames.
pub const SMOOTHING_EPSILON: f32 = 1e-3;

/// Beat intensity considered "full".
pub const BEAT_INTENSITY_EPSILON: f32 = 0.05;

/// Largest bar height produced by a silent port, relative to the floor.
pub const BAR_FLOOR_EPSILON: f32 = 1e-4;
