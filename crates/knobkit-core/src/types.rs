//! Common types used throughout knobkit.

/// Maximum number of value cells a single parameter owns (RGBA).
pub const MAX_DIMENSIONS: usize = 4;

/// Parameter identifier (FNV-1a hash of the parameter name).
pub type ParameterId = u32;

/// Timeline time, measured in frames. Fractional times fall between frames.
pub type Time = f64;

/// Whole frame number.
pub type Frame = i64;

/// Frame containing `time`.
///
/// Rounds toward negative infinity so that times just before zero belong to
/// frame -1 rather than frame 0.
#[inline]
pub fn frame_at(time: Time) -> Frame {
    time.floor() as Frame
}
