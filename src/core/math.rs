//! Range remapping and smoothing used to turn analyser bytes into strip strength.
//!
//! The smoothing factor is applied once per rendered frame and is not scaled by
//! the frame delta, so a 120 Hz display converges roughly twice as fast as a
//! 60 Hz one.

use super::constants::{BYTE_MAX, STRENGTH_SMOOTHING};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RangeError {
    #[error("degenerate input range [{from}, {to}]")]
    Degenerate { from: f32, to: f32 },
}

/// Affine transform from `[in_start, in_end]` onto `[out_start, out_end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMap {
    in_start: f32,
    in_end: f32,
    out_start: f32,
    out_end: f32,
}

/// Analyser byte (0..=255) onto the unit interval.
pub const BYTE_TO_UNIT: RangeMap = RangeMap {
    in_start: 0.0,
    in_end: BYTE_MAX,
    out_start: 0.0,
    out_end: 1.0,
};

impl RangeMap {
    pub fn new(in_start: f32, in_end: f32, out_start: f32, out_end: f32) -> Result<Self, RangeError> {
        let span = in_end - in_start;
        if span == 0.0 || !span.is_finite() {
            return Err(RangeError::Degenerate {
                from: in_start,
                to: in_end,
            });
        }
        Ok(Self {
            in_start,
            in_end,
            out_start,
            out_end,
        })
    }

    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        (value - self.in_start) * (self.out_end - self.out_start) / (self.in_end - self.in_start)
            + self.out_start
    }
}

/// `(value - x1) * (y2 - x2) / (y1 - x1) + x2`, rejecting an empty input range.
#[inline]
pub fn map_range(value: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<f32, RangeError> {
    RangeMap::new(x1, y1, x2, y2).map(|m| m.apply(value))
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// One smoothing step toward the unit-remapped `frequency`.
#[inline]
pub fn smooth_strength(frequency: u8, previous: f32, factor: f32) -> f32 {
    lerp(previous, BYTE_TO_UNIT.apply(frequency as f32), factor)
}

#[inline]
pub fn frequency_to_strength(frequency: u8, previous: f32) -> f32 {
    smooth_strength(frequency, previous, STRENGTH_SMOOTHING)
}
