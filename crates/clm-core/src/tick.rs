//! Discrete tick index type.
//!
//! A tick is an integer index into the AMM's logarithmic price grid:
//! `price(i) = 1.0001^i`, adjusted for the two tokens' decimal places.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Tick index with type safety against mixing with plain integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(pub i32);

impl Tick {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> i32 {
        self.0
    }

    /// Check whether this tick lies inside `[lower, upper]` (inclusive).
    #[inline]
    #[must_use]
    pub fn is_within(&self, lower: Tick, upper: Tick) -> bool {
        self.0 >= lower.0 && self.0 <= upper.0
    }

    /// Align down to the nearest multiple of `spacing`.
    ///
    /// Works for negative ticks too (floored division).
    #[must_use]
    pub fn align_floor(&self, spacing: i32) -> Self {
        if spacing <= 1 {
            return *self;
        }
        Self(self.0.div_euclid(spacing) * spacing)
    }

    /// Align up to the nearest multiple of `spacing`.
    #[must_use]
    pub fn align_ceil(&self, spacing: i32) -> Self {
        if spacing <= 1 {
            return *self;
        }
        let floored = self.0.div_euclid(spacing) * spacing;
        if floored == self.0 {
            *self
        } else {
            Self(floored + spacing)
        }
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Tick {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Add<i32> for Tick {
    type Output = Self;

    fn add(self, rhs: i32) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl Sub<i32> for Tick {
    type Output = Self;

    fn sub(self, rhs: i32) -> Self::Output {
        Self(self.0 - rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_within() {
        assert!(Tick(150).is_within(Tick(100), Tick(200)));
        assert!(Tick(100).is_within(Tick(100), Tick(200)));
        assert!(Tick(200).is_within(Tick(100), Tick(200)));
        assert!(!Tick(250).is_within(Tick(100), Tick(200)));
        assert!(!Tick(50).is_within(Tick(100), Tick(200)));
    }

    #[test]
    fn test_align_floor() {
        assert_eq!(Tick(205).align_floor(10), Tick(200));
        assert_eq!(Tick(200).align_floor(10), Tick(200));
        assert_eq!(Tick(-205).align_floor(10), Tick(-210));
        assert_eq!(Tick(7).align_floor(1), Tick(7));
    }

    #[test]
    fn test_align_ceil() {
        assert_eq!(Tick(205).align_ceil(10), Tick(210));
        assert_eq!(Tick(200).align_ceil(10), Tick(200));
        assert_eq!(Tick(-205).align_ceil(10), Tick(-200));
    }

    #[test]
    fn test_alignment_widens_outward() {
        // A range aligned with floor(lower)/ceil(upper) must contain the original.
        let lower = Tick(103);
        let upper = Tick(257);
        assert!(lower.align_floor(60) <= lower);
        assert!(upper.align_ceil(60) >= upper);
    }
}
