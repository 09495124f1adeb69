//! Raw token amounts in smallest on-chain units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Token amount in the token's smallest unit (wei-equivalent).
///
/// Amounts are never negative; subtraction saturates at zero because a
/// shortfall is always handled explicitly by the caller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(pub u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> u128 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert a human-readable amount into smallest units, truncating.
    ///
    /// Negative or non-finite inputs map to zero.
    #[must_use]
    pub fn from_units(amount: f64, decimals: u32) -> Self {
        if !amount.is_finite() || amount <= 0.0 {
            return Self::ZERO;
        }
        Self((amount * 10f64.powi(decimals as i32)) as u128)
    }

    /// Convert back into a human-readable amount.
    #[must_use]
    pub fn to_units(&self, decimals: u32) -> f64 {
        self.0 as f64 / 10f64.powi(decimals as i32)
    }

    /// Saturating subtraction.
    #[must_use]
    pub fn saturating_sub(&self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl Add for TokenAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units_truncates() {
        // 1.5 USDC at 6 decimals
        assert_eq!(TokenAmount::from_units(1.5, 6), TokenAmount(1_500_000));
        // Sub-unit dust is truncated, never rounded up
        assert_eq!(TokenAmount::from_units(0.000_000_19, 6), TokenAmount(0));
    }

    #[test]
    fn test_from_units_rejects_negative() {
        assert_eq!(TokenAmount::from_units(-3.0, 18), TokenAmount::ZERO);
        assert_eq!(TokenAmount::from_units(f64::NAN, 18), TokenAmount::ZERO);
    }

    #[test]
    fn test_round_trip() {
        let amount = TokenAmount::from_units(1234.567891, 6);
        assert!((amount.to_units(6) - 1234.567891).abs() < 1e-6);
    }

    #[test]
    fn test_saturating_sub() {
        let a = TokenAmount(100);
        let b = TokenAmount(250);
        assert_eq!(a.saturating_sub(b), TokenAmount::ZERO);
        assert_eq!(b.saturating_sub(a), TokenAmount(150));
    }
}
