//! Capital allocation: range plus the token amounts that fund it.

use serde::{Deserialize, Serialize};

use crate::liquidity::{amounts_from_liquidity, liquidity_amounts, liquidity_from_amounts};
use crate::range::{price_range, PriceRange};

/// The result of sizing a target capital into a percentage range.
///
/// Recomputed on every open/rebalance; the stored liquidity value lets the
/// orchestrator refresh `amount0`/`amount1` after a tick move without
/// re-deriving the whole allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalAllocation {
    /// Range width in percent.
    pub range_percentage: f64,
    /// Target capital, denominated in token0 units.
    pub target_amount: f64,
    /// The computed price band and tick bounds.
    pub range: PriceRange,
    /// Liquidity implied by the computed amounts.
    pub liquidity: f64,
    /// Required token0 amount, human units.
    pub amount0: f64,
    /// Required token1 amount, human units.
    pub amount1: f64,
}

impl CapitalAllocation {
    /// Size `target_amount` of token0-denominated capital into a
    /// `range_percentage` band around `current_price`.
    #[must_use]
    pub fn compute(
        range_percentage: f64,
        current_price: f64,
        target_amount: f64,
        decimal_diff: i32,
    ) -> Self {
        let range = price_range(range_percentage, current_price, decimal_diff);
        let (amount0, amount1) = liquidity_amounts(
            range.lower_price,
            range.upper_price,
            current_price,
            target_amount,
        );
        let liquidity = liquidity_from_amounts(
            current_price,
            range.lower_price,
            range.upper_price,
            amount0,
            amount1,
        );

        Self {
            range_percentage,
            target_amount,
            range,
            liquidity,
            amount0,
            amount1,
        }
    }

    /// Re-evaluate the token amounts at a new price, holding liquidity fixed.
    #[must_use]
    pub fn amounts_at(&self, price: f64) -> (f64, f64) {
        amounts_from_liquidity(
            price,
            self.range.lower_price,
            self.range.upper_price,
            self.liquidity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECIMAL_DIFF: i32 = 6 - 18;

    #[test]
    fn test_compute_basic() {
        let alloc = CapitalAllocation::compute(10.0, 1000.0, 1000.0, DECIMAL_DIFF);
        assert!(alloc.amount0 > 0.0 && alloc.amount1 > 0.0);
        assert!(alloc.liquidity > 0.0);
        assert!(alloc.range.contains_tick(alloc.range.current_tick));
    }

    #[test]
    fn test_amounts_at_current_price_matches() {
        let alloc = CapitalAllocation::compute(10.0, 1000.0, 1000.0, DECIMAL_DIFF);
        let (amount0, amount1) = alloc.amounts_at(1000.0);
        assert!((amount0 - alloc.amount0).abs() < 1e-6);
        assert!((amount1 - alloc.amount1).abs() < 1e-9);
    }

    #[test]
    fn test_amounts_at_out_of_range_price() {
        let alloc = CapitalAllocation::compute(10.0, 1000.0, 1000.0, DECIMAL_DIFF);
        let (amount0, amount1) = alloc.amounts_at(2000.0);
        assert!(amount0 > 0.0);
        assert_eq!(amount1, 0.0);
    }
}
