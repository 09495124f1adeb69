//! Symmetric percentage ranges around a price.

use clm_core::Tick;
use serde::{Deserialize, Serialize};

use crate::tick_math::{price_to_tick, TICK_BASE};

/// A computed price band with its tick bounds.
///
/// Note the inverted correspondence: `lower_tick` is derived from
/// `upper_price` and `upper_tick` from `lower_price`, because tick and
/// price move in opposite directions under the pool's quoting convention.
/// `lower_tick < upper_tick` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub lower_price: f64,
    pub current_price: f64,
    pub upper_price: f64,
    pub lower_tick: Tick,
    pub current_tick: Tick,
    pub upper_tick: Tick,
}

impl PriceRange {
    /// Check whether a tick lies inside the band (inclusive).
    #[must_use]
    pub fn contains_tick(&self, tick: Tick) -> bool {
        tick.is_within(self.lower_tick, self.upper_tick)
    }

    /// Widen the tick bounds outward to the venue's tick spacing.
    ///
    /// Rounding outward guarantees the aligned range still contains every
    /// price the unaligned range did.
    #[must_use]
    pub fn aligned_to_spacing(&self, spacing: i32) -> Self {
        Self {
            lower_tick: self.lower_tick.align_floor(spacing),
            upper_tick: self.upper_tick.align_ceil(spacing),
            ..*self
        }
    }
}

/// Compute a symmetric-in-price band around `current_price`.
///
/// The band is `[current_price / (1 + p), current_price * (1 + p)]` with
/// `p = percentage / 100`, converted to ticks at each bound.
#[must_use]
pub fn price_range(percentage: f64, current_price: f64, decimal_diff: i32) -> PriceRange {
    let factor = 1.0 + percentage / 100.0;
    let upper_price = current_price * factor;
    let lower_price = current_price / factor;

    // Price bounds map to the opposite tick bounds.
    let upper_tick = price_to_tick(lower_price, decimal_diff);
    let lower_tick = price_to_tick(upper_price, decimal_diff);
    let current_tick = price_to_tick(current_price, decimal_diff);

    PriceRange {
        lower_price,
        current_price,
        upper_price,
        lower_tick,
        current_tick,
        upper_tick,
    }
}

/// Equivalent range expressed directly in tick space.
///
/// Used when the caller already holds an authoritative on-chain tick and
/// wants to avoid a lossy price round-trip. The half-width is
/// `floor(log_base(1 + percentage / 200))`.
#[must_use]
pub fn range_from_tick(current_tick: Tick, percentage: f64) -> (Tick, Tick) {
    let half = percentage / 100.0 / 2.0;
    let delta_tick = ((1.0 + half).ln() / TICK_BASE.ln()).trunc() as i32;
    (current_tick - delta_tick, current_tick + delta_tick)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECIMAL_DIFF: i32 = 6 - 18;

    #[test]
    fn test_simple_open_scenario() {
        let range = price_range(10.0, 1000.0, DECIMAL_DIFF);
        assert!((range.lower_price - 909.0909).abs() < 0.001);
        assert!((range.upper_price - 1100.0).abs() < 1e-9);
        assert_eq!(range.current_price, 1000.0);
        // Ticks must bracket the current tick.
        assert!(range.lower_tick < range.current_tick);
        assert!(range.current_tick < range.upper_tick);
        assert!(range.contains_tick(range.current_tick));
    }

    #[test]
    fn test_range_brackets_price() {
        for pct in [0.5, 1.0, 5.0, 25.0] {
            for price in [0.07, 1.0, 1842.5, 60_000.0] {
                let range = price_range(pct, price, DECIMAL_DIFF);
                assert!(range.lower_price < price, "pct={pct} price={price}");
                assert!(price < range.upper_price, "pct={pct} price={price}");
                assert!(range.lower_tick < range.upper_tick);
            }
        }
    }

    #[test]
    fn test_wider_percentage_strictly_widens() {
        let narrow = price_range(5.0, 1000.0, DECIMAL_DIFF);
        let wide = price_range(10.0, 1000.0, DECIMAL_DIFF);
        assert!(wide.lower_price < narrow.lower_price);
        assert!(wide.upper_price > narrow.upper_price);
        assert!(wide.lower_tick <= narrow.lower_tick);
        assert!(wide.upper_tick >= narrow.upper_tick);
    }

    #[test]
    fn test_range_from_tick() {
        // log_1.0001(1.05) = 487.9...
        let (lower, upper) = range_from_tick(Tick::new(200_000), 10.0);
        assert_eq!(lower, Tick::new(199_513));
        assert_eq!(upper, Tick::new(200_487));
    }

    #[test]
    fn test_range_from_tick_symmetric() {
        let current = Tick::new(1234);
        let (lower, upper) = range_from_tick(current, 4.0);
        assert_eq!(current.inner() - lower.inner(), upper.inner() - current.inner());
        assert!(lower < current && current < upper);
    }

    #[test]
    fn test_aligned_to_spacing_widens() {
        let range = price_range(10.0, 1000.0, DECIMAL_DIFF);
        let aligned = range.aligned_to_spacing(60);
        assert!(aligned.lower_tick <= range.lower_tick);
        assert!(aligned.upper_tick >= range.upper_tick);
        assert_eq!(aligned.lower_tick.inner() % 60, 0);
        assert_eq!(aligned.upper_tick.inner() % 60, 0);
        assert!(aligned.contains_tick(range.current_tick));
    }
}
