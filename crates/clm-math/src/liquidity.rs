//! Piecewise constant-liquidity formulas.
//!
//! All functions work in human price space (token0 per token1) on the three
//! square-root price points `sqrt(lower)`, `sqrt(current)`, `sqrt(upper)`.
//!
//! Three regions:
//! - price below the range: the position is entirely token1
//! - price above the range: entirely token0
//! - price inside the range: split by the constant-liquidity curve

/// Liquidity implied by a token0 amount over `[sqrt_a, sqrt_b]`.
#[must_use]
pub fn liquidity_from_token0(sqrt_a: f64, sqrt_b: f64, amount0: f64) -> f64 {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    if sqrt_b <= sqrt_a {
        return 0.0;
    }
    amount0 / (sqrt_b - sqrt_a)
}

/// Liquidity implied by a token1 amount over `[sqrt_a, sqrt_b]`.
#[must_use]
pub fn liquidity_from_token1(sqrt_a: f64, sqrt_b: f64, amount1: f64) -> f64 {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    let width = 1.0 / sqrt_a - 1.0 / sqrt_b;
    if width <= 0.0 {
        return 0.0;
    }
    amount1 / width
}

fn amount0_for_liquidity(sqrt_a: f64, sqrt_b: f64, liquidity: f64) -> f64 {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    liquidity * (sqrt_b - sqrt_a)
}

fn amount1_for_liquidity(sqrt_a: f64, sqrt_b: f64, liquidity: f64) -> f64 {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    liquidity * (1.0 / sqrt_a - 1.0 / sqrt_b)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Token amounts required to deploy `target_amount` (denominated in token0)
/// into `[range_low, range_high]` at `current_price`.
///
/// Returns `(amount0, amount1)` in human units. Never negative.
#[must_use]
pub fn liquidity_amounts(
    range_low: f64,
    range_high: f64,
    current_price: f64,
    target_amount: f64,
) -> (f64, f64) {
    let s_min = range_low.sqrt();
    let s_max = range_high.sqrt();
    let s = current_price.sqrt();

    let (amount0, amount1) = if s <= s_min {
        // Below the range: only token1 is deposited.
        let delta_l = target_amount / ((1.0 / s_min - 1.0 / s_max) * current_price);
        (0.0, delta_l * (1.0 / s_min - 1.0 / s_max))
    } else if s < s_max {
        // Inside the range: split by the constant-liquidity curve.
        let delta_l =
            target_amount / ((s - s_min) + (1.0 / s - 1.0 / s_max) * current_price);
        (delta_l * (s - s_min), delta_l * (1.0 / s - 1.0 / s_max))
    } else {
        // Above the range: only token0 is deposited.
        let delta_l = target_amount / (s_max - s_min);
        (delta_l * (s_max - s_min), 0.0)
    };

    (amount0.max(0.0), amount1.max(0.0))
}

/// Liquidity value implied by a pair of token amounts at `current_price`.
///
/// Inside the range the binding side (the smaller implied liquidity) wins,
/// matching how the venue computes the minted liquidity.
#[must_use]
pub fn liquidity_from_amounts(
    current_price: f64,
    range_low: f64,
    range_high: f64,
    amount0: f64,
    amount1: f64,
) -> f64 {
    let s_min = range_low.sqrt();
    let s_max = range_high.sqrt();
    let s = current_price.sqrt();

    if s <= s_min {
        liquidity_from_token1(s_min, s_max, amount1)
    } else if s < s_max {
        let l0 = liquidity_from_token0(s_min, s, amount0);
        let l1 = liquidity_from_token1(s, s_max, amount1);
        l0.min(l1)
    } else {
        liquidity_from_token0(s_min, s_max, amount0)
    }
}

/// Token amounts held by a position of `liquidity` at `current_price`.
///
/// Inverse of [`liquidity_from_amounts`]; used to refresh amounts after a
/// price move without re-deriving the capital allocation.
#[must_use]
pub fn amounts_from_liquidity(
    current_price: f64,
    range_low: f64,
    range_high: f64,
    liquidity: f64,
) -> (f64, f64) {
    let s_min = range_low.sqrt();
    let s_max = range_high.sqrt();
    let s = current_price.sqrt();

    let (amount0, amount1) = if s <= s_min {
        (0.0, amount1_for_liquidity(s_min, s_max, liquidity))
    } else if s < s_max {
        (
            amount0_for_liquidity(s_min, s, liquidity),
            amount1_for_liquidity(s, s_max, liquidity),
        )
    } else {
        (amount0_for_liquidity(s_min, s_max, liquidity), 0.0)
    };

    (amount0.max(0.0), amount1.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: f64 = 909.0909090909091;
    const HIGH: f64 = 1100.0;

    #[test]
    fn test_in_range_split_preserves_target_value() {
        let (amount0, amount1) = liquidity_amounts(LOW, HIGH, 1000.0, 1000.0);
        assert!(amount0 > 0.0 && amount1 > 0.0);
        // amount0 + amount1 valued at the current price equals the target.
        let total_value = amount0 + amount1 * 1000.0;
        assert!((total_value - 1000.0).abs() < 1e-6, "total {total_value}");
        // A symmetric-in-price range splits capital roughly in half.
        assert!((amount0 - 500.0).abs() < 5.0, "amount0 {amount0}");
    }

    #[test]
    fn test_below_range_all_token1() {
        let (amount0, amount1) = liquidity_amounts(LOW, HIGH, 800.0, 1000.0);
        assert_eq!(amount0, 0.0);
        assert!(amount1 > 0.0);
        // The token1 position is worth the full target at the current price.
        assert!((amount1 * 800.0 - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_above_range_all_token0() {
        let (amount0, amount1) = liquidity_amounts(LOW, HIGH, 1300.0, 1000.0);
        assert!(amount0 > 0.0);
        assert_eq!(amount1, 0.0);
        assert!((amount0 - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_amounts_never_negative() {
        for price in [0.01, LOW, 1000.0, HIGH, 1e6] {
            for target in [0.0, 1.0, 1000.0, 1e9] {
                let (amount0, amount1) = liquidity_amounts(LOW, HIGH, price, target);
                assert!(amount0 >= 0.0, "price={price} target={target}");
                assert!(amount1 >= 0.0, "price={price} target={target}");
            }
        }
    }

    #[test]
    fn test_piecewise_continuity_at_lower_bound() {
        let eps = LOW * 1e-9;
        let inside = liquidity_amounts(LOW, HIGH, LOW + eps, 1000.0);
        let outside = liquidity_amounts(LOW, HIGH, LOW - eps, 1000.0);
        assert!((inside.0 - outside.0).abs() < 1e-3);
        assert!((inside.1 - outside.1).abs() < 1e-6);
    }

    #[test]
    fn test_piecewise_continuity_at_upper_bound() {
        let eps = HIGH * 1e-9;
        let inside = liquidity_amounts(LOW, HIGH, HIGH - eps, 1000.0);
        let outside = liquidity_amounts(LOW, HIGH, HIGH + eps, 1000.0);
        assert!((inside.0 - outside.0).abs() < 1e-3);
        assert!((inside.1 - outside.1).abs() < 1e-6);
    }

    #[test]
    fn test_liquidity_amount_inverse_mapping() {
        let (amount0, amount1) = liquidity_amounts(LOW, HIGH, 1000.0, 1000.0);
        let liquidity = liquidity_from_amounts(1000.0, LOW, HIGH, amount0, amount1);
        let (back0, back1) = amounts_from_liquidity(1000.0, LOW, HIGH, liquidity);
        assert!((back0 - amount0).abs() < 1e-6);
        assert!((back1 - amount1).abs() < 1e-9);
    }

    #[test]
    fn test_amounts_shift_as_price_moves() {
        let (amount0, amount1) = liquidity_amounts(LOW, HIGH, 1000.0, 1000.0);
        let liquidity = liquidity_from_amounts(1000.0, LOW, HIGH, amount0, amount1);
        // Price rising toward the upper bound converts token1 into token0.
        let (hi0, hi1) = amounts_from_liquidity(1090.0, LOW, HIGH, liquidity);
        assert!(hi0 > amount0);
        assert!(hi1 < amount1);
        // Price falling toward the lower bound does the opposite.
        let (lo0, lo1) = amounts_from_liquidity(920.0, LOW, HIGH, liquidity);
        assert!(lo0 < amount0);
        assert!(lo1 > amount1);
    }

    #[test]
    fn test_in_range_binding_side_is_minimum() {
        let (amount0, amount1) = liquidity_amounts(LOW, HIGH, 1000.0, 1000.0);
        // Doubling one side must not raise the implied liquidity.
        let base = liquidity_from_amounts(1000.0, LOW, HIGH, amount0, amount1);
        let extra1 = liquidity_from_amounts(1000.0, LOW, HIGH, amount0, amount1 * 2.0);
        assert!((extra1 - base).abs() / base < 1e-9);
    }
}
