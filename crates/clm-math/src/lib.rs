//! Tick, price and liquidity math for concentrated-liquidity ranges.
//!
//! Pure functions only: no I/O, no side effects, total over their
//! documented domain (positive finite prices, percentages in (0, 100]).
//!
//! Conventions:
//! - Pool price is quoted as token0 per token1 (e.g. USDC per ETH).
//! - Tick and price move in opposite directions: the lower price bound
//!   of a range maps to the upper tick and vice versa.
//! - Conversions always truncate toward zero so repeated round-trips are
//!   idempotent once ticks stabilize.

pub mod allocation;
pub mod liquidity;
pub mod range;
pub mod tick_math;

pub use allocation::CapitalAllocation;
pub use liquidity::{
    amounts_from_liquidity, liquidity_amounts, liquidity_from_amounts, liquidity_from_token0,
    liquidity_from_token1,
};
pub use range::{price_range, range_from_tick, PriceRange};
pub use tick_math::{
    price_to_sqrt_price_x96, price_to_tick, sqrt_price_x96_to_tick, tick_to_price,
    tick_to_sqrt_price_x96, TICK_BASE,
};
