//! A single position snapshot.

use chrono::{DateTime, Utc};
use clm_core::{Tick, TokenAmount};
use serde::{Deserialize, Serialize};

/// One record per opened (or attempted) position.
///
/// Created by the orchestrator's open step, mutated in place by update and
/// close, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    /// Identifier assigned by the venue on mint; `None` until mint succeeds.
    pub token_id: Option<u64>,

    pub tick_lower: Tick,
    pub tick_upper: Tick,
    pub tick_current: Tick,
    pub tick_initial: Tick,

    pub range_lower: f64,
    pub range_upper: f64,
    pub price_current: f64,
    pub price_initial: f64,

    /// Realized token amounts in smallest units.
    pub amount0: TokenAmount,
    pub amount1: TokenAmount,

    pub tx_swap: Option<String>,
    pub tx_mint: Option<String>,
    pub tx_decrease: Option<String>,
    pub tx_collect: Option<String>,
    pub tx_burn: Option<String>,

    pub is_open: bool,
    pub last_update: DateTime<Utc>,

    /// Free-text outcome annotation, e.g. "success" or a failure reason.
    pub status_message: String,
}

impl LiquidityPosition {
    /// Record for a successfully opened position.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn opened(
        token_id: u64,
        tick_lower: Tick,
        tick_upper: Tick,
        tick_current: Tick,
        range_lower: f64,
        range_upper: f64,
        price_current: f64,
        amount0: TokenAmount,
        amount1: TokenAmount,
    ) -> Self {
        debug_assert!(tick_lower < tick_upper);
        Self {
            token_id: Some(token_id),
            tick_lower,
            tick_upper,
            tick_current,
            tick_initial: tick_current,
            range_lower,
            range_upper,
            price_current,
            price_initial: price_current,
            amount0,
            amount1,
            tx_swap: None,
            tx_mint: None,
            tx_decrease: None,
            tx_collect: None,
            tx_burn: None,
            is_open: true,
            last_update: Utc::now(),
            status_message: "success".to_string(),
        }
    }

    /// Audit-trail record for an open attempt that did not mint.
    #[must_use]
    pub fn failed_open(tick_current: Tick, price_current: f64, reason: &str) -> Self {
        Self {
            token_id: None,
            tick_lower: tick_current,
            tick_upper: tick_current,
            tick_current,
            tick_initial: tick_current,
            range_lower: price_current,
            range_upper: price_current,
            price_current,
            price_initial: price_current,
            amount0: TokenAmount::ZERO,
            amount1: TokenAmount::ZERO,
            tx_swap: None,
            tx_mint: None,
            tx_decrease: None,
            tx_collect: None,
            tx_burn: None,
            is_open: false,
            last_update: Utc::now(),
            status_message: reason.to_string(),
        }
    }

    /// Refresh the live tick/price observation.
    pub fn touch(&mut self, tick_current: Tick, price_current: f64) {
        self.tick_current = tick_current;
        self.price_current = price_current;
        self.last_update = Utc::now();
    }

    /// Mark the position closed, filling the close-side transaction refs.
    pub fn mark_closed(
        &mut self,
        tx_decrease: Option<String>,
        tx_collect: Option<String>,
        tx_burn: Option<String>,
    ) {
        self.tx_decrease = tx_decrease;
        self.tx_collect = tx_collect;
        self.tx_burn = tx_burn;
        self.is_open = false;
        self.last_update = Utc::now();
        self.status_message = "success".to_string();
    }

    /// Annotate a close attempt that failed partway through.
    ///
    /// The record stays open and keeps the reference of the decrease step
    /// when it did complete, so a retried close can skip re-submitting it.
    pub fn mark_close_failed(&mut self, tx_decrease: Option<String>, reason: &str) {
        if tx_decrease.is_some() {
            self.tx_decrease = tx_decrease;
        }
        self.status_message = reason.to_string();
        self.last_update = Utc::now();
    }

    /// Whether the given tick has left this position's band.
    #[must_use]
    pub fn is_out_of_range(&self, tick: Tick) -> bool {
        !tick.is_within(self.tick_lower, self.tick_upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LiquidityPosition {
        LiquidityPosition::opened(
            42,
            Tick::new(100),
            Tick::new(200),
            Tick::new(150),
            909.09,
            1100.0,
            1000.0,
            TokenAmount::new(500_000_000),
            TokenAmount::new(500_000_000_000_000_000),
        )
    }

    #[test]
    fn test_opened_record() {
        let pos = sample();
        assert!(pos.is_open);
        assert_eq!(pos.token_id, Some(42));
        assert_eq!(pos.tick_initial, Tick::new(150));
        assert_eq!(pos.status_message, "success");
    }

    #[test]
    fn test_out_of_range() {
        let pos = sample();
        assert!(!pos.is_out_of_range(Tick::new(150)));
        assert!(!pos.is_out_of_range(Tick::new(200)));
        assert!(pos.is_out_of_range(Tick::new(250)));
        assert!(pos.is_out_of_range(Tick::new(50)));
    }

    #[test]
    fn test_mark_closed() {
        let mut pos = sample();
        pos.mark_closed(Some("0xdec".into()), Some("0xcol".into()), None);
        assert!(!pos.is_open);
        assert_eq!(pos.tx_decrease.as_deref(), Some("0xdec"));
        assert_eq!(pos.tx_collect.as_deref(), Some("0xcol"));
        assert!(pos.tx_burn.is_none());
    }

    #[test]
    fn test_mark_close_failed_keeps_record_open() {
        let mut pos = sample();
        pos.mark_close_failed(Some("0xdec".into()), "fee collection reverted");
        assert!(pos.is_open);
        assert_eq!(pos.tx_decrease.as_deref(), Some("0xdec"));
        assert_eq!(pos.status_message, "fee collection reverted");

        // A later attempt must not erase the completed step reference.
        pos.mark_close_failed(None, "burn reverted");
        assert_eq!(pos.tx_decrease.as_deref(), Some("0xdec"));
        assert_eq!(pos.status_message, "burn reverted");

        pos.mark_closed(pos.tx_decrease.clone(), Some("0xcol".into()), None);
        assert!(!pos.is_open);
        assert_eq!(pos.status_message, "success");
    }

    #[test]
    fn test_serde_round_trip() {
        let pos = sample();
        let json = serde_json::to_string(&pos).unwrap();
        let back: LiquidityPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }
}
