//! Receipt and request types shared by the venue traits.

use clm_core::{Tick, TokenAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Confirmation handle for a submitted on-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
}

impl TxReceipt {
    pub fn new(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
        }
    }
}

/// Parameters for minting a new liquidity position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintParams {
    pub tick_lower: Tick,
    pub tick_upper: Tick,
    pub amount0: TokenAmount,
    pub amount1: TokenAmount,
    pub recipient: String,
}

/// Mint confirmation: the assigned position id and realized fill amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub tx_hash: String,
    pub token_id: u64,
    pub amount0: TokenAmount,
    pub amount1: TokenAmount,
}

/// On-chain wallet balances in smallest units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletBalances {
    pub token0: TokenAmount,
    pub token1: TokenAmount,
    /// Unwrapped gas-asset balance, kept aside for fees.
    pub native: TokenAmount,
}

/// Side of a CEX trade, from the taker's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// A block-trade (RFQ) request for a single-leg spot trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTradeRequest {
    /// Instrument, base first, e.g. "ETH-USDC".
    pub symbol: String,
    pub side: TradeSide,
    /// Size in base currency, already rounded to the lot size.
    pub amount: Decimal,
    /// Reject quote pairs whose bid/ask spread exceeds this.
    pub max_spread_bps: u32,
    /// Give up when no acceptable quote appears within this window.
    pub deadline: Duration,
}

/// An executed block-trade quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTradeFill {
    pub quote_id: String,
    pub price: Decimal,
    pub size: Decimal,
    /// Spread of the winning quote pair at execution time.
    pub spread_bps: Decimal,
}

/// A submitted withdrawal, net of the venue's fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub withdrawal_id: String,
    /// Amount actually sent, after the fee deduction.
    pub amount: Decimal,
    pub fee: Decimal,
}
