//! Venue adapter interfaces.
//!
//! The orchestrator talks to two independently-failing external systems:
//! the on-chain AMM ([`ChainVenue`]) and the CEX ([`CexVenue`]). Both are
//! modeled as dyn-compatible traits so the transport implementations stay
//! out of the core and tests can inject simulated venues.

pub mod cex;
pub mod chain;
pub mod error;
pub mod sim;
pub mod types;

pub use cex::CexVenue;
pub use chain::ChainVenue;
pub use error::{CexError, CexResult, ChainError, ChainResult};
pub use sim::{SimCexVenue, SimChainVenue};
pub use types::{
    BlockTradeFill, BlockTradeRequest, MintParams, MintReceipt, TradeSide, TxReceipt,
    WalletBalances, WithdrawalReceipt,
};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
