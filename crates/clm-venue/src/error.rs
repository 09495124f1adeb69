//! Venue adapter error types.

use thiserror::Error;

/// Errors surfaced by the on-chain venue adapter.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Insufficient wallet balance: {0}")]
    InsufficientBalance(String),

    #[error("Unexpected venue response: {0}")]
    UnexpectedResponse(String),
}

pub type ChainResult<T> = Result<T, ChainError>;

/// Errors surfaced by the CEX venue adapter.
#[derive(Debug, Clone, Error)]
pub enum CexError {
    #[error("Transfer rejected: {0}")]
    TransferRejected(String),

    #[error("Withdrawal rejected: {0}")]
    WithdrawalRejected(String),

    #[error("No quote received: {0}")]
    NoQuote(String),

    #[error("No acceptable spread before deadline: {0}")]
    QuoteTimeout(String),

    #[error("Block trade rejected: {0}")]
    TradeRejected(String),

    #[error("Insufficient account balance: {0}")]
    InsufficientBalance(String),

    #[error("Unexpected venue response: {0}")]
    UnexpectedResponse(String),
}

pub type CexResult<T> = Result<T, CexError>;
