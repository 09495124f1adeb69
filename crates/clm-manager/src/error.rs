//! Orchestrator failure taxonomy.
//!
//! Each saga step returns the specific variant it can produce, so the
//! step sequencing is a plain control-flow match. Recoverability is part
//! of the type, never inferred from error text: `WithdrawalTimeout` is
//! the one kind resolved by a background retry instead of aborting.

use thiserror::Error;

use clm_history::HistoryError;
use clm_venue::{CexError, ChainError};

#[derive(Debug, Error)]
pub enum ManagerError {
    /// Neither venue can cover a required asset.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Deposit of {0} not credited before the deadline")]
    DepositTimeout(String),

    #[error("Transfer rejected: {0}")]
    TransferRejected(String),

    #[error("Withdrawal rejected: {0}")]
    WithdrawalRejected(String),

    /// Recoverable: a background task keeps polling for the funds.
    #[error("Withdrawal of {currency} not observed on-chain before the deadline")]
    WithdrawalTimeout { currency: String },

    /// No quotes at all for the requested pairing.
    #[error("No block-trade quote for {0}")]
    QuoteUnavailable(String),

    /// Quotes arrived but none with an acceptable spread before the deadline.
    #[error("No acceptable block-trade quote for {0} before the deadline")]
    QuoteTimeout(String),

    #[error("Block trade rejected: {0}")]
    TradeRejected(String),

    #[error("Unexpected venue response: {0}")]
    UnexpectedVenueResponse(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl ManagerError {
    /// Whether the open attempt can resume in the background instead of
    /// aborting outright.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::WithdrawalTimeout { .. })
    }
}

impl From<CexError> for ManagerError {
    fn from(err: CexError) -> Self {
        match err {
            CexError::TransferRejected(msg) => Self::TransferRejected(msg),
            CexError::WithdrawalRejected(msg) => Self::WithdrawalRejected(msg),
            CexError::NoQuote(symbol) => Self::QuoteUnavailable(symbol),
            CexError::QuoteTimeout(symbol) => Self::QuoteTimeout(symbol),
            CexError::TradeRejected(msg) => Self::TradeRejected(msg),
            CexError::InsufficientBalance(msg) => Self::InsufficientFunds(msg),
            CexError::UnexpectedResponse(msg) => Self::UnexpectedVenueResponse(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
