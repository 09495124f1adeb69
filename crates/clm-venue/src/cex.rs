//! CEX venue adapter interface.

use rust_decimal::Decimal;

use crate::error::CexResult;
use crate::types::{BlockTradeFill, BlockTradeRequest, WithdrawalReceipt};
use crate::BoxFuture;

/// The centralized exchange, as seen by the orchestrator.
///
/// Balances are per-currency in human units. The trading sub-account holds
/// the capital used for block trades; the main account's funding balance is
/// the withdrawal source. Quote negotiation transport and authentication
/// live behind this trait.
pub trait CexVenue: Send + Sync {
    /// Available funding-account balance on the trading sub-account.
    fn get_funding_balance(&self, currency: String) -> BoxFuture<'_, CexResult<Decimal>>;

    /// Available trading-account balance on the trading sub-account.
    fn get_trading_balance(&self, currency: String) -> BoxFuture<'_, CexResult<Decimal>>;

    /// Sweep funding balance into the trading account (same sub-account).
    fn transfer_funding_to_trading(
        &self,
        currency: String,
        amount: Decimal,
    ) -> BoxFuture<'_, CexResult<()>>;

    /// Move funds from the trading sub-account to the main account's
    /// funding balance.
    fn transfer_subaccount_to_main(
        &self,
        currency: String,
        amount: Decimal,
    ) -> BoxFuture<'_, CexResult<()>>;

    /// Deposit address for a currency on the configured chain.
    fn get_deposit_address(&self, currency: String) -> BoxFuture<'_, CexResult<String>>;

    /// Maximum withdrawal fee for a currency; withdrawals are netted by it.
    fn withdrawal_fee(&self, currency: String) -> BoxFuture<'_, CexResult<Decimal>>;

    /// Withdraw from the main account to an on-chain address.
    fn withdraw(
        &self,
        currency: String,
        amount: Decimal,
        destination: String,
    ) -> BoxFuture<'_, CexResult<WithdrawalReceipt>>;

    /// Request a two-sided quote and execute the best acceptable one.
    ///
    /// Resolves with the executed fill, or `NoQuote`/`QuoteTimeout` when the
    /// deadline elapses without quotes or without an acceptable spread.
    fn request_block_trade(
        &self,
        request: BlockTradeRequest,
    ) -> BoxFuture<'_, CexResult<BlockTradeFill>>;

    /// Round a base-currency size down to the instrument's lot size.
    fn round_to_lot_size(
        &self,
        amount: Decimal,
        symbol: String,
    ) -> BoxFuture<'_, CexResult<Decimal>>;
}
