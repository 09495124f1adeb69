//! On-chain venue adapter interface.

use clm_core::{Tick, TokenAmount};

use crate::error::ChainResult;
use crate::types::{MintParams, MintReceipt, TxReceipt, WalletBalances};
use crate::BoxFuture;

/// The on-chain AMM and wallet, as seen by the orchestrator.
///
/// Transaction building, signing and broadcast live behind this trait;
/// every method resolves once the transaction is confirmed (or fails).
/// Prices are quoted as token0 per token1.
pub trait ChainVenue: Send + Sync {
    /// Current pool price.
    fn get_current_price(&self) -> BoxFuture<'_, ChainResult<f64>>;

    /// Current pool tick, authoritative over any price round-trip.
    fn get_current_tick(&self) -> BoxFuture<'_, ChainResult<Tick>>;

    /// Wallet balances for the pool tokens and the native gas asset.
    fn get_token_balances(&self) -> BoxFuture<'_, ChainResult<WalletBalances>>;

    /// Mint a new position. The receipt carries the assigned position id
    /// and the realized fill amounts.
    fn mint_liquidity(&self, params: MintParams) -> BoxFuture<'_, ChainResult<MintReceipt>>;

    /// Remove all liquidity from a position.
    fn decrease_liquidity(&self, token_id: u64) -> BoxFuture<'_, ChainResult<TxReceipt>>;

    /// Collect accrued fees from a position.
    fn collect_fees(&self, token_id: u64) -> BoxFuture<'_, ChainResult<TxReceipt>>;

    /// Burn the position token. Optional on close.
    fn burn_token(&self, token_id: u64) -> BoxFuture<'_, ChainResult<TxReceipt>>;

    /// Swap `amount_in` of `token_in` for `token_out` against the pool.
    fn swap(
        &self,
        token_in: String,
        token_out: String,
        amount_in: TokenAmount,
    ) -> BoxFuture<'_, ChainResult<TxReceipt>>;

    /// Wrap native gas asset into its pool-tradable form.
    fn wrap_native(&self, amount: TokenAmount) -> BoxFuture<'_, ChainResult<TxReceipt>>;

    /// Unwrap back into the native gas asset.
    fn unwrap_native(&self, amount: TokenAmount) -> BoxFuture<'_, ChainResult<TxReceipt>>;

    /// Send native gas asset to an external address (CEX deposit).
    fn transfer_native(
        &self,
        to: String,
        amount: TokenAmount,
    ) -> BoxFuture<'_, ChainResult<TxReceipt>>;

    /// Send an ERC-20 token to an external address (CEX deposit).
    fn transfer_token(
        &self,
        token: String,
        to: String,
        amount: TokenAmount,
    ) -> BoxFuture<'_, ChainResult<TxReceipt>>;
}
