//! Simulated venues.
//!
//! In-memory `ChainVenue`/`CexVenue` implementations with configurable
//! failure injection, used by orchestrator tests and the bot's dry-run
//! mode. Balances settle instantly; optional knobs hold withdrawals back
//! or starve block trades of quotes to exercise the failure paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::debug;

use clm_core::{Tick, TokenAmount, TokenPair};
use clm_math::price_to_tick;

use crate::error::{CexError, CexResult, ChainError, ChainResult};
use crate::types::{
    BlockTradeFill, BlockTradeRequest, MintParams, MintReceipt, TradeSide, TxReceipt,
    WalletBalances, WithdrawalReceipt,
};
use crate::{BoxFuture, CexVenue, ChainVenue};

// ============================================================================
// SimChainVenue
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct SimChainCounts {
    pub mints: u32,
    pub swaps: u32,
    pub decreases: u32,
    pub collects: u32,
    pub burns: u32,
    pub transfers: u32,
}

struct ChainState {
    price: f64,
    tick: Tick,
    balances: WalletBalances,
    next_token_id: u64,
    tx_counter: u64,
    /// token_id -> amounts locked in the position.
    positions: HashMap<u64, (TokenAmount, TokenAmount)>,
    counts: SimChainCounts,
    fail_mint: Option<String>,
    fail_collect: Option<String>,
    /// Credit inbound gas-asset settlements as native instead of wrapped.
    native_settlement: bool,
}

/// Simulated on-chain AMM and wallet.
pub struct SimChainVenue {
    pair: TokenPair,
    state: Mutex<ChainState>,
    /// Where outbound transfers (CEX deposits) are credited.
    deposit_to: Mutex<Option<Weak<SimCexVenue>>>,
    /// Artificial delay on price reads, for concurrency tests.
    latency: Mutex<Duration>,
}

impl SimChainVenue {
    #[must_use]
    pub fn new(pair: TokenPair, price: f64) -> Self {
        let tick = price_to_tick(price, pair.decimal_diff());
        Self {
            pair,
            deposit_to: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
            state: Mutex::new(ChainState {
                price,
                tick,
                balances: WalletBalances::default(),
                next_token_id: 1,
                tx_counter: 0,
                positions: HashMap::new(),
                counts: SimChainCounts::default(),
                fail_mint: None,
                fail_collect: None,
                native_settlement: false,
            }),
        }
    }

    pub fn set_price(&self, price: f64) {
        let mut state = self.state.lock();
        state.price = price;
        state.tick = price_to_tick(price, self.pair.decimal_diff());
    }

    /// Override the pool tick directly (the authoritative value).
    pub fn set_tick(&self, tick: Tick) {
        self.state.lock().tick = tick;
    }

    pub fn set_balances(&self, token0: TokenAmount, token1: TokenAmount, native: TokenAmount) {
        self.state.lock().balances = WalletBalances {
            token0,
            token1,
            native,
        };
    }

    /// Make the next mint fail with the given reason.
    pub fn fail_next_mint(&self, reason: &str) {
        self.state.lock().fail_mint = Some(reason.to_string());
    }

    /// Make the next fee collection fail with the given reason.
    pub fn fail_next_collect(&self, reason: &str) {
        self.state.lock().fail_collect = Some(reason.to_string());
    }

    /// Credit inbound gas-asset settlements in native form, the way a real
    /// CEX withdrawal of the gas asset arrives.
    pub fn set_native_settlement(&self, value: bool) {
        self.state.lock().native_settlement = value;
    }

    /// Credit outbound transfers to the given simulated CEX's funding
    /// account, as a real deposit would settle.
    pub fn settle_deposits_to(&self, cex: &Arc<SimCexVenue>) {
        *self.deposit_to.lock() = Some(Arc::downgrade(cex));
    }

    /// Delay every price read, so tests can hold an operation in flight.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    fn settle_deposit(&self, currency: &str, amount: Decimal) {
        let cex = self.deposit_to.lock().as_ref().and_then(Weak::upgrade);
        if let Some(cex) = cex {
            cex.credit_funding(currency, amount);
        }
    }

    /// Credit the wallet by CEX ticker, mapping the unwrapped native ticker
    /// onto the wrapped pool token.
    pub fn credit_symbol(&self, symbol: &str, amount: f64) {
        let mut state = self.state.lock();
        if self.is_token0_symbol(symbol) {
            state.balances.token0 =
                state.balances.token0 + TokenAmount::from_units(amount, self.pair.token0.decimals);
        } else {
            let credit = TokenAmount::from_units(amount, self.pair.token1.decimals);
            if state.native_settlement {
                state.balances.native = state.balances.native + credit;
            } else {
                state.balances.token1 = state.balances.token1 + credit;
            }
        }
    }

    #[must_use]
    pub fn balances(&self) -> WalletBalances {
        self.state.lock().balances
    }

    #[must_use]
    pub fn counts(&self) -> SimChainCounts {
        self.state.lock().counts
    }

    fn is_token0_symbol(&self, symbol: &str) -> bool {
        symbol == self.pair.token0.symbol
            || symbol == self.pair.quote_symbol()
            || symbol == self.pair.token0.address
    }

    fn next_tx(state: &mut ChainState, kind: &str) -> String {
        state.tx_counter += 1;
        format!("0x{kind}{:08x}", state.tx_counter)
    }
}

impl ChainVenue for SimChainVenue {
    fn get_current_price(&self) -> BoxFuture<'_, ChainResult<f64>> {
        Box::pin(async move {
            let latency = *self.latency.lock();
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Ok(self.state.lock().price)
        })
    }

    fn get_current_tick(&self) -> BoxFuture<'_, ChainResult<Tick>> {
        Box::pin(async move { Ok(self.state.lock().tick) })
    }

    fn get_token_balances(&self) -> BoxFuture<'_, ChainResult<WalletBalances>> {
        Box::pin(async move { Ok(self.state.lock().balances) })
    }

    fn mint_liquidity(&self, params: MintParams) -> BoxFuture<'_, ChainResult<MintReceipt>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if let Some(reason) = state.fail_mint.take() {
                return Err(ChainError::Reverted(reason));
            }
            if params.amount0 > state.balances.token0 || params.amount1 > state.balances.token1 {
                return Err(ChainError::InsufficientBalance(format!(
                    "mint needs {}/{}, wallet has {}/{}",
                    params.amount0, params.amount1, state.balances.token0, state.balances.token1
                )));
            }
            state.balances.token0 = state.balances.token0 - params.amount0;
            state.balances.token1 = state.balances.token1 - params.amount1;

            let token_id = state.next_token_id;
            state.next_token_id += 1;
            state.positions.insert(token_id, (params.amount0, params.amount1));
            state.counts.mints += 1;
            let tx_hash = Self::next_tx(&mut state, "mint");
            debug!(token_id, %tx_hash, "sim mint");

            Ok(MintReceipt {
                tx_hash,
                token_id,
                amount0: params.amount0,
                amount1: params.amount1,
            })
        })
    }

    fn decrease_liquidity(&self, token_id: u64) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            let (amount0, amount1) = state
                .positions
                .remove(&token_id)
                .ok_or_else(|| ChainError::UnexpectedResponse(format!("unknown position {token_id}")))?;
            // Funds return to the wallet at decrease time.
            state.balances.token0 = state.balances.token0 + amount0;
            state.balances.token1 = state.balances.token1 + amount1;
            state.counts.decreases += 1;
            let tx_hash = Self::next_tx(&mut state, "decr");
            Ok(TxReceipt::new(tx_hash))
        })
    }

    fn collect_fees(&self, _token_id: u64) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if let Some(reason) = state.fail_collect.take() {
                return Err(ChainError::Reverted(reason));
            }
            state.counts.collects += 1;
            let tx_hash = Self::next_tx(&mut state, "coll");
            Ok(TxReceipt::new(tx_hash))
        })
    }

    fn burn_token(&self, _token_id: u64) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            state.counts.burns += 1;
            let tx_hash = Self::next_tx(&mut state, "burn");
            Ok(TxReceipt::new(tx_hash))
        })
    }

    fn swap(
        &self,
        token_in: String,
        _token_out: String,
        amount_in: TokenAmount,
    ) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            let dec0 = self.pair.token0.decimals;
            let dec1 = self.pair.token1.decimals;
            let price = state.price;

            if self.is_token0_symbol(&token_in) {
                // token0 -> token1 at the pool price.
                if amount_in > state.balances.token0 {
                    return Err(ChainError::InsufficientBalance("swap input".into()));
                }
                let out = TokenAmount::from_units(amount_in.to_units(dec0) / price, dec1);
                state.balances.token0 = state.balances.token0 - amount_in;
                state.balances.token1 = state.balances.token1 + out;
            } else {
                if amount_in > state.balances.token1 {
                    return Err(ChainError::InsufficientBalance("swap input".into()));
                }
                let out = TokenAmount::from_units(amount_in.to_units(dec1) * price, dec0);
                state.balances.token1 = state.balances.token1 - amount_in;
                state.balances.token0 = state.balances.token0 + out;
            }
            state.counts.swaps += 1;
            let tx_hash = Self::next_tx(&mut state, "swap");
            Ok(TxReceipt::new(tx_hash))
        })
    }

    fn wrap_native(&self, amount: TokenAmount) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if amount > state.balances.native {
                return Err(ChainError::InsufficientBalance("wrap".into()));
            }
            state.balances.native = state.balances.native - amount;
            state.balances.token1 = state.balances.token1 + amount;
            let tx_hash = Self::next_tx(&mut state, "wrap");
            Ok(TxReceipt::new(tx_hash))
        })
    }

    fn unwrap_native(&self, amount: TokenAmount) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if amount > state.balances.token1 {
                return Err(ChainError::InsufficientBalance("unwrap".into()));
            }
            state.balances.token1 = state.balances.token1 - amount;
            state.balances.native = state.balances.native + amount;
            let tx_hash = Self::next_tx(&mut state, "unwr");
            Ok(TxReceipt::new(tx_hash))
        })
    }

    fn transfer_native(
        &self,
        _to: String,
        amount: TokenAmount,
    ) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let tx_hash = {
                let mut state = self.state.lock();
                if amount > state.balances.native {
                    return Err(ChainError::InsufficientBalance("native transfer".into()));
                }
                state.balances.native = state.balances.native - amount;
                state.counts.transfers += 1;
                Self::next_tx(&mut state, "xfer")
            };
            let human = amount.to_units(self.pair.token1.decimals);
            self.settle_deposit(
                self.pair.base_symbol(),
                Decimal::from_f64(human).unwrap_or_default(),
            );
            Ok(TxReceipt::new(tx_hash))
        })
    }

    fn transfer_token(
        &self,
        token: String,
        _to: String,
        amount: TokenAmount,
    ) -> BoxFuture<'_, ChainResult<TxReceipt>> {
        Box::pin(async move {
            let is_token0 = self.is_token0_symbol(&token);
            let tx_hash = {
                let mut state = self.state.lock();
                if is_token0 {
                    if amount > state.balances.token0 {
                        return Err(ChainError::InsufficientBalance("token0 transfer".into()));
                    }
                    state.balances.token0 = state.balances.token0 - amount;
                } else {
                    if amount > state.balances.token1 {
                        return Err(ChainError::InsufficientBalance("token1 transfer".into()));
                    }
                    state.balances.token1 = state.balances.token1 - amount;
                }
                state.counts.transfers += 1;
                Self::next_tx(&mut state, "xfer")
            };
            let (currency, human) = if is_token0 {
                (
                    self.pair.quote_symbol(),
                    amount.to_units(self.pair.token0.decimals),
                )
            } else {
                (
                    self.pair.base_symbol(),
                    amount.to_units(self.pair.token1.decimals),
                )
            };
            self.settle_deposit(currency, Decimal::from_f64(human).unwrap_or_default());
            Ok(TxReceipt::new(tx_hash))
        })
    }
}

// ============================================================================
// SimCexVenue
// ============================================================================

struct CexState {
    /// Trading sub-account funding balances.
    funding: HashMap<String, Decimal>,
    /// Trading sub-account trading balances.
    trading: HashMap<String, Decimal>,
    /// Main-account funding balances (withdrawal source).
    main_funding: HashMap<String, Decimal>,
    /// Base-asset mark price used to settle block trades.
    mark_price: Decimal,
    lot_size: Decimal,
    withdrawal_fee: Decimal,
    deposit_address: String,
    /// Symbols for which no quote ever appears.
    no_quote_symbols: HashSet<String>,
    /// When set, every RFQ times out without an acceptable spread.
    quote_timeout: bool,
    fail_transfers: bool,
    /// When set, withdrawals succeed but never settle on-chain.
    hold_withdrawals: bool,
    executed_trades: Vec<(String, TradeSide, Decimal)>,
    withdrawals: u32,
    quote_counter: u64,
}

/// Simulated CEX with sub-account/main-account balance silos.
pub struct SimCexVenue {
    state: Mutex<CexState>,
    /// Where successful withdrawals settle.
    settle_to: Option<Arc<SimChainVenue>>,
}

impl SimCexVenue {
    #[must_use]
    pub fn new(mark_price: Decimal) -> Self {
        Self {
            state: Mutex::new(CexState {
                funding: HashMap::new(),
                trading: HashMap::new(),
                main_funding: HashMap::new(),
                mark_price,
                lot_size: Decimal::new(1, 6), // 0.000001
                withdrawal_fee: Decimal::ZERO,
                deposit_address: "0xcex00000000000000000000000000000000000d".to_string(),
                no_quote_symbols: HashSet::new(),
                quote_timeout: false,
                fail_transfers: false,
                hold_withdrawals: false,
                executed_trades: Vec::new(),
                withdrawals: 0,
                quote_counter: 0,
            }),
            settle_to: None,
        }
    }

    /// Settle successful withdrawals into the given simulated chain wallet.
    #[must_use]
    pub fn with_settlement(mut self, chain: Arc<SimChainVenue>) -> Self {
        self.settle_to = Some(chain);
        self
    }

    pub fn set_funding_balance(&self, currency: &str, amount: Decimal) {
        self.state.lock().funding.insert(currency.to_string(), amount);
    }

    /// Add to the funding balance, as an inbound deposit would.
    pub fn credit_funding(&self, currency: &str, amount: Decimal) {
        *self.state.lock().funding.entry(currency.to_string()).or_default() += amount;
    }

    pub fn set_main_funding_balance(&self, currency: &str, amount: Decimal) {
        self.state
            .lock()
            .main_funding
            .insert(currency.to_string(), amount);
    }

    pub fn set_trading_balance(&self, currency: &str, amount: Decimal) {
        self.state.lock().trading.insert(currency.to_string(), amount);
    }

    pub fn set_lot_size(&self, lot: Decimal) {
        self.state.lock().lot_size = lot;
    }

    pub fn set_withdrawal_fee(&self, fee: Decimal) {
        self.state.lock().withdrawal_fee = fee;
    }

    /// Starve a symbol of quotes (drives the fallback-routing path).
    pub fn set_no_quotes_for(&self, symbol: &str) {
        self.state.lock().no_quote_symbols.insert(symbol.to_string());
    }

    pub fn set_quote_timeout(&self, value: bool) {
        self.state.lock().quote_timeout = value;
    }

    pub fn set_fail_transfers(&self, value: bool) {
        self.state.lock().fail_transfers = value;
    }

    pub fn set_hold_withdrawals(&self, value: bool) {
        self.state.lock().hold_withdrawals = value;
    }

    #[must_use]
    pub fn trading_balance(&self, currency: &str) -> Decimal {
        self.state.lock().trading.get(currency).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn main_funding_balance(&self, currency: &str) -> Decimal {
        self.state
            .lock()
            .main_funding
            .get(currency)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn executed_trades(&self) -> Vec<(String, TradeSide, Decimal)> {
        self.state.lock().executed_trades.clone()
    }

    #[must_use]
    pub fn withdrawal_count(&self) -> u32 {
        self.state.lock().withdrawals
    }

    fn base_of(symbol: &str) -> &str {
        symbol.split('-').next().unwrap_or(symbol)
    }

    fn quote_of(symbol: &str) -> &str {
        symbol.split('-').nth(1).unwrap_or(symbol)
    }
}

impl CexVenue for SimCexVenue {
    fn get_funding_balance(&self, currency: String) -> BoxFuture<'_, CexResult<Decimal>> {
        Box::pin(async move {
            Ok(self.state.lock().funding.get(&currency).copied().unwrap_or_default())
        })
    }

    fn get_trading_balance(&self, currency: String) -> BoxFuture<'_, CexResult<Decimal>> {
        Box::pin(async move {
            Ok(self.state.lock().trading.get(&currency).copied().unwrap_or_default())
        })
    }

    fn transfer_funding_to_trading(
        &self,
        currency: String,
        amount: Decimal,
    ) -> BoxFuture<'_, CexResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if state.fail_transfers {
                return Err(CexError::TransferRejected("transfer disabled".into()));
            }
            let available = state.funding.get(&currency).copied().unwrap_or_default();
            if amount > available {
                return Err(CexError::InsufficientBalance(currency));
            }
            *state.funding.entry(currency.clone()).or_default() -= amount;
            *state.trading.entry(currency).or_default() += amount;
            Ok(())
        })
    }

    fn transfer_subaccount_to_main(
        &self,
        currency: String,
        amount: Decimal,
    ) -> BoxFuture<'_, CexResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if state.fail_transfers {
                return Err(CexError::TransferRejected("transfer disabled".into()));
            }
            let available = state.trading.get(&currency).copied().unwrap_or_default();
            if amount > available {
                return Err(CexError::InsufficientBalance(currency));
            }
            *state.trading.entry(currency.clone()).or_default() -= amount;
            *state.main_funding.entry(currency).or_default() += amount;
            Ok(())
        })
    }

    fn get_deposit_address(&self, _currency: String) -> BoxFuture<'_, CexResult<String>> {
        Box::pin(async move { Ok(self.state.lock().deposit_address.clone()) })
    }

    fn withdrawal_fee(&self, _currency: String) -> BoxFuture<'_, CexResult<Decimal>> {
        Box::pin(async move { Ok(self.state.lock().withdrawal_fee) })
    }

    fn withdraw(
        &self,
        currency: String,
        amount: Decimal,
        _destination: String,
    ) -> BoxFuture<'_, CexResult<WithdrawalReceipt>> {
        Box::pin(async move {
            let (receipt, settle) = {
                let mut state = self.state.lock();
                let available = state.main_funding.get(&currency).copied().unwrap_or_default();
                if amount > available {
                    return Err(CexError::WithdrawalRejected(format!(
                        "{currency}: requested {amount}, available {available}"
                    )));
                }
                let fee = state.withdrawal_fee.min(amount);
                let net = amount - fee;
                *state.main_funding.entry(currency.clone()).or_default() -= amount;
                state.withdrawals += 1;
                let receipt = WithdrawalReceipt {
                    withdrawal_id: format!("wd-{}", state.withdrawals),
                    amount: net,
                    fee,
                };
                (receipt, !state.hold_withdrawals)
            };

            if settle {
                if let Some(chain) = &self.settle_to {
                    chain.credit_symbol(&currency, receipt.amount.to_f64().unwrap_or(0.0));
                }
            }
            Ok(receipt)
        })
    }

    fn request_block_trade(
        &self,
        request: BlockTradeRequest,
    ) -> BoxFuture<'_, CexResult<BlockTradeFill>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if state.no_quote_symbols.contains(&request.symbol) {
                return Err(CexError::NoQuote(request.symbol));
            }
            if state.quote_timeout {
                return Err(CexError::QuoteTimeout(request.symbol));
            }

            let base = Self::base_of(&request.symbol).to_string();
            let quote = Self::quote_of(&request.symbol).to_string();
            let price = state.mark_price;
            let notional = request.amount * price;

            match request.side {
                TradeSide::Buy => {
                    let available = state.trading.get(&quote).copied().unwrap_or_default();
                    if notional > available {
                        return Err(CexError::TradeRejected(format!(
                            "buy {}: need {notional} {quote}, have {available}",
                            request.symbol
                        )));
                    }
                    *state.trading.entry(quote).or_default() -= notional;
                    *state.trading.entry(base).or_default() += request.amount;
                }
                TradeSide::Sell => {
                    let available = state.trading.get(&base).copied().unwrap_or_default();
                    if request.amount > available {
                        return Err(CexError::TradeRejected(format!(
                            "sell {}: need {} {base}, have {available}",
                            request.symbol, request.amount
                        )));
                    }
                    *state.trading.entry(base).or_default() -= request.amount;
                    *state.trading.entry(quote).or_default() += notional;
                }
            }

            state.quote_counter += 1;
            state
                .executed_trades
                .push((request.symbol.clone(), request.side, request.amount));
            Ok(BlockTradeFill {
                quote_id: format!("q-{}", state.quote_counter),
                price,
                size: request.amount,
                spread_bps: Decimal::ONE,
            })
        })
    }

    fn round_to_lot_size(
        &self,
        amount: Decimal,
        _symbol: String,
    ) -> BoxFuture<'_, CexResult<Decimal>> {
        Box::pin(async move {
            let lot = self.state.lock().lot_size;
            if lot.is_zero() {
                return Ok(amount);
            }
            Ok((amount / lot).floor() * lot)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clm_core::TokenInfo;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn pair() -> TokenPair {
        TokenPair::new(
            TokenInfo::new("USDC", "0xusdc", 6),
            TokenInfo::new("WETH", "0xweth", 18).wrapped_native(),
        )
    }

    #[tokio::test]
    async fn test_chain_mint_and_decrease_round_trip() {
        let chain = SimChainVenue::new(pair(), 1000.0);
        chain.set_balances(
            TokenAmount::from_units(1000.0, 6),
            TokenAmount::from_units(1.0, 18),
            TokenAmount::ZERO,
        );

        let receipt = chain
            .mint_liquidity(MintParams {
                tick_lower: Tick::new(100),
                tick_upper: Tick::new(200),
                amount0: TokenAmount::from_units(500.0, 6),
                amount1: TokenAmount::from_units(0.5, 18),
                recipient: "0xwallet".into(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.token_id, 1);

        let after_mint = chain.balances();
        assert_eq!(after_mint.token0, TokenAmount::from_units(500.0, 6));

        chain.decrease_liquidity(receipt.token_id).await.unwrap();
        let after_close = chain.balances();
        assert_eq!(after_close.token0, TokenAmount::from_units(1000.0, 6));
        assert_eq!(after_close.token1, TokenAmount::from_units(1.0, 18));
    }

    #[tokio::test]
    async fn test_chain_swap_converts_at_price() {
        let chain = SimChainVenue::new(pair(), 1000.0);
        chain.set_balances(
            TokenAmount::from_units(1000.0, 6),
            TokenAmount::ZERO,
            TokenAmount::ZERO,
        );

        chain
            .swap("0xusdc".into(), "0xweth".into(), TokenAmount::from_units(500.0, 6))
            .await
            .unwrap();
        let balances = chain.balances();
        assert_eq!(balances.token0, TokenAmount::from_units(500.0, 6));
        assert_eq!(balances.token1, TokenAmount::from_units(0.5, 18));
    }

    #[tokio::test]
    async fn test_cex_block_trade_settles_in_trading_account() {
        let cex = SimCexVenue::new(dec!(1000));
        cex.set_trading_balance("USDC", dec!(2000));

        let fill = cex
            .request_block_trade(BlockTradeRequest {
                symbol: "ETH-USDC".into(),
                side: TradeSide::Buy,
                amount: dec!(1.5),
                max_spread_bps: 3,
                deadline: Duration::from_secs(60),
            })
            .await
            .unwrap();
        assert_eq!(fill.size, dec!(1.5));
        assert_eq!(cex.trading_balance("ETH"), dec!(1.5));
        assert_eq!(cex.trading_balance("USDC"), dec!(500));
    }

    #[tokio::test]
    async fn test_cex_no_quote_and_fallback_symbol() {
        let cex = SimCexVenue::new(dec!(1000));
        cex.set_trading_balance("USDT", dec!(2000));
        cex.set_no_quotes_for("ETH-USDC");

        let err = cex
            .request_block_trade(BlockTradeRequest {
                symbol: "ETH-USDC".into(),
                side: TradeSide::Buy,
                amount: dec!(1),
                max_spread_bps: 3,
                deadline: Duration::from_secs(60),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CexError::NoQuote(_)));

        // The alternate stable pairing still fills.
        cex.request_block_trade(BlockTradeRequest {
            symbol: "ETH-USDT".into(),
            side: TradeSide::Buy,
            amount: dec!(1),
            max_spread_bps: 3,
            deadline: Duration::from_secs(60),
        })
        .await
        .unwrap();
        assert_eq!(cex.trading_balance("ETH"), dec!(1));
    }

    #[tokio::test]
    async fn test_cex_withdraw_settles_on_chain() {
        let chain = Arc::new(SimChainVenue::new(pair(), 1000.0));
        let cex = SimCexVenue::new(dec!(1000)).with_settlement(chain.clone());
        cex.set_main_funding_balance("USDC", dec!(750));
        cex.set_withdrawal_fee(dec!(1));

        let receipt = cex
            .withdraw("USDC".into(), dec!(750), "0xwallet".into())
            .await
            .unwrap();
        assert_eq!(receipt.amount, dec!(749));
        assert_eq!(chain.balances().token0, TokenAmount::from_units(749.0, 6));
    }

    #[tokio::test]
    async fn test_cex_held_withdrawal_does_not_settle() {
        let chain = Arc::new(SimChainVenue::new(pair(), 1000.0));
        let cex = SimCexVenue::new(dec!(1000)).with_settlement(chain.clone());
        cex.set_main_funding_balance("USDC", dec!(100));
        cex.set_hold_withdrawals(true);

        cex.withdraw("USDC".into(), dec!(100), "0xwallet".into())
            .await
            .unwrap();
        assert_eq!(chain.balances().token0, TokenAmount::ZERO);
    }

    #[tokio::test]
    async fn test_round_to_lot_size_floors() {
        let cex = SimCexVenue::new(dec!(1000));
        cex.set_lot_size(dec!(0.000001));
        let rounded = cex
            .round_to_lot_size(dec!(1.123456789), "ETH-USDC".into())
            .await
            .unwrap();
        assert_eq!(rounded, dec!(1.123456));
    }
}
