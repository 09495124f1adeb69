//! Cross-venue fund orchestration saga.
//!
//! Makes both required token amounts available in the on-chain wallet
//! before minting, sourcing shortfalls from the CEX account. Steps, in
//! order: sweep funding balances into trading, deposit wallet surplus,
//! block-trade swap if one side is short, move funds to the main account,
//! withdraw to the wallet and poll until the balance increase lands.
//! Each step commits independently; a failure aborts the remaining steps
//! of this attempt.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use clm_core::{TokenAmount, TokenInfo};
use clm_venue::{
    BlockTradeFill, BlockTradeRequest, CexError, CexVenue, ChainVenue, TradeSide,
};

use crate::config::ManagerConfig;
use crate::error::{ManagerError, ManagerResult};
use crate::funds::FundsSnapshot;

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub(crate) async fn ensure_wallet_funded(
    chain: &dyn ChainVenue,
    cex: &dyn CexVenue,
    config: &ManagerConfig,
    snapshot: &FundsSnapshot,
    price: f64,
) -> ManagerResult<()> {
    let pair = &config.pair;
    let quote = pair.quote_symbol().to_string();
    let base = pair.base_symbol().to_string();

    let need_quote = to_decimal(snapshot.shortfall0().to_units(pair.token0.decimals));
    let need_base = to_decimal(snapshot.shortfall1().to_units(pair.token1.decimals));
    info!(%need_quote, %need_base, "Funding saga started");

    sweep_funding(cex, &quote).await?;
    sweep_funding(cex, &base).await?;

    deposit_surplus(chain, cex, config, snapshot).await?;
    // Deposits land in the funding account; sweep again before trading.
    sweep_funding(cex, &quote).await?;
    sweep_funding(cex, &base).await?;

    execute_swap_if_needed(cex, config, &quote, &base, need_quote, need_base, price).await?;

    withdraw_to_wallet(chain, cex, config, &quote, need_quote, true).await?;
    withdraw_to_wallet(chain, cex, config, &base, need_base, false).await?;

    info!("Funding saga completed");
    Ok(())
}

/// Sweep any funding-account balance into the trading account.
async fn sweep_funding(cex: &dyn CexVenue, currency: &str) -> ManagerResult<()> {
    let balance = cex.get_funding_balance(currency.to_string()).await?;
    if balance > Decimal::ZERO {
        debug!(currency, %balance, "Sweeping funding balance into trading");
        cex.transfer_funding_to_trading(currency.to_string(), balance)
            .await?;
    }
    Ok(())
}

/// Deposit wallet balances beyond what the position will consume.
async fn deposit_surplus(
    chain: &dyn ChainVenue,
    cex: &dyn CexVenue,
    config: &ManagerConfig,
    snapshot: &FundsSnapshot,
) -> ManagerResult<()> {
    let pair = &config.pair;
    let surplus0 = snapshot.surplus0();
    if !surplus0.is_zero() {
        deposit_asset(chain, cex, config, &pair.token0, pair.quote_symbol(), surplus0).await?;
    }
    let surplus1 = snapshot.surplus1();
    if !surplus1.is_zero() {
        deposit_asset(chain, cex, config, &pair.token1, pair.base_symbol(), surplus1).await?;
    }
    Ok(())
}

async fn deposit_asset(
    chain: &dyn ChainVenue,
    cex: &dyn CexVenue,
    config: &ManagerConfig,
    token: &TokenInfo,
    currency: &str,
    amount: TokenAmount,
) -> ManagerResult<()> {
    let address = cex.get_deposit_address(currency.to_string()).await?;
    let before = cex.get_funding_balance(currency.to_string()).await?;
    info!(currency, %amount, %address, "Depositing wallet surplus");

    if token.is_wrapped_native {
        // The venue credits the gas asset in native form only. Spend the
        // spare native first so the wrapped balance the mint still needs
        // stays untouched.
        let balances = chain.get_token_balances().await?;
        let spare = balances.native.saturating_sub(config.gas_reserve);
        let unwrap = amount.saturating_sub(spare).min(balances.token1);
        if !unwrap.is_zero() {
            chain.unwrap_native(unwrap).await?;
        }
        chain.transfer_native(address, amount).await?;
    } else {
        chain
            .transfer_token(token.address.clone(), address, amount)
            .await?;
    }

    let deadline = Instant::now() + config.deposit_deadline;
    loop {
        sleep(config.deposit_poll_interval).await;
        let balance = cex.get_funding_balance(currency.to_string()).await?;
        if balance > before {
            debug!(currency, %balance, "Deposit credited");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ManagerError::DepositTimeout(currency.to_string()));
        }
    }
}

/// Decide whether a block trade is needed and execute it.
///
/// A trade is needed when one side's trading balance is short and the
/// other side covers its own requirement plus the deficit valued at the
/// current price, inflated by the maximum acceptable spread.
#[allow(clippy::too_many_arguments)]
async fn execute_swap_if_needed(
    cex: &dyn CexVenue,
    config: &ManagerConfig,
    quote: &str,
    base: &str,
    need_quote: Decimal,
    need_base: Decimal,
    price: f64,
) -> ManagerResult<()> {
    let have_quote = cex.get_trading_balance(quote.to_string()).await?;
    let have_base = cex.get_trading_balance(base.to_string()).await?;
    if have_quote >= need_quote && have_base >= need_base {
        debug!("Trading balances cover both requirements, no block trade");
        return Ok(());
    }

    let px = to_decimal(price);
    let spread_factor = Decimal::ONE + Decimal::from(config.max_spread_bps) / Decimal::from(10_000u32);
    let symbol = config.pair.cex_symbol();

    if have_base < need_base {
        let deficit = need_base - have_base;
        let cost = deficit * px * spread_factor;
        if have_quote < need_quote + cost {
            return Err(ManagerError::InsufficientFunds(format!(
                "trading account holds {have_quote} {quote}, needs {need_quote} plus {cost} to buy {deficit} {base}"
            )));
        }
        let size = cex
            .round_to_lot_size(deficit * spread_factor, symbol.clone())
            .await?;
        if size > Decimal::ZERO {
            execute_block_trade(cex, config, symbol, TradeSide::Buy, size).await?;
        }
    } else {
        let deficit = need_quote - have_quote;
        let size_base = deficit / px * spread_factor;
        if have_base < need_base + size_base {
            return Err(ManagerError::InsufficientFunds(format!(
                "trading account holds {have_base} {base}, needs {need_base} plus {size_base} to cover {deficit} {quote}"
            )));
        }
        let size = cex.round_to_lot_size(size_base, symbol.clone()).await?;
        if size > Decimal::ZERO {
            execute_block_trade(cex, config, symbol, TradeSide::Sell, size).await?;
        }
    }
    Ok(())
}

/// Execute a block trade, rerouting through the alternate stable pairing
/// when the primary one yields no quotes at all.
async fn execute_block_trade(
    cex: &dyn CexVenue,
    config: &ManagerConfig,
    symbol: String,
    side: TradeSide,
    size: Decimal,
) -> ManagerResult<BlockTradeFill> {
    let request = BlockTradeRequest {
        symbol: symbol.clone(),
        side,
        amount: size,
        max_spread_bps: config.max_spread_bps,
        deadline: config.quote_deadline,
    };
    match cex.request_block_trade(request.clone()).await {
        Ok(fill) => {
            info!(%symbol, %side, size = %fill.size, price = %fill.price, "Block trade executed");
            Ok(fill)
        }
        Err(CexError::NoQuote(_)) => {
            let Some(stable) = &config.fallback_quote_symbol else {
                return Err(ManagerError::QuoteUnavailable(symbol));
            };
            let fallback = format!("{}-{}", config.pair.base_symbol(), stable);
            warn!(from = %symbol, to = %fallback, "No quotes, rerouting through alternate pairing");
            let fill = cex
                .request_block_trade(BlockTradeRequest {
                    symbol: fallback.clone(),
                    ..request
                })
                .await?;
            info!(symbol = %fallback, %side, size = %fill.size, "Block trade executed via fallback");
            Ok(fill)
        }
        Err(err) => Err(err.into()),
    }
}

/// Move `need` of `currency` to the main account, withdraw it to the
/// wallet, and poll until the on-chain balance increase is observed.
async fn withdraw_to_wallet(
    chain: &dyn ChainVenue,
    cex: &dyn CexVenue,
    config: &ManagerConfig,
    currency: &str,
    need: Decimal,
    is_token0: bool,
) -> ManagerResult<()> {
    if need <= Decimal::ZERO {
        return Ok(());
    }
    let available = cex.get_trading_balance(currency.to_string()).await?;
    if available <= Decimal::ZERO {
        return Err(ManagerError::InsufficientFunds(format!(
            "no {currency} available to withdraw"
        )));
    }
    // The venue nets its fee from the requested amount; inflate so the
    // net arrival still covers the requirement.
    let fee = cex.withdrawal_fee(currency.to_string()).await?;
    let amount = (need + fee).min(available);

    cex.transfer_subaccount_to_main(currency.to_string(), amount)
        .await?;

    let baseline = chain.get_token_balances().await?;
    let receipt = cex
        .withdraw(currency.to_string(), amount, config.wallet_address.clone())
        .await?;
    info!(
        currency,
        amount = %receipt.amount,
        fee = %receipt.fee,
        id = %receipt.withdrawal_id,
        "Withdrawal submitted"
    );

    let deadline = Instant::now() + config.withdrawal_deadline;
    loop {
        sleep(config.withdrawal_poll_interval).await;
        let balances = chain.get_token_balances().await?;
        let arrived = if is_token0 {
            balances.token0 > baseline.token0
        } else {
            balances.token1 > baseline.token1 || balances.native > baseline.native
        };
        if arrived {
            debug!(currency, "Withdrawal observed on-chain");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ManagerError::WithdrawalTimeout {
                currency: currency.to_string(),
            });
        }
    }
}
