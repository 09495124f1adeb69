//! The position lifecycle manager.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use clm_core::TokenAmount;
use clm_history::{LiquidityPosition, PositionHistory};
use clm_math::CapitalAllocation;
use clm_telemetry::Notifier;
use clm_venue::{CexVenue, ChainVenue, MintParams, WalletBalances};

use crate::config::{HedgeMode, ManagerConfig, ParamsUpdate};
use crate::error::{ManagerError, ManagerResult};
use crate::funds::FundsSnapshot;
use crate::{recovery, saga, swap};

/// Result of one manager operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new position was minted.
    Opened(LiquidityPosition),
    /// The open record was refreshed; the tick is still in range.
    Updated(LiquidityPosition),
    /// Out of range: the old position was closed and a new one opened.
    Rebalanced(LiquidityPosition),
    /// The open position was closed.
    Closed(LiquidityPosition),
    /// A withdrawal timed out; a background task resumes the open once
    /// the funds arrive.
    AwaitingFunds,
    /// Another operation was in flight; nothing was done.
    Skipped,
    /// Nothing to do.
    Idle,
}

struct ManagerState {
    config: ManagerConfig,
    history: PositionHistory,
    allocation: Option<CapitalAllocation>,
}

struct Inner {
    chain: Arc<dyn ChainVenue>,
    cex: Option<Arc<dyn CexVenue>>,
    notifier: Arc<dyn Notifier>,
    state: tokio::sync::Mutex<ManagerState>,
    recovery: parking_lot::Mutex<Option<CancellationToken>>,
    resumed_open: bool,
}

/// Stateful orchestrator for one pool/venue pair.
///
/// At most one state-mutating operation runs at a time; a caller arriving
/// while another operation holds the lock gets [`Outcome::Skipped`]
/// immediately, never queued. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PositionManager {
    inner: Arc<Inner>,
}

impl PositionManager {
    /// Load (or start) the persisted history and build the manager.
    /// Resumes with the open position when the last record is open.
    pub fn new(
        config: ManagerConfig,
        chain: Arc<dyn ChainVenue>,
        cex: Option<Arc<dyn CexVenue>>,
        notifier: Arc<dyn Notifier>,
    ) -> ManagerResult<Self> {
        let history = PositionHistory::load_or_default(config.history_path.clone())?;
        let resumed_open = history.has_open();
        if resumed_open {
            info!("Resuming with an open position");
        }
        Ok(Self {
            inner: Arc::new(Inner {
                chain,
                cex,
                notifier,
                state: tokio::sync::Mutex::new(ManagerState {
                    config,
                    history,
                    allocation: None,
                }),
                recovery: parking_lot::Mutex::new(None),
                resumed_open,
            }),
        })
    }

    /// Whether the loaded history ended with an open position.
    #[must_use]
    pub fn resumed_with_open_position(&self) -> bool {
        self.inner.resumed_open
    }

    /// The most recent position record, open or closed.
    pub async fn current_stats(&self) -> Option<LiquidityPosition> {
        self.inner.state.lock().await.history.last().cloned()
    }

    /// Open a new position at the current price.
    ///
    /// Computes the allocation, funds the wallet (pool swap or CEX saga)
    /// when it is short, mints, and appends the open record.
    pub async fn open_position(&self) -> ManagerResult<Outcome> {
        let Ok(mut state) = self.inner.state.try_lock() else {
            warn!("open_position skipped, another operation is in flight");
            return Ok(Outcome::Skipped);
        };
        if state.history.has_open() {
            debug!("Position already open, nothing to do");
            return Ok(Outcome::Idle);
        }

        let chain = self.inner.chain.as_ref();
        let cfg = state.config.clone();
        let price = chain.get_current_price().await?;
        let tick = chain.get_current_tick().await?;

        let allocation = CapitalAllocation::compute(
            cfg.range_percentage,
            price,
            cfg.token0_capital,
            cfg.pair.decimal_diff(),
        );
        let range = allocation.range.aligned_to_spacing(cfg.tick_spacing);
        info!(
            %price,
            %tick,
            lower_tick = %range.lower_tick,
            upper_tick = %range.upper_tick,
            amount0 = allocation.amount0,
            amount1 = allocation.amount1,
            "Opening position"
        );

        let mut wallet = chain.get_token_balances().await?;
        let mut snapshot = FundsSnapshot::compute(
            &allocation,
            wallet,
            &cfg.pair,
            cfg.slippage_factor,
            cfg.gas_reserve,
        );

        let mut tx_swap = None;
        // Spare native counts as available, but only the wrapped form can be
        // minted; wrap it whenever the wrapped balance alone falls short.
        wallet = wrap_native_shortfall(chain, &cfg, snapshot.required1, wallet).await?;
        snapshot = FundsSnapshot::compute(
            &allocation,
            wallet,
            &cfg.pair,
            cfg.slippage_factor,
            cfg.gas_reserve,
        );

        if !snapshot.covers() {
            let funded = match cfg.hedge_mode {
                HedgeMode::SingleVenue => swap::rebalance_wallet(chain, &cfg, &snapshot, price)
                    .await
                    .map(|receipt| tx_swap = receipt),
                HedgeMode::CexHedged => {
                    let cex = self.inner.cex.as_deref().ok_or_else(|| {
                        ManagerError::UnexpectedVenueResponse(
                            "hedged mode configured without a CEX venue".to_string(),
                        )
                    })?;
                    saga::ensure_wallet_funded(chain, cex, &cfg, &snapshot, price).await
                }
            };
            match funded {
                Ok(()) => {}
                Err(err) if err.is_recoverable() => {
                    // Audit trail: record the deferred attempt as closed.
                    state
                        .history
                        .push(LiquidityPosition::failed_open(tick, price, &err.to_string()))?;
                    self.notify(&format!("Position open deferred: {err}"));
                    let baseline = chain.get_token_balances().await?;
                    drop(state);
                    self.spawn_recovery(
                        baseline,
                        cfg.recovery_deadline,
                        cfg.recovery_poll_interval,
                    );
                    return Ok(Outcome::AwaitingFunds);
                }
                Err(err) => {
                    self.notify(&format!("Position open failed: {err}"));
                    return Err(err);
                }
            }
            wallet = chain.get_token_balances().await?;
            // A CEX withdrawal of the gas asset arrives in native form.
            wallet = wrap_native_shortfall(chain, &cfg, snapshot.required1, wallet).await?;
        }

        // Mint the sized amounts, clamped to what the wallet holds after
        // funding fees.
        let amount0 =
            TokenAmount::from_units(allocation.amount0, cfg.pair.token0.decimals).min(wallet.token0);
        let amount1 =
            TokenAmount::from_units(allocation.amount1, cfg.pair.token1.decimals).min(wallet.token1);
        let receipt = match chain
            .mint_liquidity(MintParams {
                tick_lower: range.lower_tick,
                tick_upper: range.upper_tick,
                amount0,
                amount1,
                recipient: cfg.wallet_address.clone(),
            })
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                self.notify(&format!("Position open failed: {err}"));
                return Err(err.into());
            }
        };

        let mut record = LiquidityPosition::opened(
            receipt.token_id,
            range.lower_tick,
            range.upper_tick,
            tick,
            range.lower_price,
            range.upper_price,
            price,
            receipt.amount0,
            receipt.amount1,
        );
        record.tx_mint = Some(receipt.tx_hash.clone());
        record.tx_swap = tx_swap.map(|r| r.tx_hash);
        state.history.push(record.clone())?;
        state.allocation = Some(allocation);
        drop(state);

        // A successful foreground open supersedes any pending recovery.
        self.cancel_recovery();
        self.notify(&format!(
            "Position opened: id {} ticks [{}, {}]",
            receipt.token_id, range.lower_tick, range.upper_tick
        ));
        Ok(Outcome::Opened(record))
    }

    /// Refresh the open record and rebalance when the tick left the band.
    ///
    /// With no open position this delegates to [`Self::open_position`].
    /// A rebalance releases the lock between its close and open sub-calls
    /// so each is observable as an independent locked operation.
    pub async fn update_position(&self) -> ManagerResult<Outcome> {
        let Ok(mut state) = self.inner.state.try_lock() else {
            warn!("update_position skipped, another operation is in flight");
            return Ok(Outcome::Skipped);
        };

        let chain = self.inner.chain.as_ref();
        if !state.history.has_open() {
            drop(state);
            return self.open_position().await;
        }

        let tick = chain.get_current_tick().await?;
        let price = chain.get_current_price().await?;
        let Some(record) = state.history.open_position_mut() else {
            drop(state);
            return self.open_position().await;
        };
        record.touch(tick, price);
        let out_of_range = record.is_out_of_range(tick);
        let snapshot = record.clone();
        state.history.save()?;

        if !out_of_range {
            debug!(%tick, %price, "Position still in range");
            return Ok(Outcome::Updated(snapshot));
        }

        info!(
            %tick,
            lower_tick = %snapshot.tick_lower,
            upper_tick = %snapshot.tick_upper,
            "Tick left the range, rebalancing"
        );
        drop(state);

        if matches!(self.close_position().await?, Outcome::Skipped) {
            return Ok(Outcome::Skipped);
        }
        match self.open_position().await? {
            Outcome::Opened(position) => Ok(Outcome::Rebalanced(position)),
            other => Ok(other),
        }
    }

    /// Close the open position: decrease, collect, optionally unwrap the
    /// hedge-side asset and burn the token. No-op without an open position.
    ///
    /// A failure partway through leaves the record open with the completed
    /// step references and the failure reason persisted, so a retried close
    /// skips the already-submitted decrease.
    pub async fn close_position(&self) -> ManagerResult<Outcome> {
        let Ok(mut state) = self.inner.state.try_lock() else {
            warn!("close_position skipped, another operation is in flight");
            return Ok(Outcome::Skipped);
        };
        let Some(record) = state.history.open_position() else {
            debug!("No open position to close");
            return Ok(Outcome::Idle);
        };
        let token_id = record.token_id.ok_or_else(|| {
            ManagerError::UnexpectedVenueResponse("open record without a token id".to_string())
        })?;
        let prior_decrease = record.tx_decrease.clone();
        let hedged = state.config.hedge_mode == HedgeMode::CexHedged;
        let burn_on_close = state.config.burn_on_close;
        let unwrap_on_close = hedged && state.config.pair.token1.is_wrapped_native;

        let chain = self.inner.chain.as_ref();
        info!(token_id, "Closing position");
        let steps = run_close_steps(
            chain,
            token_id,
            prior_decrease,
            unwrap_on_close,
            burn_on_close,
        )
        .await;

        let Some(record) = state.history.open_position_mut() else {
            return Err(ManagerError::UnexpectedVenueResponse(
                "open record disappeared during close".to_string(),
            ));
        };
        match steps {
            Ok((tx_decrease, tx_collect, tx_burn)) => {
                record.mark_closed(Some(tx_decrease), Some(tx_collect), tx_burn);
                let snapshot = record.clone();
                state.history.save()?;
                drop(state);

                self.cancel_recovery();
                self.notify(&format!("Position closed: id {token_id}"));
                Ok(Outcome::Closed(snapshot))
            }
            Err((partial_decrease, err)) => {
                record.mark_close_failed(partial_decrease, &err.to_string());
                state.history.save()?;
                drop(state);

                self.notify(&format!("Position close failed: {err}"));
                Err(err)
            }
        }
    }

    /// Apply a runtime parameter update under the operation lock.
    pub async fn update_params(&self, update: ParamsUpdate) -> ManagerResult<Outcome> {
        if update.is_empty() {
            return Ok(Outcome::Idle);
        }
        let Ok(mut state) = self.inner.state.try_lock() else {
            warn!("update_params skipped, another operation is in flight");
            return Ok(Outcome::Skipped);
        };
        update.apply(&mut state.config);
        Ok(Outcome::Idle)
    }

    /// Cancel any pending background recovery. Call on shutdown.
    pub fn shutdown(&self) {
        self.cancel_recovery();
    }

    pub(crate) fn chain(&self) -> &dyn ChainVenue {
        self.inner.chain.as_ref()
    }

    pub(crate) fn notify(&self, message: &str) {
        self.inner.notifier.notify(message);
    }

    fn spawn_recovery(&self, baseline: WalletBalances, deadline: Duration, poll: Duration) {
        let token = CancellationToken::new();
        let previous = self.inner.recovery.lock().replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        info!("Scheduling withdrawal recovery task");
        tokio::spawn(recovery::run(self.clone(), token, baseline, deadline, poll));
    }

    fn cancel_recovery(&self) {
        if let Some(token) = self.inner.recovery.lock().take() {
            debug!("Cancelling pending withdrawal recovery task");
            token.cancel();
        }
    }
}

/// Wrap spare native into the pool token when the wrapped balance alone
/// cannot cover the token1 requirement.
async fn wrap_native_shortfall(
    chain: &dyn ChainVenue,
    cfg: &ManagerConfig,
    required1: TokenAmount,
    wallet: WalletBalances,
) -> ManagerResult<WalletBalances> {
    if !cfg.pair.token1.is_wrapped_native || wallet.token1 >= required1 {
        return Ok(wallet);
    }
    let spare = wallet.native.saturating_sub(cfg.gas_reserve);
    if spare.is_zero() {
        return Ok(wallet);
    }
    chain.wrap_native(spare).await?;
    Ok(chain.get_token_balances().await?)
}

/// Run the close-side venue calls in order.
///
/// On failure returns the decrease reference when that step had completed,
/// so the caller can persist it and a retry can skip re-submitting it.
async fn run_close_steps(
    chain: &dyn ChainVenue,
    token_id: u64,
    prior_decrease: Option<String>,
    unwrap_on_close: bool,
    burn_on_close: bool,
) -> Result<(String, String, Option<String>), (Option<String>, ManagerError)> {
    let tx_decrease = match prior_decrease {
        Some(tx) => {
            debug!(token_id, "Liquidity already decreased, resuming close");
            tx
        }
        None => chain
            .decrease_liquidity(token_id)
            .await
            .map_err(|e| (None, ManagerError::from(e)))?
            .tx_hash,
    };
    let tx_collect = chain
        .collect_fees(token_id)
        .await
        .map_err(|e| (Some(tx_decrease.clone()), ManagerError::from(e)))?
        .tx_hash;

    if unwrap_on_close {
        let balances = chain
            .get_token_balances()
            .await
            .map_err(|e| (Some(tx_decrease.clone()), ManagerError::from(e)))?;
        if !balances.token1.is_zero() {
            chain
                .unwrap_native(balances.token1)
                .await
                .map_err(|e| (Some(tx_decrease.clone()), ManagerError::from(e)))?;
        }
    }
    let tx_burn = if burn_on_close {
        Some(
            chain
                .burn_token(token_id)
                .await
                .map_err(|e| (Some(tx_decrease.clone()), ManagerError::from(e)))?
                .tx_hash,
        )
    } else {
        None
    };
    Ok((tx_decrease, tx_collect, tx_burn))
}
