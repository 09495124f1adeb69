//! Application wiring and main loop.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use clm_core::TokenAmount;
use clm_engine::TradingEngine;
use clm_manager::{HedgeMode, Outcome, PositionManager};
use clm_telemetry::LogNotifier;
use clm_venue::{SimCexVenue, SimChainVenue};

use crate::config::AppConfig;
use crate::error::AppResult;

/// The wired application: venues, manager, engine, and the update loop.
pub struct Application {
    config: AppConfig,
    engine: TradingEngine,
}

impl Application {
    /// Build the venues from the dry-run seed and wire the engine.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let pair = config.pair();
        let dry = &config.dry_run;

        let chain = Arc::new(SimChainVenue::new(pair.clone(), dry.initial_price));
        chain.set_balances(
            TokenAmount::from_units(dry.wallet_token0, pair.token0.decimals),
            TokenAmount::from_units(dry.wallet_token1, pair.token1.decimals),
            TokenAmount::from_units(dry.wallet_native, pair.token1.decimals),
        );

        let cex = if config.strategy.hedge_mode == HedgeMode::CexHedged {
            let mark = Decimal::from_f64(dry.initial_price).unwrap_or_default();
            let cex = Arc::new(SimCexVenue::new(mark).with_settlement(chain.clone()));
            chain.settle_deposits_to(&cex);
            cex.set_trading_balance(
                pair.quote_symbol(),
                Decimal::from_f64(dry.cex_trading_token0).unwrap_or_default(),
            );
            cex.set_trading_balance(
                pair.base_symbol(),
                Decimal::from_f64(dry.cex_trading_token1).unwrap_or_default(),
            );
            Some(cex as Arc<dyn clm_venue::CexVenue>)
        } else {
            None
        };

        let manager = PositionManager::new(
            config.manager_config(),
            chain,
            cex,
            Arc::new(LogNotifier),
        )?;
        let engine = TradingEngine::new(manager);

        Ok(Self { config, engine })
    }

    /// Start the engine and run monitoring cycles until Ctrl-C.
    pub async fn run(&self) -> AppResult<()> {
        if !self.engine.is_running() {
            match self.engine.start().await {
                Ok(outcome) => info!(?outcome, "Engine started"),
                Err(err) => {
                    error!(error = %err, "Initial open failed, awaiting next cycle");
                }
            }
        }

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.timing.update_interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = interval.tick() => {
                    match self.engine.update().await {
                        Ok(Outcome::Updated(position)) => {
                            info!(
                                tick = %position.tick_current,
                                price = position.price_current,
                                "Position in range"
                            );
                        }
                        Ok(Outcome::Rebalanced(position)) => {
                            info!(
                                tick_lower = %position.tick_lower,
                                tick_upper = %position.tick_upper,
                                "Position rebalanced"
                            );
                        }
                        Ok(outcome) => info!(?outcome, "Update cycle finished"),
                        Err(err) => warn!(error = %err, "Update cycle failed"),
                    }
                }
            }
        }

        match self.engine.stop().await {
            Ok(outcome) => info!(?outcome, "Engine stopped"),
            Err(err) => error!(error = %err, "Close on shutdown failed"),
        }
        Ok(())
    }
}
