//! Application configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use clm_core::{TokenAmount, TokenInfo, TokenPair};
use clm_manager::{HedgeMode, ManagerConfig};

use crate::error::{AppError, AppResult};

/// Pool and token metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    /// Pool address on the venue.
    #[serde(default)]
    pub address: String,
    /// Fee tier in hundredths of a bip.
    #[serde(default = "default_pool_fee")]
    pub fee: u32,
    /// Tick spacing of the fee tier.
    #[serde(default = "default_tick_spacing")]
    pub tick_spacing: i32,
}

fn default_pool_fee() -> u32 {
    3000
}

fn default_tick_spacing() -> i32 {
    60
}

/// Strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Range width in percent.
    #[serde(default = "default_range_percentage")]
    pub range_percentage: f64,
    /// Target capital in token0 human units.
    #[serde(default = "default_token0_capital")]
    pub token0_capital: f64,
    /// Multiplicative buffer on required amounts. Default: 1.01 (+1%).
    #[serde(default = "default_slippage_factor")]
    pub slippage_factor: f64,
    /// Maximum acceptable block-trade spread (bps). Default: 3.
    #[serde(default = "default_max_spread_bps")]
    pub max_spread_bps: u32,
    /// Native gas-asset balance kept in the wallet, human units.
    #[serde(default = "default_gas_reserve")]
    pub gas_reserve: f64,
    #[serde(default = "default_hedge_mode")]
    pub hedge_mode: HedgeMode,
    /// Burn the position token after close. Default: false.
    #[serde(default)]
    pub burn_on_close: bool,
    /// Alternate stable ticker for block-trade rerouting.
    #[serde(default = "default_fallback_quote_symbol")]
    pub fallback_quote_symbol: Option<String>,
}

fn default_range_percentage() -> f64 {
    10.0
}

fn default_token0_capital() -> f64 {
    1000.0
}

fn default_slippage_factor() -> f64 {
    1.01
}

fn default_max_spread_bps() -> u32 {
    3
}

fn default_gas_reserve() -> f64 {
    0.05
}

fn default_hedge_mode() -> HedgeMode {
    HedgeMode::SingleVenue
}

fn default_fallback_quote_symbol() -> Option<String> {
    Some("USDT".to_string())
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            range_percentage: default_range_percentage(),
            token0_capital: default_token0_capital(),
            slippage_factor: default_slippage_factor(),
            max_spread_bps: default_max_spread_bps(),
            gas_reserve: default_gas_reserve(),
            hedge_mode: default_hedge_mode(),
            burn_on_close: false,
            fallback_quote_symbol: default_fallback_quote_symbol(),
        }
    }
}

/// Deadlines and poll cadences, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Interval between monitoring cycles. Default: 60.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    #[serde(default = "default_deposit_deadline_secs")]
    pub deposit_deadline_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub deposit_poll_interval_secs: u64,
    #[serde(default = "default_withdrawal_deadline_secs")]
    pub withdrawal_deadline_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub withdrawal_poll_interval_secs: u64,
    /// Longer horizon for the background withdrawal recovery task.
    #[serde(default = "default_recovery_deadline_secs")]
    pub recovery_deadline_secs: u64,
    #[serde(default = "default_recovery_poll_interval_secs")]
    pub recovery_poll_interval_secs: u64,
    /// Quote negotiation window for one block-trade request.
    #[serde(default = "default_quote_deadline_secs")]
    pub quote_deadline_secs: u64,
}

fn default_update_interval_secs() -> u64 {
    60
}

fn default_deposit_deadline_secs() -> u64 {
    600
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_withdrawal_deadline_secs() -> u64 {
    900
}

fn default_recovery_deadline_secs() -> u64 {
    6 * 3600
}

fn default_recovery_poll_interval_secs() -> u64 {
    60
}

fn default_quote_deadline_secs() -> u64 {
    60
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval_secs(),
            deposit_deadline_secs: default_deposit_deadline_secs(),
            deposit_poll_interval_secs: default_poll_interval_secs(),
            withdrawal_deadline_secs: default_withdrawal_deadline_secs(),
            withdrawal_poll_interval_secs: default_poll_interval_secs(),
            recovery_deadline_secs: default_recovery_deadline_secs(),
            recovery_poll_interval_secs: default_recovery_poll_interval_secs(),
            quote_deadline_secs: default_quote_deadline_secs(),
        }
    }
}

/// Seed balances and prices for the simulated venues.
///
/// The binary runs against simulated venues; real chain and CEX
/// transports plug in behind the venue traits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunConfig {
    #[serde(default = "default_initial_price")]
    pub initial_price: f64,
    #[serde(default = "default_wallet_token0")]
    pub wallet_token0: f64,
    #[serde(default = "default_wallet_token1")]
    pub wallet_token1: f64,
    #[serde(default)]
    pub wallet_native: f64,
    #[serde(default)]
    pub cex_trading_token0: f64,
    #[serde(default)]
    pub cex_trading_token1: f64,
}

fn default_initial_price() -> f64 {
    1000.0
}

fn default_wallet_token0() -> f64 {
    2000.0
}

fn default_wallet_token1() -> f64 {
    2.0
}

impl Default for DryRunConfig {
    fn default() -> Self {
        Self {
            initial_price: default_initial_price(),
            wallet_token0: default_wallet_token0(),
            wallet_token1: default_wallet_token1(),
            wallet_native: 0.0,
            cex_trading_token0: 0.0,
            cex_trading_token1: 0.0,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub pool: PoolConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub dry_run: DryRunConfig,
    /// On-chain wallet address, the withdrawal destination.
    #[serde(default)]
    pub wallet_address: String,
    /// Position history file path.
    #[serde(default = "default_history_path")]
    pub history_path: String,
}

fn default_history_path() -> String {
    "./data/positions.json".to_string()
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load from `CLM_CONFIG` or the default path, falling back to defaults
    /// when neither file exists.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("CLM_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            Err(AppError::Config(format!(
                "config file not found: {config_path}"
            )))
        }
    }

    #[must_use]
    pub fn pair(&self) -> TokenPair {
        TokenPair::new(self.pool.token0.clone(), self.pool.token1.clone())
    }

    /// Build the manager configuration from the loaded sections.
    #[must_use]
    pub fn manager_config(&self) -> ManagerConfig {
        let pair = self.pair();
        let gas_reserve =
            TokenAmount::from_units(self.strategy.gas_reserve, pair.token1.decimals);
        let mut config = ManagerConfig::new(pair, self.history_path.clone());
        config.wallet_address = self.wallet_address.clone();
        config.range_percentage = self.strategy.range_percentage;
        config.token0_capital = self.strategy.token0_capital;
        config.pool_fee = self.pool.fee;
        config.pool_address = self.pool.address.clone();
        config.tick_spacing = self.pool.tick_spacing;
        config.slippage_factor = self.strategy.slippage_factor;
        config.max_spread_bps = self.strategy.max_spread_bps;
        config.gas_reserve = gas_reserve;
        config.hedge_mode = self.strategy.hedge_mode;
        config.burn_on_close = self.strategy.burn_on_close;
        config.fallback_quote_symbol = self.strategy.fallback_quote_symbol.clone();
        config.deposit_deadline = Duration::from_secs(self.timing.deposit_deadline_secs);
        config.deposit_poll_interval =
            Duration::from_secs(self.timing.deposit_poll_interval_secs);
        config.withdrawal_deadline = Duration::from_secs(self.timing.withdrawal_deadline_secs);
        config.withdrawal_poll_interval =
            Duration::from_secs(self.timing.withdrawal_poll_interval_secs);
        config.recovery_deadline = Duration::from_secs(self.timing.recovery_deadline_secs);
        config.recovery_poll_interval =
            Duration::from_secs(self.timing.recovery_poll_interval_secs);
        config.quote_deadline = Duration::from_secs(self.timing.quote_deadline_secs);
        config
    }
}
