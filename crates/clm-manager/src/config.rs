//! Manager configuration and runtime parameter updates.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use clm_core::{TokenAmount, TokenPair};

/// How position shortfalls are funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgeMode {
    /// Swap directly against the pool; no CEX involvement.
    SingleVenue,
    /// Source shortfalls from the CEX sub-account via the funding saga.
    CexHedged,
}

/// Static and runtime-tunable manager settings.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub pair: TokenPair,
    /// On-chain wallet address, the withdrawal destination.
    pub wallet_address: String,
    /// Range width in percent.
    pub range_percentage: f64,
    /// Target capital in token0 human units.
    pub token0_capital: f64,
    /// Pool fee tier in hundredths of a bip (venue convention).
    pub pool_fee: u32,
    pub pool_address: String,
    pub provider_endpoint: String,
    pub signing_key: String,
    /// Tick spacing of the pool's fee tier.
    pub tick_spacing: i32,
    /// Multiplicative buffer on required amounts, e.g. 1.01 for +1%.
    pub slippage_factor: f64,
    /// Maximum acceptable bid/ask spread on block trades.
    pub max_spread_bps: u32,
    /// Native gas-asset balance never counted as available.
    pub gas_reserve: TokenAmount,
    pub hedge_mode: HedgeMode,
    /// Burn the position token after close.
    pub burn_on_close: bool,
    /// Alternate stable ticker used when the primary pairing has no quotes.
    pub fallback_quote_symbol: Option<String>,
    pub history_path: PathBuf,
    pub deposit_deadline: Duration,
    pub deposit_poll_interval: Duration,
    pub withdrawal_deadline: Duration,
    pub withdrawal_poll_interval: Duration,
    /// Longer horizon for the background withdrawal recovery task.
    pub recovery_deadline: Duration,
    pub recovery_poll_interval: Duration,
    /// Quote negotiation window for a single block-trade request.
    pub quote_deadline: Duration,
}

impl ManagerConfig {
    pub fn new(pair: TokenPair, history_path: impl Into<PathBuf>) -> Self {
        Self {
            pair,
            wallet_address: String::new(),
            range_percentage: 10.0,
            token0_capital: 1000.0,
            pool_fee: 3000,
            pool_address: String::new(),
            provider_endpoint: String::new(),
            signing_key: String::new(),
            tick_spacing: 60,
            slippage_factor: 1.01,
            max_spread_bps: 3,
            gas_reserve: TokenAmount::ZERO,
            hedge_mode: HedgeMode::SingleVenue,
            burn_on_close: false,
            fallback_quote_symbol: Some("USDT".to_string()),
            history_path: history_path.into(),
            deposit_deadline: Duration::from_secs(600),
            deposit_poll_interval: Duration::from_secs(10),
            withdrawal_deadline: Duration::from_secs(900),
            withdrawal_poll_interval: Duration::from_secs(10),
            recovery_deadline: Duration::from_secs(6 * 3600),
            recovery_poll_interval: Duration::from_secs(60),
            quote_deadline: Duration::from_secs(60),
        }
    }
}

/// Runtime parameter update with one field per supported setting.
///
/// The map-based entry point accepts a loose key/value payload from the
/// control plane and warns on every key it does not recognize.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamsUpdate {
    pub range_percentage: Option<f64>,
    pub token0_capital: Option<f64>,
    pub pool_fee: Option<u32>,
    pub pool_address: Option<String>,
    pub wallet_address: Option<String>,
    pub signing_key: Option<String>,
    pub provider_endpoint: Option<String>,
}

impl ParamsUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range_percentage.is_none()
            && self.token0_capital.is_none()
            && self.pool_fee.is_none()
            && self.pool_address.is_none()
            && self.wallet_address.is_none()
            && self.signing_key.is_none()
            && self.provider_endpoint.is_none()
    }

    /// Build an update from a loose key/value map, warning on unknown keys.
    #[must_use]
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut update = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "range_percentage" => update.range_percentage = value.as_f64(),
                "token0_capital" => update.token0_capital = value.as_f64(),
                "pool_fee" => update.pool_fee = value.as_u64().map(|v| v as u32),
                "pool_address" => update.pool_address = value.as_str().map(str::to_string),
                "wallet_address" => update.wallet_address = value.as_str().map(str::to_string),
                "signing_key" => update.signing_key = value.as_str().map(str::to_string),
                "provider_endpoint" => {
                    update.provider_endpoint = value.as_str().map(str::to_string);
                }
                other => warn!(key = other, "Ignoring unknown parameter"),
            }
        }
        update
    }

    pub(crate) fn apply(&self, config: &mut ManagerConfig) {
        if let Some(value) = self.range_percentage {
            info!(range_percentage = value, "Parameter updated");
            config.range_percentage = value;
        }
        if let Some(value) = self.token0_capital {
            info!(token0_capital = value, "Parameter updated");
            config.token0_capital = value;
        }
        if let Some(value) = self.pool_fee {
            info!(pool_fee = value, "Parameter updated");
            config.pool_fee = value;
        }
        if let Some(value) = &self.pool_address {
            info!(pool_address = %value, "Parameter updated");
            config.pool_address = value.clone();
        }
        if let Some(value) = &self.wallet_address {
            info!(wallet_address = %value, "Parameter updated");
            config.wallet_address = value.clone();
        }
        if let Some(value) = &self.signing_key {
            info!("Signing key rotated");
            config.signing_key = value.clone();
        }
        if let Some(value) = &self.provider_endpoint {
            info!(provider_endpoint = %value, "Parameter updated");
            config.provider_endpoint = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clm_core::TokenInfo;

    fn config() -> ManagerConfig {
        let pair = TokenPair::new(
            TokenInfo::new("USDC", "0xusdc", 6),
            TokenInfo::new("WETH", "0xweth", 18).wrapped_native(),
        );
        ManagerConfig::new(pair, "/tmp/history.json")
    }

    #[test]
    fn test_from_map_parses_known_keys() {
        let payload = serde_json::json!({
            "range_percentage": 5.0,
            "token0_capital": 2500.0,
            "pool_fee": 500,
            "unknown_knob": true,
        });
        let map = payload.as_object().unwrap();
        let update = ParamsUpdate::from_map(map);
        assert_eq!(update.range_percentage, Some(5.0));
        assert_eq!(update.token0_capital, Some(2500.0));
        assert_eq!(update.pool_fee, Some(500));
        assert!(update.pool_address.is_none());
    }

    #[test]
    fn test_apply_only_touches_set_fields() {
        let mut cfg = config();
        let update = ParamsUpdate {
            range_percentage: Some(2.5),
            ..ParamsUpdate::default()
        };
        update.apply(&mut cfg);
        assert_eq!(cfg.range_percentage, 2.5);
        assert_eq!(cfg.token0_capital, 1000.0);
    }

    #[test]
    fn test_is_empty() {
        assert!(ParamsUpdate::default().is_empty());
        let update = ParamsUpdate {
            pool_fee: Some(500),
            ..ParamsUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
