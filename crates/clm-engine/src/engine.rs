//! The trading engine lifecycle wrapper.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use clm_history::LiquidityPosition;
use clm_manager::{ManagerResult, Outcome, ParamsUpdate, PositionManager};

/// Thin start/stop/update wrapper the control plane drives.
///
/// `update` is a no-op while stopped. On construction the engine resumes
/// running when the manager's loaded history ended with an open position.
pub struct TradingEngine {
    manager: PositionManager,
    running: AtomicBool,
}

impl TradingEngine {
    #[must_use]
    pub fn new(manager: PositionManager) -> Self {
        let running = manager.resumed_with_open_position();
        if running {
            info!("Engine resuming in the running state");
        }
        Self {
            manager,
            running: AtomicBool::new(running),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Open a position and mark the engine running.
    pub async fn start(&self) -> ManagerResult<Outcome> {
        let outcome = self.manager.open_position().await?;
        match outcome {
            Outcome::Skipped => {}
            _ => {
                self.running.store(true, Ordering::SeqCst);
                info!("Engine started");
            }
        }
        Ok(outcome)
    }

    /// Close the position and mark the engine stopped.
    pub async fn stop(&self) -> ManagerResult<Outcome> {
        let outcome = self.manager.close_position().await?;
        if outcome != Outcome::Skipped {
            self.running.store(false, Ordering::SeqCst);
            self.manager.shutdown();
            info!("Engine stopped");
        }
        Ok(outcome)
    }

    /// Run one monitoring cycle. Does nothing while stopped.
    pub async fn update(&self) -> ManagerResult<Outcome> {
        if !self.is_running() {
            debug!("Engine stopped, skipping update");
            return Ok(Outcome::Idle);
        }
        self.manager.update_position().await
    }

    /// Apply a runtime parameter update.
    pub async fn update_params(&self, update: ParamsUpdate) -> ManagerResult<Outcome> {
        self.manager.update_params(update).await
    }

    /// The most recent position record.
    pub async fn current_stats(&self) -> Option<LiquidityPosition> {
        self.manager.current_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use clm_core::{TokenAmount, TokenInfo, TokenPair};
    use clm_manager::ManagerConfig;
    use clm_telemetry::RecordingNotifier;
    use clm_venue::SimChainVenue;

    fn pair() -> TokenPair {
        TokenPair::new(
            TokenInfo::new("USDC", "0xusdc", 6),
            TokenInfo::new("WETH", "0xweth", 18).wrapped_native(),
        )
    }

    fn temp_history(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "clm_engine_{name}_{}_{}.json",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        path
    }

    fn setup(name: &str) -> (TradingEngine, Arc<SimChainVenue>, PathBuf) {
        let path = temp_history(name);
        let mut config = ManagerConfig::new(pair(), path.clone());
        config.wallet_address = "0xwallet".to_string();
        config.tick_spacing = 10;
        let chain = Arc::new(SimChainVenue::new(config.pair.clone(), 1000.0));
        chain.set_balances(
            TokenAmount::from_units(2000.0, 6),
            TokenAmount::from_units(2.0, 18),
            TokenAmount::ZERO,
        );
        let manager = PositionManager::new(
            config,
            chain.clone(),
            None,
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();
        (TradingEngine::new(manager), chain, path)
    }

    #[tokio::test]
    async fn test_start_opens_and_marks_running() {
        let (engine, chain, path) = setup("start");
        assert!(!engine.is_running());

        let outcome = engine.start().await.unwrap();
        assert!(matches!(outcome, Outcome::Opened(_)));
        assert!(engine.is_running());
        assert_eq!(chain.counts().mints, 1);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_update_is_noop_while_stopped() {
        let (engine, chain, path) = setup("update_stopped");
        let outcome = engine.update().await.unwrap();
        assert_eq!(outcome, Outcome::Idle);
        assert_eq!(chain.counts().mints, 0);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_stop_closes_and_marks_stopped() {
        let (engine, chain, path) = setup("stop");
        engine.start().await.unwrap();

        let outcome = engine.stop().await.unwrap();
        assert!(matches!(outcome, Outcome::Closed(_)));
        assert!(!engine.is_running());
        assert_eq!(chain.counts().decreases, 1);

        assert_eq!(engine.update().await.unwrap(), Outcome::Idle);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_engine_resumes_running_from_history() {
        let (engine, _chain, path) = setup("resume");
        engine.start().await.unwrap();

        let mut config = ManagerConfig::new(pair(), path.clone());
        config.tick_spacing = 10;
        let chain = Arc::new(SimChainVenue::new(config.pair.clone(), 1000.0));
        let manager = PositionManager::new(
            config,
            chain.clone(),
            None,
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();
        let resumed = TradingEngine::new(manager);
        assert!(resumed.is_running());
        assert!(resumed.current_stats().await.unwrap().is_open);

        std::fs::remove_file(path).ok();
    }
}
