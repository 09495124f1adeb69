//! Background withdrawal recovery.
//!
//! Spawned when a withdrawal poll times out: keeps polling the wallet on
//! its own longer horizon and, once a balance increase lands, re-enters
//! `open_position` exactly once, as a fresh caller subject to the same
//! lock. A superseding foreground operation or shutdown cancels it.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use clm_venue::WalletBalances;

use crate::manager::{Outcome, PositionManager};

pub(crate) async fn run(
    manager: PositionManager,
    token: CancellationToken,
    baseline: WalletBalances,
    deadline: Duration,
    poll: Duration,
) {
    let started = Instant::now();
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Withdrawal recovery cancelled");
                return;
            }
            _ = sleep(poll) => {}
        }
        if started.elapsed() >= deadline {
            warn!("Withdrawal recovery gave up, funds never arrived");
            manager.notify("Withdrawal recovery gave up, funds never arrived");
            return;
        }
        let balances = match manager.chain().get_token_balances().await {
            Ok(balances) => balances,
            Err(err) => {
                warn!(error = %err, "Balance poll failed during recovery");
                continue;
            }
        };
        let arrived = balances.token0 > baseline.token0
            || balances.token1 > baseline.token1
            || balances.native > baseline.native;
        if !arrived {
            continue;
        }

        info!("Withdrawn funds arrived, resuming position open");
        match manager.open_position().await {
            Ok(Outcome::Opened(position)) => {
                info!(token_id = ?position.token_id, "Recovery open succeeded");
            }
            Ok(outcome) => {
                debug!(?outcome, "Recovery open resolved without minting");
            }
            Err(err) => {
                warn!(error = %err, "Recovery open failed");
                manager.notify(&format!("Recovery open failed: {err}"));
            }
        }
        return;
    }
}
