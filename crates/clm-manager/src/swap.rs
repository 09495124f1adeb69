//! Single-venue funding: one pool swap instead of the CEX saga.

use tracing::{debug, info};

use clm_core::TokenAmount;
use clm_venue::{ChainVenue, TxReceipt};

use crate::config::ManagerConfig;
use crate::error::{ManagerError, ManagerResult};
use crate::funds::FundsSnapshot;

/// Cover a one-sided wallet shortfall by swapping the surplus asset
/// against the pool.
///
/// Returns the swap receipt, or `None` when no swap was needed. Both
/// assets short is `InsufficientFunds`; so is a surplus too small to
/// cover its own requirement plus the shortfall valued at `price`.
pub(crate) async fn rebalance_wallet(
    chain: &dyn ChainVenue,
    config: &ManagerConfig,
    snapshot: &FundsSnapshot,
    price: f64,
) -> ManagerResult<Option<TxReceipt>> {
    let pair = &config.pair;
    let dec0 = pair.token0.decimals;
    let dec1 = pair.token1.decimals;

    let short0 = snapshot.shortfall0();
    let short1 = snapshot.shortfall1();

    if short0.is_zero() && short1.is_zero() {
        debug!("Wallet covers both amounts, no swap needed");
        return Ok(None);
    }
    if !short0.is_zero() && !short1.is_zero() {
        return Err(ManagerError::InsufficientFunds(format!(
            "wallet short {short0} {} and {short1} {}",
            pair.token0.symbol, pair.token1.symbol
        )));
    }

    if !short0.is_zero() {
        // token1 surplus must fund its own requirement plus the token0 gap.
        let cost1 = TokenAmount::from_units(short0.to_units(dec0) / price, dec1);
        if snapshot.available1 < snapshot.required1 + cost1 {
            return Err(ManagerError::InsufficientFunds(format!(
                "{} surplus cannot cover the {} shortfall",
                pair.token1.symbol, pair.token0.symbol
            )));
        }
        info!(
            amount_in = %cost1,
            token_in = %pair.token1.symbol,
            "Swapping to cover the token0 shortfall"
        );
        let receipt = chain
            .swap(pair.token1.address.clone(), pair.token0.address.clone(), cost1)
            .await?;
        return Ok(Some(receipt));
    }

    let cost0 = TokenAmount::from_units(short1.to_units(dec1) * price, dec0);
    if snapshot.available0 < snapshot.required0 + cost0 {
        return Err(ManagerError::InsufficientFunds(format!(
            "{} surplus cannot cover the {} shortfall",
            pair.token0.symbol, pair.token1.symbol
        )));
    }
    info!(
        amount_in = %cost0,
        token_in = %pair.token0.symbol,
        "Swapping to cover the token1 shortfall"
    );
    let receipt = chain
        .swap(pair.token0.address.clone(), pair.token1.address.clone(), cost0)
        .await?;
    Ok(Some(receipt))
}
