//! Ephemeral funds snapshot: required vs. available amounts.

use clm_core::{TokenAmount, TokenPair};
use clm_math::CapitalAllocation;
use clm_venue::WalletBalances;

/// Required and available amounts for one open attempt.
///
/// Recomputed on every decision cycle and never persisted. Required
/// amounts carry the slippage buffer; the native gas reserve is excluded
/// from the available side.
#[derive(Debug, Clone, Copy)]
pub struct FundsSnapshot {
    pub wallet: WalletBalances,
    pub required0: TokenAmount,
    pub required1: TokenAmount,
    pub available0: TokenAmount,
    pub available1: TokenAmount,
}

impl FundsSnapshot {
    #[must_use]
    pub fn compute(
        allocation: &CapitalAllocation,
        wallet: WalletBalances,
        pair: &TokenPair,
        slippage_factor: f64,
        gas_reserve: TokenAmount,
    ) -> Self {
        let required0 =
            TokenAmount::from_units(allocation.amount0 * slippage_factor, pair.token0.decimals);
        let required1 =
            TokenAmount::from_units(allocation.amount1 * slippage_factor, pair.token1.decimals);

        let available0 = wallet.token0;
        let mut available1 = wallet.token1;
        if pair.token1.is_wrapped_native {
            // Spare native counts: it can be wrapped before minting.
            available1 = available1 + wallet.native.saturating_sub(gas_reserve);
        }

        Self {
            wallet,
            required0,
            required1,
            available0,
            available1,
        }
    }

    /// Whether the wallet alone can fund the position.
    #[must_use]
    pub fn covers(&self) -> bool {
        self.available0 >= self.required0 && self.available1 >= self.required1
    }

    #[must_use]
    pub fn shortfall0(&self) -> TokenAmount {
        self.required0.saturating_sub(self.available0)
    }

    #[must_use]
    pub fn shortfall1(&self) -> TokenAmount {
        self.required1.saturating_sub(self.available1)
    }

    /// Balance beyond what the position will consume.
    #[must_use]
    pub fn surplus0(&self) -> TokenAmount {
        self.available0.saturating_sub(self.required0)
    }

    #[must_use]
    pub fn surplus1(&self) -> TokenAmount {
        self.available1.saturating_sub(self.required1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clm_core::TokenInfo;

    fn pair() -> TokenPair {
        TokenPair::new(
            TokenInfo::new("USDC", "0xusdc", 6),
            TokenInfo::new("WETH", "0xweth", 18).wrapped_native(),
        )
    }

    fn wallet(token0: f64, token1: f64, native: f64) -> WalletBalances {
        WalletBalances {
            token0: TokenAmount::from_units(token0, 6),
            token1: TokenAmount::from_units(token1, 18),
            native: TokenAmount::from_units(native, 18),
        }
    }

    #[test]
    fn test_slippage_inflates_required() {
        let alloc = CapitalAllocation::compute(10.0, 1000.0, 1000.0, -12);
        let snapshot =
            FundsSnapshot::compute(&alloc, wallet(0.0, 0.0, 0.0), &pair(), 1.01, TokenAmount::ZERO);
        let raw0 = TokenAmount::from_units(alloc.amount0, 6);
        assert!(snapshot.required0 > raw0);
        assert_eq!(snapshot.shortfall0(), snapshot.required0);
    }

    #[test]
    fn test_gas_reserve_excluded_from_available() {
        let alloc = CapitalAllocation::compute(10.0, 1000.0, 1000.0, -12);
        let reserve = TokenAmount::from_units(0.1, 18);
        let snapshot =
            FundsSnapshot::compute(&alloc, wallet(1000.0, 0.0, 0.5), &pair(), 1.01, reserve);
        assert_eq!(snapshot.available1, TokenAmount::from_units(0.4, 18));
    }

    #[test]
    fn test_covers() {
        let alloc = CapitalAllocation::compute(10.0, 1000.0, 1000.0, -12);
        let snapshot =
            FundsSnapshot::compute(&alloc, wallet(2000.0, 2.0, 0.0), &pair(), 1.01, TokenAmount::ZERO);
        assert!(snapshot.covers());
        assert!(snapshot.shortfall0().is_zero());
        assert!(!snapshot.surplus0().is_zero());
    }
}
