//! Token metadata for a pool.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single pool token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Ticker symbol, e.g. "USDC".
    pub symbol: String,
    /// On-chain contract address (opaque to the core).
    pub address: String,
    /// Decimal places of the smallest unit.
    pub decimals: u32,
    /// Whether this token is the wrapped form of the chain's gas asset.
    #[serde(default)]
    pub is_wrapped_native: bool,
}

impl TokenInfo {
    pub fn new(symbol: &str, address: &str, decimals: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            address: address.to_string(),
            decimals,
            is_wrapped_native: false,
        }
    }

    /// Mark this token as the wrapped native gas asset.
    #[must_use]
    pub fn wrapped_native(mut self) -> Self {
        self.is_wrapped_native = true;
        self
    }
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// The two tokens of a pool, in the venue's canonical ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token0: TokenInfo,
    pub token1: TokenInfo,
}

impl TokenPair {
    pub fn new(token0: TokenInfo, token1: TokenInfo) -> Self {
        Self { token0, token1 }
    }

    /// `token0.decimals - token1.decimals`, the adjustment used by the
    /// fixed-point price conversions.
    #[inline]
    #[must_use]
    pub fn decimal_diff(&self) -> i32 {
        self.token0.decimals as i32 - self.token1.decimals as i32
    }

    /// CEX spot symbol for the pair, base first, e.g. "ETH-USDC".
    ///
    /// The volatile asset (token1 in the USDC/WETH convention) is the base.
    #[must_use]
    pub fn cex_symbol(&self) -> String {
        format!("{}-{}", self.base_symbol(), self.quote_symbol())
    }

    /// Symbol of the asset the capital target is denominated in (token0).
    #[must_use]
    pub fn quote_symbol(&self) -> &str {
        &self.token0.symbol
    }

    /// Symbol of the other asset (token1).
    #[must_use]
    pub fn base_symbol(&self) -> &str {
        // CEX venues list the wrapped native under its unwrapped ticker.
        match self.token1.symbol.strip_prefix('W') {
            Some(stripped) if self.token1.is_wrapped_native => stripped,
            _ => &self.token1.symbol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc_weth() -> TokenPair {
        TokenPair::new(
            TokenInfo::new("USDC", "0xa0b8", 6),
            TokenInfo::new("WETH", "0xc02a", 18).wrapped_native(),
        )
    }

    #[test]
    fn test_decimal_diff() {
        assert_eq!(usdc_weth().decimal_diff(), -12);
    }

    #[test]
    fn test_cex_symbol_unwraps_native() {
        assert_eq!(usdc_weth().cex_symbol(), "ETH-USDC");
    }

    #[test]
    fn test_cex_symbol_plain_token() {
        let pair = TokenPair::new(
            TokenInfo::new("USDC", "0xa0b8", 6),
            TokenInfo::new("WBTC", "0x2260", 8),
        );
        // Not flagged as wrapped native, so the symbol is kept as-is.
        assert_eq!(pair.cex_symbol(), "WBTC-USDC");
    }
}
