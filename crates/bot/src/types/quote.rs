use alloy::primitives::U256;
use std::fmt;

use crate::types::wad::wad_to_decimal;

/// A point-in-time conversion rate from a Chainlink feed.
///
/// `rate` is the raw 18-decimal answer (ETH per unit of the base asset).
/// A quote is treated as stale immediately after use: any later computation
/// that depends on price must fetch a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub base_asset: String,
    pub quote_asset: String,
    /// Feed answer, WAD-scaled.
    pub rate: U256,
    /// Feed `updatedAt` timestamp (unix seconds).
    pub updated_at: u64,
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} = {} (updated_at {})",
            self.base_asset,
            self.quote_asset,
            wad_to_decimal(self.rate),
            self.updated_at
        )
    }
}
