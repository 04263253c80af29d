use alloy::primitives::U256;
use std::fmt;

use crate::types::wad::{bps_to_decimal, wad_to_decimal};

/// Snapshot of `LendingPool.getUserAccountData()` — ETH-denominated WAD
/// values (the protocol's reference unit).
///
/// Never cached beyond a single workflow step: every deposit, borrow, and
/// repay changes it, so the orchestrator re-fetches after each confirmed
/// mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Total collateral value, in ETH (WAD).
    pub total_collateral_eth: U256,
    /// Total outstanding debt value, in ETH (WAD).
    pub total_debt_eth: U256,
    /// Remaining borrow capacity, in ETH (WAD).
    pub available_borrow_eth: U256,
    /// Average weighted liquidation threshold, basis points.
    pub liquidation_threshold_bps: U256,
    /// Average weighted loan-to-value, basis points.
    pub ltv_bps: U256,
    /// Health factor (WAD; 1e18 = 1.0).
    pub health_factor: U256,
}

impl Position {
    /// Whether there is any outstanding debt.
    pub fn has_debt(&self) -> bool {
        self.total_debt_eth > U256::ZERO
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collateral={} ETH debt={} ETH available={} ETH ltv={} hf={}",
            wad_to_decimal(self.total_collateral_eth),
            wad_to_decimal(self.total_debt_eth),
            wad_to_decimal(self.available_borrow_eth),
            bps_to_decimal(self.ltv_bps),
            wad_to_decimal(self.health_factor),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Position {
        Position {
            total_collateral_eth: U256::from(10_000_000_000_000_000u128), // 0.01 ETH
            total_debt_eth: U256::ZERO,
            available_borrow_eth: U256::from(7_500_000_000_000_000u128),
            liquidation_threshold_bps: U256::from(8_000u64),
            ltv_bps: U256::from(7_500u64),
            health_factor: U256::MAX,
        }
    }

    #[test]
    fn no_debt_after_deposit_only() {
        assert!(!sample().has_debt());
    }

    #[test]
    fn debt_detected() {
        let mut pos = sample();
        pos.total_debt_eth = U256::from(1u64);
        assert!(pos.has_debt());
    }

    #[test]
    fn display_renders_decimals() {
        let rendered = sample().to_string();
        assert!(rendered.contains("collateral=0.01 ETH"), "{rendered}");
        assert!(rendered.contains("ltv=0.75"), "{rendered}");
    }
}
