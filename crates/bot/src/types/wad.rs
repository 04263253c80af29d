//! WAD / basis-point display conversions.
//!
//! All amount computation stays in integer `U256`; these helpers convert
//! on-chain fixed-point values to `Decimal` for logging and reporting only.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::constants::WAD;

/// Convert a WAD-scaled (1e18) on-chain value to `Decimal`.
pub fn wad_to_decimal(raw: U256) -> Decimal {
    let raw_dec = Decimal::from_str(&raw.to_string()).unwrap_or_default();
    raw_dec / WAD
}

/// Convert basis points to a fraction `Decimal`.
pub fn bps_to_decimal(bps: U256) -> Decimal {
    let raw_dec = Decimal::from_str(&bps.to_string()).unwrap_or_default();
    raw_dec / dec!(10_000)
}
