use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Numeric constants
// ---------------------------------------------------------------------------

/// WAD: 1e18 — EVM fixed-point scale for amounts, ETH-denominated account
/// data, and the DAI/ETH feed answer.
pub const WAD: Decimal = dec!(1_000_000_000_000_000_000);

/// WAD as a U256, for on-chain integer arithmetic.
pub const WAD_U256: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Basis point denominator.
pub const BPS_DENOMINATOR: u32 = 10_000;

// ---------------------------------------------------------------------------
// Aave V2 rate modes
// ---------------------------------------------------------------------------

/// Rate mode 1: stable-rate debt.
pub const RATE_MODE_STABLE: u8 = 1;

/// Rate mode 2: variable-rate debt.
pub const RATE_MODE_VARIABLE: u8 = 2;

// ---------------------------------------------------------------------------
// Workflow defaults
// ---------------------------------------------------------------------------

/// Safety discount applied to borrow capacity (0.95).
pub const DEFAULT_BORROW_DISCOUNT_BPS: u32 = 9_500;

/// Over-provision ratio for exact-output swap input (1.005 = 1005/1000).
pub const DEFAULT_OVERPROVISION_NUMERATOR: u32 = 1_005;
pub const DEFAULT_OVERPROVISION_DENOMINATOR: u32 = 1_000;
