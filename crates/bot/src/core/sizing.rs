//! Pure amount-sizing arithmetic.
//!
//! All computation is integer `U256` fixed-point: given identical inputs the
//! results are bit-identical across runs, which the workflow relies on when
//! it converts ETH-denominated account data into token amounts.
//!
//! Rates are 18-decimal (WAD) feed answers expressed as ETH per unit of the
//! borrowed asset; ETH-denominated values are WAD-scaled wei.

use alloy::primitives::U256;

use crate::constants::{BPS_DENOMINATOR, WAD_U256};

/// Size a borrow from fresh borrow capacity.
///
/// `floor(available * discount_bps * WAD / (10_000 * rate))`, in the
/// borrowed asset's native units. The discount (observed 0.95) keeps the
/// position away from its loan-to-value ceiling. A single flooring division
/// keeps the result equal to the reference computation
/// `floor(available * d / rate)`.
///
/// Returns zero when `rate` is zero (callers reject such quotes earlier).
pub fn borrow_amount_from_capacity(
    available_borrow_eth: U256,
    rate: U256,
    discount_bps: u32,
) -> U256 {
    if rate.is_zero() {
        return U256::ZERO;
    }
    let numerator = available_borrow_eth * U256::from(discount_bps) * WAD_U256;
    let denominator = U256::from(BPS_DENOMINATOR) * rate;
    numerator / denominator
}

/// Convert an ETH-denominated debt value to the borrowed asset's native
/// units: `floor(total_debt * WAD / rate)`.
pub fn debt_in_borrow_asset(total_debt_eth: U256, rate: U256) -> U256 {
    if rate.is_zero() {
        return U256::ZERO;
    }
    total_debt_eth * WAD_U256 / rate
}

/// Over-provision a swap input amount to absorb price drift between quote
/// and execution: exactly `floor(base * numerator / denominator)`
/// (observed ratio 1005/1000 = 1.005).
pub fn overprovision(base: U256, numerator: u32, denominator: u32) -> U256 {
    base * U256::from(numerator) / U256::from(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        DEFAULT_BORROW_DISCOUNT_BPS, DEFAULT_OVERPROVISION_DENOMINATOR,
        DEFAULT_OVERPROVISION_NUMERATOR,
    };
    use proptest::prelude::*;

    /// 0.0005 ETH per DAI as a WAD rate.
    const RATE_0_0005: u128 = 500_000_000_000_000;
    /// 0.0004 ETH per DAI as a WAD rate.
    const RATE_0_0004: u128 = 400_000_000_000_000;

    // -----------------------------------------------------------------------
    // Reference scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn borrow_capacity_reference_scenario() {
        // available = 1000 reference units, discount 0.95, rate 0.0005
        // → 1000 * 0.95 / 0.0005 = 1,900,000 borrowed-asset units.
        let amount = borrow_amount_from_capacity(
            U256::from(1_000u64),
            U256::from(RATE_0_0005),
            DEFAULT_BORROW_DISCOUNT_BPS,
        );
        assert_eq!(amount, U256::from(1_900_000u64));
    }

    #[test]
    fn debt_conversion_reference_scenario() {
        // debt = 10 reference units, rate 0.0004 → 25,000 borrowed-asset units.
        let amount = debt_in_borrow_asset(U256::from(10u64), U256::from(RATE_0_0004));
        assert_eq!(amount, U256::from(25_000u64));
    }

    #[test]
    fn overprovision_reference_scenario() {
        assert_eq!(
            overprovision(
                U256::from(1_000u64),
                DEFAULT_OVERPROVISION_NUMERATOR,
                DEFAULT_OVERPROVISION_DENOMINATOR
            ),
            U256::from(1_005u64)
        );
    }

    #[test]
    fn zero_rate_returns_zero() {
        assert_eq!(
            borrow_amount_from_capacity(U256::from(1_000u64), U256::ZERO, 9_500),
            U256::ZERO
        );
        assert_eq!(debt_in_borrow_asset(U256::from(10u64), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn full_discount_is_identity_conversion() {
        // d = 1.0 → borrow amount equals the plain unit conversion.
        let available = U256::from(777u64);
        let rate = U256::from(RATE_0_0005);
        assert_eq!(
            borrow_amount_from_capacity(available, rate, 10_000),
            debt_in_borrow_asset(available, rate)
        );
    }

    #[test]
    fn repeated_computation_is_bit_identical() {
        let available = U256::from(123_456_789_012_345_678u128);
        let rate = U256::from(RATE_0_0004);
        let first = borrow_amount_from_capacity(available, rate, 9_500);
        for _ in 0..10 {
            assert_eq!(borrow_amount_from_capacity(available, rate, 9_500), first);
        }
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn borrow_amount_monotone_in_capacity(
            a in 0u128..1_000_000_000_000_000_000,
            b in 0u128..1_000_000_000_000_000_000,
            rate in 1u128..1_000_000_000_000_000_000,
            discount_bps in 1u32..=10_000,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_amt = borrow_amount_from_capacity(
                U256::from(lo), U256::from(rate), discount_bps);
            let hi_amt = borrow_amount_from_capacity(
                U256::from(hi), U256::from(rate), discount_bps);
            prop_assert!(lo_amt <= hi_amt);
        }

        #[test]
        fn borrow_amount_monotone_in_inverse_rate(
            available in 0u128..1_000_000_000_000_000_000,
            r1 in 1u128..1_000_000_000_000_000_000,
            r2 in 1u128..1_000_000_000_000_000_000,
            discount_bps in 1u32..=10_000,
        ) {
            let (lo_rate, hi_rate) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
            // Lower rate → more borrowed-asset units per reference unit.
            let at_lo_rate = borrow_amount_from_capacity(
                U256::from(available), U256::from(lo_rate), discount_bps);
            let at_hi_rate = borrow_amount_from_capacity(
                U256::from(available), U256::from(hi_rate), discount_bps);
            prop_assert!(at_lo_rate >= at_hi_rate);
        }

        #[test]
        fn borrow_amount_matches_reference_fixed_point(
            available in 0u128..1_000_000_000_000_000_000,
            rate in 1u128..1_000_000_000_000_000_000,
        ) {
            // floor(V * 9500 * WAD / (10000 * r)) computed independently
            // over u128-widened big integers.
            let expected = (available as u128)
                .checked_mul(9_500)
                .map(U256::from)
                .unwrap()
                * U256::from(1_000_000_000_000_000_000u128)
                / (U256::from(10_000u64) * U256::from(rate));
            prop_assert_eq!(
                borrow_amount_from_capacity(U256::from(available), U256::from(rate), 9_500),
                expected
            );
        }

        #[test]
        fn overprovision_exact_floor(base in 0u128..u128::MAX / 2_000) {
            // amountInMaximum = floor(base * 1005 / 1000), exactly.
            let expected = U256::from(base * 1_005 / 1_000);
            prop_assert_eq!(
                overprovision(U256::from(base), 1_005, 1_000),
                expected
            );
        }

        #[test]
        fn overprovision_covers_drift_band(base in 1u128..u128::MAX / 2_000) {
            // Any adverse move of at most 0.5% still fits under the bound.
            let bound = overprovision(U256::from(base), 1_005, 1_000);
            prop_assert!(bound >= U256::from(base));
            prop_assert!(bound >= U256::from(base) * U256::from(1_005u64) / U256::from(1_000u64));
        }
    }
}
