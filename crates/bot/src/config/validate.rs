use alloy::primitives::U256;
use anyhow::{bail, Result};

use super::types::BotConfig;
use crate::constants::{RATE_MODE_STABLE, RATE_MODE_VARIABLE};

/// Uniswap V3 fee tiers that exist on mainnet, in hundredths of a bip.
const KNOWN_FEE_TIERS: [u32; 4] = [100, 500, 3_000, 10_000];

/// Validate invariants across the merged config that serde alone cannot
/// enforce. Called automatically by [`super::load_config`].
pub fn validate_config(config: &BotConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_chain_config(config, &mut errors);
    validate_workflow_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

// ---------------------------------------------------------------------------
// Chain config
// ---------------------------------------------------------------------------

fn validate_chain_config(config: &BotConfig, errors: &mut Vec<String>) {
    let chain = &config.chain;

    if chain.chain_id != 1 {
        errors.push(format!(
            "chain: only Ethereum mainnet (chain_id=1) is supported, got {}",
            chain.chain_id
        ));
    }

    if chain.rpc.http_url.is_empty() {
        errors.push("chain.rpc: http_url is empty".into());
    }

    let contract_addrs = [
        (
            "lending_pool_addresses_provider",
            &chain.contracts.lending_pool_addresses_provider,
        ),
        (
            "borrow_asset_price_feed",
            &chain.contracts.borrow_asset_price_feed,
        ),
        ("uniswap_v3_factory", &chain.contracts.uniswap_v3_factory),
        ("swap_router", &chain.contracts.swap_router),
    ];

    for (name, addr) in &contract_addrs {
        if let Err(e) = validate_address(addr) {
            errors.push(format!("chain.contracts.{name}: {e}"));
        }
    }

    // The workflow is hard-wired to a wrapped-native collateral and a stable
    // borrow asset; both must be present.
    for required in ["WETH", "DAI"] {
        if !chain.tokens.contains_key(required) {
            errors.push(format!("chain.tokens: missing required token {required}"));
        }
    }

    for (name, token) in &chain.tokens {
        if let Err(e) = validate_address(&token.address) {
            errors.push(format!("chain.tokens.{name}.address: {e}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow config
// ---------------------------------------------------------------------------

fn validate_workflow_config(config: &BotConfig, errors: &mut Vec<String>) {
    let wf = &config.workflow;

    match wf.funding_amount() {
        Ok(amount) if amount == U256::ZERO => {
            errors.push("workflow: funding_amount_wei must be > 0".into());
        }
        Ok(_) => {}
        Err(e) => errors.push(format!("workflow: {e}")),
    }

    if wf.deposit_divisor == 0 {
        errors.push("workflow: deposit_divisor must be >= 1".into());
    }

    if wf.borrow_discount_bps == 0 || wf.borrow_discount_bps > 10_000 {
        errors.push(format!(
            "workflow: borrow_discount_bps ({}) must be in (0, 10000]",
            wf.borrow_discount_bps
        ));
    }

    if wf.overprovision_denominator == 0 {
        errors.push("workflow: overprovision_denominator must be > 0".into());
    } else if wf.overprovision_numerator < wf.overprovision_denominator {
        errors.push(format!(
            "workflow: overprovision ratio {}/{} must be >= 1",
            wf.overprovision_numerator, wf.overprovision_denominator
        ));
    }

    if !KNOWN_FEE_TIERS.contains(&wf.pool_fee_tier) {
        errors.push(format!(
            "workflow: pool_fee_tier ({}) is not one of {:?}",
            wf.pool_fee_tier, KNOWN_FEE_TIERS
        ));
    }

    if wf.swap_deadline_seconds == 0 {
        errors.push("workflow: swap_deadline_seconds must be > 0".into());
    }

    if wf.rate_mode != RATE_MODE_STABLE && wf.rate_mode != RATE_MODE_VARIABLE {
        errors.push(format!(
            "workflow: rate_mode ({}) must be 1 (stable) or 2 (variable)",
            wf.rate_mode
        ));
    }

    if wf.timing.confirmation_timeout_seconds == 0 {
        errors.push("workflow.timing: confirmation_timeout_seconds must be > 0".into());
    }
    if wf.timing.simulation_timeout_seconds == 0 {
        errors.push("workflow.timing: simulation_timeout_seconds must be > 0".into());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate an Ethereum-style address string: must be 0x-prefixed and 42
/// chars of hex.
fn validate_address(addr: &str) -> Result<(), String> {
    if addr.is_empty() {
        return Err("address is empty".into());
    }
    if !addr.starts_with("0x") && !addr.starts_with("0X") {
        return Err(format!("address '{addr}' must start with 0x"));
    }
    if addr.len() != 42 {
        return Err(format!(
            "address '{addr}' has length {} (expected 42)",
            addr.len()
        ));
    }
    if !addr[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("address '{addr}' contains non-hex characters"));
    }
    Ok(())
}
