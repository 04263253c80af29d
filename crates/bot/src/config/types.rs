use alloy::primitives::U256;
use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::WorkflowError;

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub app: AppConfig,
    pub chain: ChainConfig,
    pub workflow: WorkflowConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
}

// ---------------------------------------------------------------------------
// chain.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc: RpcConfig,
    pub contracts: ContractsConfig,
    pub tokens: HashMap<String, TokenConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub http_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub lending_pool_addresses_provider: String,
    /// Chainlink feed quoting the borrowed asset in the reference currency
    /// (DAI/ETH on mainnet).
    pub borrow_asset_price_feed: String,
    pub uniswap_v3_factory: String,
    pub swap_router: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub address: String,
    pub decimals: u8,
}

// ---------------------------------------------------------------------------
// workflow.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Native ETH to wrap at the start of a run, in wei, as a decimal string
    /// (wei amounts overflow u64).
    pub funding_amount_wei: String,
    /// Fraction of the wrapped balance to deposit: balance / divisor.
    pub deposit_divisor: u64,
    /// Borrow sizing discount in basis points (9500 = 95% of capacity).
    pub borrow_discount_bps: u32,
    /// Swap input over-provision ratio, numerator / denominator.
    pub overprovision_numerator: u32,
    pub overprovision_denominator: u32,
    /// Uniswap V3 fee tier to resolve the pool at (3000 = 0.3%).
    pub pool_fee_tier: u32,
    /// Swap deadline window from submission time.
    pub swap_deadline_seconds: u64,
    /// Interest rate mode: 1 = stable, 2 = variable.
    pub rate_mode: u8,
    pub referral_code: u16,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    pub confirmation_timeout_seconds: u64,
    pub simulation_timeout_seconds: u64,
}

impl WorkflowConfig {
    /// Parse the funding amount string into a `U256` wei value.
    pub fn funding_amount(&self) -> Result<U256, WorkflowError> {
        self.funding_amount_wei.parse::<U256>().map_err(|e| {
            WorkflowError::Config(format!(
                "funding_amount_wei '{}' is not a valid integer: {e}",
                self.funding_amount_wei
            ))
        })
    }
}
