use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::RootProvider;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use tracing::info;

use unwind_bot::config;
use unwind_bot::core::workflow::WorkflowOrchestrator;
use unwind_bot::execution::allowance::AllowanceManager;
use unwind_bot::execution::lending::LendingClient;
use unwind_bot::execution::price_feed::PriceFeedClient;
use unwind_bot::execution::swap::SwapExecutor;
use unwind_bot::execution::tx_submitter::TxSubmitter;
use unwind_bot::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    // Determine config directory — default to `./config`.
    let config_dir = std::env::var("BOT_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    // Load and validate configuration.
    let config = config::load_config(&config_dir)?;

    // Initialize tracing — hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        chain_id = config.chain.chain_id,
        chain_name = %config.chain.chain_name,
        "unwind bot starting"
    );

    // -----------------------------------------------------------------------
    // Signer and addresses
    // -----------------------------------------------------------------------

    let signer = init_signer()?;
    let user = signer.address();

    let contracts = &config.chain.contracts;
    let addresses_provider: Address = contracts
        .lending_pool_addresses_provider
        .parse()
        .context("failed to parse lending_pool_addresses_provider address")?;
    let price_feed: Address = contracts
        .borrow_asset_price_feed
        .parse()
        .context("failed to parse borrow_asset_price_feed address")?;
    let factory: Address = contracts
        .uniswap_v3_factory
        .parse()
        .context("failed to parse uniswap_v3_factory address")?;
    let router: Address = contracts
        .swap_router
        .parse()
        .context("failed to parse swap_router address")?;

    let weth: Address = config
        .chain
        .tokens
        .get("WETH")
        .context("chain.tokens is missing WETH")?
        .address
        .parse()
        .context("failed to parse WETH address")?;
    let dai: Address = config
        .chain
        .tokens
        .get("DAI")
        .context("chain.tokens is missing DAI")?
        .address
        .parse()
        .context("failed to parse DAI address")?;

    info!(user = %user, "addresses initialized");

    // -----------------------------------------------------------------------
    // Blockchain provider
    // -----------------------------------------------------------------------

    let rpc_url: Url = config
        .chain
        .rpc
        .http_url
        .parse()
        .context("failed to parse RPC URL")?;
    let provider = RootProvider::new_http(rpc_url);

    // -----------------------------------------------------------------------
    // Component construction (dependency injection order)
    // -----------------------------------------------------------------------

    let tx_submitter = Arc::new(TxSubmitter::new(
        provider.clone(),
        signer,
        &config.workflow.timing,
        config.chain.chain_id,
    ));

    let lending = LendingClient::discover(
        provider.clone(),
        addresses_provider,
        tx_submitter.clone(),
        user,
        config.workflow.rate_mode,
        config.workflow.referral_code,
    )
    .await
    .context("failed to resolve lending pool")?;

    let feed = PriceFeedClient::new(provider.clone(), price_feed, "DAI", "ETH");

    let swap = SwapExecutor::new(provider.clone(), factory, router, tx_submitter.clone());

    let allowance = AllowanceManager::new(tx_submitter.clone(), user);

    let orchestrator = WorkflowOrchestrator::new(
        lending,
        swap,
        feed,
        allowance,
        tx_submitter,
        provider,
        user,
        weth,
        dai,
        config.workflow.clone(),
    );

    info!("all components initialized — starting workflow");

    orchestrator.run().await.context("workflow aborted")?;

    info!("workflow finished");
    Ok(())
}

// ---------------------------------------------------------------------------
// Initialization helpers
// ---------------------------------------------------------------------------

/// Initialize the transaction signer from `EXECUTOR_PRIVATE_KEY`.
fn init_signer() -> Result<PrivateKeySigner> {
    let key = std::env::var("EXECUTOR_PRIVATE_KEY")
        .ok()
        .filter(|v| !v.is_empty())
        .context("EXECUTOR_PRIVATE_KEY is required")?;
    let key = key.strip_prefix("0x").unwrap_or(&key);
    key.parse::<PrivateKeySigner>()
        .context("failed to parse EXECUTOR_PRIVATE_KEY")
}
