pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Load and merge all config JSON files into a single [`BotConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   chain.json
///   workflow.json
/// ```
///
/// # Environment variable overrides
///
/// The following env vars override the corresponding JSON config values:
///
/// | Env Var                  | Config Field                       |
/// |--------------------------|------------------------------------|
/// | `ETH_RPC_URL_HTTP`       | `chain.rpc.http_url`               |
/// | `FUNDING_AMOUNT_WEI`     | `workflow.funding_amount_wei`      |
/// | `SWAP_DEADLINE_SECONDS`  | `workflow.swap_deadline_seconds`   |
pub fn load_config(config_dir: &Path) -> Result<BotConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let chain: ChainConfig =
        serde_json::from_str(&read("chain.json")?).context("parsing chain.json")?;

    let workflow: WorkflowConfig =
        serde_json::from_str(&read("workflow.json")?).context("parsing workflow.json")?;

    let mut config = BotConfig {
        app,
        chain,
        workflow,
    };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect. Parse failures are skipped (the JSON
/// default remains).
fn apply_env_overrides(config: &mut BotConfig) {
    if let Some(val) = env_string("ETH_RPC_URL_HTTP") {
        info!("env override: ETH_RPC_URL_HTTP");
        config.chain.rpc.http_url = val;
    }

    if let Some(val) = env_string("FUNDING_AMOUNT_WEI") {
        info!("env override: FUNDING_AMOUNT_WEI");
        config.workflow.funding_amount_wei = val;
    }

    if let Some(val) = env_parse::<u64>("SWAP_DEADLINE_SECONDS") {
        info!(val, "env override: SWAP_DEADLINE_SECONDS");
        config.workflow.swap_deadline_seconds = val;
    }
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use serial_test::serial;
    use std::path::PathBuf;

    fn project_config_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
    }

    // -----------------------------------------------------------------------
    // Helper: write a minimal set of config JSON files to a temp dir.
    // -----------------------------------------------------------------------

    fn write_test_configs(dir: &Path) {
        std::fs::write(
            dir.join("app.json"),
            r#"{ "logging": { "log_dir": "logs" } }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("chain.json"),
            r#"{
                "chain_id": 1,
                "chain_name": "Ethereum Mainnet",
                "rpc": { "http_url": "https://eth.llamarpc.com" },
                "contracts": {
                    "lending_pool_addresses_provider": "0xB53C1a33016B2DC2fF3653530bfF1848a515c8c5",
                    "borrow_asset_price_feed": "0x773616E4d11A78F511299002da57A0a94577F1f4",
                    "uniswap_v3_factory": "0x1F98431c8aD98523631AE4a59f267346ea31F984",
                    "swap_router": "0xE592427A0AEce92De3Edee1F18E0157C05861564"
                },
                "tokens": {
                    "WETH": { "address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "decimals": 18 },
                    "DAI": { "address": "0x6B175474E89094C44Da98b954EedeAC495271d0F", "decimals": 18 }
                }
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("workflow.json"),
            r#"{
                "funding_amount_wei": "20000000000000000",
                "deposit_divisor": 2,
                "borrow_discount_bps": 9500,
                "overprovision_numerator": 1005,
                "overprovision_denominator": 1000,
                "pool_fee_tier": 3000,
                "swap_deadline_seconds": 600,
                "rate_mode": 1,
                "referral_code": 0,
                "timing": {
                    "confirmation_timeout_seconds": 120,
                    "simulation_timeout_seconds": 15
                }
            }"#,
        )
        .unwrap();
    }

    /// Remove all bot-related env vars so tests don't interfere with each
    /// other.
    fn clean_bot_env() {
        for key in [
            "ETH_RPC_URL_HTTP",
            "FUNDING_AMOUNT_WEI",
            "SWAP_DEADLINE_SECONDS",
            "EXECUTOR_PRIVATE_KEY",
        ] {
            std::env::remove_var(key);
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    #[serial]
    fn test_load_real_configs() {
        clean_bot_env();
        let dir = project_config_dir();
        if !dir.exists() {
            eprintln!("skipping — config dir not found at {}", dir.display());
            return;
        }
        let config = load_config(&dir).expect("config should load and validate");
        assert_eq!(config.chain.chain_id, 1);
        assert_eq!(config.workflow.borrow_discount_bps, 9_500);
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_load_test_configs() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        let config = load_config(tmp.path()).expect("test config should load");
        assert_eq!(config.chain.chain_id, 1);
        assert_eq!(config.workflow.deposit_divisor, 2);
        assert_eq!(
            config.workflow.funding_amount().unwrap(),
            U256::from(20_000_000_000_000_000u64)
        );
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_missing_config_file_errors() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("failed to read config file"),
            "expected file-not-found error, got: {err}"
        );
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_rpc_url() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("ETH_RPC_URL_HTTP", "https://custom-rpc.example.com");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.chain.rpc.http_url, "https://custom-rpc.example.com");
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_funding_amount() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("FUNDING_AMOUNT_WEI", "50000000000000000");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(
            config.workflow.funding_amount().unwrap(),
            U256::from(50_000_000_000_000_000u64)
        );
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_empty_string_ignored() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("SWAP_DEADLINE_SECONDS", "");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.workflow.swap_deadline_seconds, 600);
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_parse_ignored() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("SWAP_DEADLINE_SECONDS", "not_a_number");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.workflow.swap_deadline_seconds, 600);
        clean_bot_env();
    }

    #[test]
    #[serial]
    fn test_invalid_funding_amount_rejected() {
        clean_bot_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("FUNDING_AMOUNT_WEI", "zero point two");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("funding_amount_wei"),
            "expected funding amount error, got: {err}"
        );
        clean_bot_env();
    }
}
