//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, applying environment overrides,
//! validating all parameters, and providing clear error messages for
//! misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Environment variable that replaces `chain.rpc_url`.
pub const RPC_URL_ENV: &str = "TUTUM_RPC_URL";

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config = parse_config(&content)?;
  apply_env_overrides(&mut config, std::env::var(RPC_URL_ENV).ok());
  validate_config(&config)?;

  info!(
    chain_id = config.chain.chain_id,
    lending = %config.contracts.lending,
    token = %config.contracts.token,
    policy = ?config.orchestrator.approval_policy,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse TOML content without touching the environment.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).with_context(|| "Failed to parse config.toml")
}

/// Apply environment overrides on top of the file values.
pub fn apply_env_overrides(config: &mut AppConfig, rpc_url: Option<String>) {
  if let Some(url) = rpc_url.filter(|u| !u.trim().is_empty()) {
    config.chain.rpc_url = url;
  }
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty RPC endpoint
/// - Well-formed, distinct contract addresses
/// - Positive timeouts and intervals
/// - A poll interval shorter than the confirmation timeout
pub fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.chain.rpc_url.trim().is_empty(),
    "chain.rpc_url must not be empty"
  );
  anyhow::ensure!(config.chain.chain_id > 0, "chain.chain_id must be positive");

  let lending = config.contracts.lending_address()?;
  let token = config.contracts.token_address()?;
  anyhow::ensure!(
    lending != token,
    "Lending and token contracts must be different addresses"
  );

  anyhow::ensure!(
    config.chain.confirmation_timeout_secs > 0,
    "chain.confirmation_timeout_secs must be positive"
  );
  anyhow::ensure!(
    config.chain.receipt_poll_interval_ms > 0,
    "chain.receipt_poll_interval_ms must be positive"
  );
  anyhow::ensure!(
    config.chain.receipt_poll_interval_ms < config.chain.confirmation_timeout_secs * 1_000,
    "chain.receipt_poll_interval_ms ({}) must be shorter than the confirmation timeout ({}s)",
    config.chain.receipt_poll_interval_ms,
    config.chain.confirmation_timeout_secs
  );
  if let Some(limit) = config.chain.write_gas_limit {
    anyhow::ensure!(limit >= 21_000, "chain.write_gas_limit {limit} is below 21000");
  }

  anyhow::ensure!(
    config.polling.lock_status_interval_secs > 0,
    "polling.lock_status_interval_secs must be positive"
  );

  anyhow::ensure!(
    !config.wallet.private_key_env.is_empty(),
    "wallet.private_key_env must name an environment variable"
  );
  anyhow::ensure!(
    config.display.apy_percent >= rust_decimal::Decimal::ZERO,
    "display.apy_percent must not be negative"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ApprovalPolicy;

  const MINIMAL: &str = r#"
[app]
name = "tutum-test"

[chain]
rpc_url = "https://data-seed-prebsc-1-s1.binance.org:8545"

[contracts]
lending = "0x1111111111111111111111111111111111111111"
token = "0x337610d27c682E347C9cD60BD4b3b107C9d34dDd"
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_defaults() {
    let config = parse_config(MINIMAL).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.chain.chain_id, 97);
    assert_eq!(config.chain.confirmation_timeout_secs, 120);
    assert_eq!(config.polling.lock_status_interval_secs, 60);
    assert!(!config.polling.include_balances);
    assert_eq!(config.orchestrator.approval_policy, ApprovalPolicy::AutoChain);
    assert_eq!(config.wallet.private_key_env, "WALLET_PRIVATE_KEY");
    assert_eq!(config.display.token_label, "USDT");
    assert!(config.chain.write_gas_limit.is_none());
  }

  #[test]
  fn test_manual_policy_and_gas_limit() {
    let content = format!(
      "{MINIMAL}\n[orchestrator]\napproval_policy = \"manual\"\n"
    )
    .replace("[contracts]", "write_gas_limit = 300000\n\n[contracts]");
    let config = parse_config(&content).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.orchestrator.approval_policy, ApprovalPolicy::Manual);
    assert_eq!(config.chain.write_gas_limit, Some(300_000));
  }

  #[test]
  fn test_rejects_bad_address() {
    let content = MINIMAL.replace("0x1111111111111111111111111111111111111111", "0x1234");
    let config = parse_config(&content).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_same_lending_and_token() {
    let content = MINIMAL.replace(
      "0x1111111111111111111111111111111111111111",
      "0x337610d27c682E347C9cD60BD4b3b107C9d34dDd",
    );
    let config = parse_config(&content).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_env_override_replaces_rpc_url() {
    let mut config = parse_config(MINIMAL).unwrap();
    apply_env_overrides(&mut config, Some("http://localhost:8545".into()));
    assert_eq!(config.chain.rpc_url, "http://localhost:8545");

    apply_env_overrides(&mut config, Some("  ".into()));
    assert_eq!(config.chain.rpc_url, "http://localhost:8545");
  }
}
