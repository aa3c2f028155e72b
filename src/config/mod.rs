//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml` with an
//! environment override for the RPC endpoint. Contract addresses live
//! here and are handed to the chain adapters at construction - nothing is
//! hardcoded in the domain layer. Secrets (signer key, WalletConnect
//! project ID) are never stored in the file, only the names of the
//! environment variables that carry them.

pub mod loader;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Top-level client configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any chain connection is attempted.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  pub app: AppSection,
  /// RPC endpoint and confirmation policy.
  pub chain: ChainConfig,
  /// Deployed contract addresses.
  pub contracts: ContractConfig,
  /// Wallet session secrets (by env var name).
  #[serde(default)]
  pub wallet: WalletConfig,
  /// Background refresh cadence.
  #[serde(default)]
  pub polling: PollingConfig,
  /// Transaction sequencing policy.
  #[serde(default)]
  pub orchestrator: OrchestratorConfig,
  /// Display-only figures.
  #[serde(default)]
  pub display: DisplayConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable client name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Emit JSON log lines instead of the human format.
  #[serde(default)]
  pub json_logs: bool,
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// JSON-RPC endpoint (overridable with `TUTUM_RPC_URL`).
  pub rpc_url: String,
  /// Expected chain ID; the session refuses any other network.
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// Upper bound on waiting for one confirmation.
  #[serde(default = "default_confirmation_timeout")]
  pub confirmation_timeout_secs: u64,
  /// Interval between receipt polls.
  #[serde(default = "default_receipt_poll_interval")]
  pub receipt_poll_interval_ms: u64,
  /// Fixed gas limit for deposit/withdraw; estimated when absent.
  pub write_gas_limit: Option<u64>,
}

/// Contract addresses.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractConfig {
  /// Lending pool contract.
  pub lending: String,
  /// ERC-20 deposit token.
  pub token: String,
}

impl ContractConfig {
  /// Parsed lending pool address.
  pub fn lending_address(&self) -> Result<Address> {
    self
      .lending
      .parse()
      .with_context(|| format!("Invalid lending contract address: {}", self.lending))
  }

  /// Parsed deposit token address.
  pub fn token_address(&self) -> Result<Address> {
    self
      .token
      .parse()
      .with_context(|| format!("Invalid token contract address: {}", self.token))
  }
}

/// Wallet session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
  /// Env var holding the hex-encoded signer key.
  #[serde(default = "default_private_key_env")]
  pub private_key_env: String,
  /// Env var holding the WalletConnect project identifier.
  #[serde(default = "default_project_id_env")]
  pub project_id_env: String,
}

impl Default for WalletConfig {
  fn default() -> Self {
    Self {
      private_key_env: default_private_key_env(),
      project_id_env: default_project_id_env(),
    }
  }
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
  /// Lock status refresh period.
  #[serde(default = "default_lock_status_interval")]
  pub lock_status_interval_secs: u64,
  /// Also refresh balances and lender info on every tick.
  #[serde(default)]
  pub include_balances: bool,
}

impl Default for PollingConfig {
  fn default() -> Self {
    Self {
      lock_status_interval_secs: default_lock_status_interval(),
      include_balances: false,
    }
  }
}

/// How a deposit behaves when the allowance is short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPolicy {
  /// Approve the exact amount, wait for it, then deposit in one action.
  #[default]
  AutoChain,
  /// Stop with `InsufficientAllowance`; the user approves explicitly.
  Manual,
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrchestratorConfig {
  #[serde(default)]
  pub approval_policy: ApprovalPolicy,
}

/// Display configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
  /// Label printed next to token amounts.
  #[serde(default = "default_token_label")]
  pub token_label: String,
  /// Advertised APY in percent.
  #[serde(default = "default_apy")]
  pub apy_percent: Decimal,
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self {
      token_label: default_token_label(),
      apy_percent: default_apy(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_chain_id() -> u64 {
  97 // BSC testnet
}

fn default_confirmation_timeout() -> u64 {
  120
}

fn default_receipt_poll_interval() -> u64 {
  2_000
}

fn default_private_key_env() -> String {
  "WALLET_PRIVATE_KEY".to_string()
}

fn default_project_id_env() -> String {
  "WALLET_CONNECT_PROJECT_ID".to_string()
}

fn default_lock_status_interval() -> u64 {
  60
}

fn default_token_label() -> String {
  "USDT".to_string()
}

fn default_apy() -> Decimal {
  dec!(19)
}
