//! Chain Client Ports - Lending Pool and Token Contract Interfaces
//!
//! Defines the traits the use-case layer needs from the chain: typed reads
//! off the lending pool and its deposit token, the three state-changing
//! calls, and confirmation tracking. Adapters implement these over
//! alloy-rs; tests implement them with mockall.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::domain::LendingError;

/// Raw lender record as returned by `getLenderInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenderInfoRaw {
  /// Deposited principal in token base units.
  pub deposit_amount: U256,
  /// Accrued rewards in token base units.
  pub pending_rewards: U256,
}

/// Raw lock record as returned by `getLockStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatusRaw {
  pub is_locked: bool,
  /// Unix seconds; zero when no deposit was ever made.
  pub lock_end_time: u64,
  /// Seconds until unlock.
  pub time_remaining: u64,
}

/// Receipt summary for a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
  pub tx_hash: TxHash,
  pub block_number: Option<u64>,
  pub gas_used: u64,
}

/// ERC-20 deposit token.
#[async_trait]
pub trait TokenContract: Send + Sync + 'static {
  /// Token contract address.
  fn address(&self) -> Address;

  /// Authoritative on-chain precision.
  async fn decimals(&self) -> Result<u8, LendingError>;

  async fn balance_of(&self, account: Address) -> Result<U256, LendingError>;

  async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, LendingError>;

  /// Broadcast `approve(spender, amount)`. Returns once the node accepts it.
  async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, LendingError>;
}

/// Deployed lending pool.
#[async_trait]
pub trait LendingContract: Send + Sync + 'static {
  /// Lending pool address (the token spender).
  fn address(&self) -> Address;

  async fn lender_info(&self, account: Address) -> Result<LenderInfoRaw, LendingError>;

  async fn lock_status(&self, account: Address) -> Result<LockStatusRaw, LendingError>;

  /// Broadcast `deposit(amount)`.
  async fn deposit(&self, amount: U256) -> Result<TxHash, LendingError>;

  /// Broadcast `withdraw(amount)`.
  async fn withdraw(&self, amount: U256) -> Result<TxHash, LendingError>;
}

/// Waits for a broadcast transaction to be mined.
#[async_trait]
pub trait TxConfirmer: Send + Sync + 'static {
  /// Resolve after one confirmation.
  ///
  /// # Errors
  /// `TransactionFailed` when the receipt reports a revert, `Timeout` when
  /// the poll budget runs out.
  async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, LendingError>;
}
