//! Lending Position Reader - Deposit, Rewards and Lock Status
//!
//! Pure reads off the lending pool. Failures are `ReadError` and never
//! fatal: the dashboard keeps the last known values.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::instrument;

use crate::domain::{LendingError, LendingPosition, LockStatus, TokenAmount};
use crate::ports::chain_client::LendingContract;

/// Reads one account's lending position.
pub struct LendingPositionReader<L: LendingContract> {
  pool: Arc<L>,
}

impl<L: LendingContract> LendingPositionReader<L> {
  pub fn new(pool: Arc<L>) -> Self {
    Self { pool }
  }

  /// Shared handle to the pool the reader queries.
  pub fn pool(&self) -> Arc<L> {
    Arc::clone(&self.pool)
  }

  /// Deposited principal and pending rewards, in deposit-token units.
  #[instrument(skip(self))]
  pub async fn get_lender_info(
    &self,
    account: Address,
    decimals: u8,
  ) -> Result<LendingPosition, LendingError> {
    let info = self.pool.lender_info(account).await?;
    Ok(LendingPosition {
      deposited_amount: TokenAmount::from_raw(info.deposit_amount, decimals),
      pending_rewards: TokenAmount::from_raw(info.pending_rewards, decimals),
    })
  }

  #[instrument(skip(self))]
  pub async fn get_lock_status(&self, account: Address) -> Result<LockStatus, LendingError> {
    let raw = self.pool.lock_status(account).await?;
    Ok(LockStatus::from_chain(
      raw.is_locked,
      raw.lock_end_time,
      raw.time_remaining,
    ))
  }
}
