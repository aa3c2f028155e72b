//! Token Allowance Tracker - Balance, Allowance and Approvals
//!
//! Reads the deposit token's balance and the lending pool's spend
//! allowance for the connected account, and submits exact-amount
//! approvals. Every amount is parsed and formatted with the decimals read
//! from the token contract, cached once per session.

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::domain::amount::MAX_DECIMALS;
use crate::domain::{LendingError, PendingTransaction, TokenAmount, TokenPosition, TxKind};
use crate::ports::chain_client::TokenContract;

use super::confirmation::ConfirmationWaiter;

/// Tracks one account's position in the deposit token.
pub struct TokenAllowanceTracker<T: TokenContract> {
  token: Arc<T>,
  /// Authoritative precision, read on first use.
  decimals: OnceCell<u8>,
}

impl<T: TokenContract> TokenAllowanceTracker<T> {
  pub fn new(token: Arc<T>) -> Self {
    Self {
      token,
      decimals: OnceCell::new(),
    }
  }

  /// Token decimals from the contract (cached after the first read).
  pub async fn decimals(&self) -> Result<u8, LendingError> {
    let decimals = self
      .decimals
      .get_or_try_init(|| async {
        let decimals = self.token.decimals().await?;
        if decimals > MAX_DECIMALS {
          return Err(LendingError::Config(format!(
            "token reports {decimals} decimals, more than {MAX_DECIMALS} supported"
          )));
        }
        info!(token = %self.token.address(), decimals, "Token precision loaded");
        Ok(decimals)
      })
      .await?;
    Ok(*decimals)
  }

  /// Parse user input as a positive amount at the token's precision.
  pub async fn parse_amount(&self, input: &str) -> Result<TokenAmount, LendingError> {
    let decimals = self.decimals().await?;
    Ok(TokenAmount::parse_positive(input, decimals)?)
  }

  #[instrument(skip(self))]
  pub async fn get_balance(&self, account: Address) -> Result<TokenAmount, LendingError> {
    let decimals = self.decimals().await?;
    let raw = self.token.balance_of(account).await?;
    Ok(TokenAmount::from_raw(raw, decimals))
  }

  #[instrument(skip(self))]
  pub async fn get_allowance(
    &self,
    account: Address,
    spender: Address,
  ) -> Result<TokenAmount, LendingError> {
    let decimals = self.decimals().await?;
    let raw = self.token.allowance(account, spender).await?;
    Ok(TokenAmount::from_raw(raw, decimals))
  }

  /// Balance and allowance together.
  pub async fn get_position(
    &self,
    account: Address,
    spender: Address,
  ) -> Result<TokenPosition, LendingError> {
    let (balance, allowance) = tokio::try_join!(
      self.get_balance(account),
      self.get_allowance(account, spender)
    )?;
    Ok(TokenPosition { balance, allowance })
  }

  /// Broadcast an approval for exactly `amount`, replacing any prior
  /// allowance. Returns as soon as the node accepts it.
  #[instrument(skip(self), fields(amount = %amount))]
  pub async fn submit_approval(
    &self,
    spender: Address,
    amount: &TokenAmount,
  ) -> Result<PendingTransaction, LendingError> {
    let tx_hash = self.token.approve(spender, amount.raw()).await?;
    Ok(PendingTransaction::submitted(TxKind::Approve, *amount, tx_hash))
  }

  /// Approve exactly `amount` and resolve only after one confirmation.
  pub async fn approve(
    &self,
    spender: Address,
    amount: &TokenAmount,
    waiter: &ConfirmationWaiter,
  ) -> Result<PendingTransaction, LendingError> {
    let mut tx = self.submit_approval(spender, amount).await?;
    waiter.wait(&mut tx).await?;
    Ok(tx)
  }
}
