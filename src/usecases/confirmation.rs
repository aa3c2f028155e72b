//! Confirmation Waiter - Application-level Bound on Confirmation Waits
//!
//! Wraps the `TxConfirmer` port with a hard timeout so no action can hang
//! on a transaction that never lands. Giving up only stops waiting; the
//! broadcast transaction is not recalled, and the next refresh reconciles
//! whatever actually happened on-chain.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::{LendingError, PendingTransaction};
use crate::ports::chain_client::{Confirmation, TxConfirmer};

/// Waits for one confirmation, bounded by `timeout`.
pub struct ConfirmationWaiter {
  confirmer: Arc<dyn TxConfirmer>,
  timeout: Duration,
}

impl ConfirmationWaiter {
  pub fn new(confirmer: Arc<dyn TxConfirmer>, timeout: Duration) -> Self {
    Self { confirmer, timeout }
  }

  pub const fn timeout(&self) -> Duration {
    self.timeout
  }

  /// Wait for `tx` and record the outcome on it.
  pub async fn wait(&self, tx: &mut PendingTransaction) -> Result<Confirmation, LendingError> {
    let outcome = tokio::time::timeout(self.timeout, self.confirmer.wait_for_confirmation(tx.tx_hash))
      .await
      .unwrap_or_else(|_| {
        Err(LendingError::Timeout {
          tx_hash: tx.tx_hash.to_string(),
          waited_secs: self.timeout.as_secs(),
        })
      });

    match &outcome {
      Ok(confirmation) => {
        tx.mark_confirmed();
        info!(
          kind = %tx.kind,
          tx = %tx.tx_hash,
          block = ?confirmation.block_number,
          "Transaction confirmed"
        );
      }
      Err(e) => {
        tx.mark_failed(e.to_string());
        warn!(kind = %tx.kind, tx = %tx.tx_hash, error = %e, "Transaction not confirmed");
      }
    }

    outcome
  }
}
