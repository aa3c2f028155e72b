//! Receipt Watcher - Bounded Confirmation Polling
//!
//! Implements the `TxConfirmer` port by polling `eth_getTransactionReceipt`
//! a bounded number of times. Running out of polls reports `Timeout`; the
//! transaction itself is not recalled and may still be mined later.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use alloy::providers::Provider;
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::domain::LendingError;
use crate::ports::chain_client::{Confirmation, TxConfirmer};

use super::session::WalletSession;

/// Polls for receipts on the wallet session's provider.
pub struct ReceiptWatcher {
    /// Shared signer-backed session.
    session: Arc<WalletSession>,
    /// Delay between receipt polls.
    poll_interval: Duration,
    /// Poll budget derived from the confirmation timeout.
    max_polls: u32,
}

impl ReceiptWatcher {
    /// Create a watcher that gives up after roughly `timeout`.
    pub fn new(session: Arc<WalletSession>, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            session,
            poll_interval,
            max_polls: poll_budget(poll_interval, timeout),
        }
    }
}

/// The parts of a mined receipt the watcher acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReceiptSummary {
    succeeded: bool,
    block_number: Option<u64>,
    gas_used: u64,
}

impl From<&TransactionReceipt> for ReceiptSummary {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            succeeded: receipt.status(),
            block_number: receipt.block_number,
            gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
        }
    }
}

/// Number of polls that fit into `timeout`, at least one.
fn poll_budget(poll_interval: Duration, timeout: Duration) -> u32 {
    let interval_ms = poll_interval.as_millis().max(1);
    let polls = timeout.as_millis().div_ceil(interval_ms);
    u32::try_from(polls).unwrap_or(u32::MAX).max(1)
}

/// Call `fetch` up to `max_polls` times, sleeping `poll_interval` after
/// each miss. Query errors count as misses.
async fn poll_receipt<F, Fut, E>(
    tx_hash: TxHash,
    poll_interval: Duration,
    max_polls: u32,
    mut fetch: F,
) -> Result<Confirmation, LendingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<ReceiptSummary>, E>>,
    E: fmt::Display,
{
    for attempt in 1..=max_polls {
        match fetch().await {
            Ok(Some(receipt)) if !receipt.succeeded => {
                warn!(block = ?receipt.block_number, "Transaction reverted");
                return Err(LendingError::TransactionFailed(
                    "transaction reverted on-chain".to_string(),
                ));
            }
            Ok(Some(receipt)) => {
                info!(block = ?receipt.block_number, attempt, "Transaction confirmed");
                return Ok(Confirmation {
                    tx_hash,
                    block_number: receipt.block_number,
                    gas_used: receipt.gas_used,
                });
            }
            Ok(None) => debug!(attempt, "Receipt not available yet"),
            Err(e) => warn!(attempt, error = %e, "Receipt query failed"),
        }

        sleep(poll_interval).await;
    }

    let waited = poll_interval * max_polls;
    Err(LendingError::Timeout {
        tx_hash: tx_hash.to_string(),
        waited_secs: waited.as_secs(),
    })
}

#[async_trait]
impl TxConfirmer for ReceiptWatcher {
    #[instrument(skip(self), fields(tx = %tx_hash, max_polls = self.max_polls))]
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, LendingError> {
        let provider = self.session.provider();
        poll_receipt(tx_hash, self.poll_interval, self.max_polls, || async move {
            provider
                .get_transaction_receipt(tx_hash)
                .await
                .map(|receipt| receipt.as_ref().map(ReceiptSummary::from))
        })
        .await
    }
}
