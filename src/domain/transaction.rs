//! Write-side models: pending transactions and per-slot action state.
//!
//! A user action runs on one of two independent slots (deposit, withdraw).
//! Each slot walks `Idle -> Submitting -> AwaitingConfirmation ->
//! Succeeded | Failed` and admits a single in-flight transaction.

use std::fmt;

use alloy::primitives::TxHash;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::amount::TokenAmount;

/// Which contract call a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TxKind {
    Approve,
    Deposit,
    Withdraw,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Deposit => write!(f, "deposit"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Lifecycle of a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxStatus {
    Submitted,
    Confirmed,
    Failed,
}

/// A transaction the user submitted during this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    /// Local correlation ID for logs.
    pub id: Uuid,
    pub kind: TxKind,
    pub amount: TokenAmount,
    pub tx_hash: TxHash,
    pub status: TxStatus,
    pub submitted_at: DateTime<Utc>,
    /// Set once the transaction is confirmed or failed.
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure message, verbatim from the provider when available.
    pub failure: Option<String>,
}

impl PendingTransaction {
    /// Record a freshly broadcast transaction.
    pub fn submitted(kind: TxKind, amount: TokenAmount, tx_hash: TxHash) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            tx_hash,
            status: TxStatus::Submitted,
            submitted_at: Utc::now(),
            finished_at: None,
            failure: None,
        }
    }

    pub fn mark_confirmed(&mut self) {
        self.status = TxStatus::Confirmed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = TxStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.failure = Some(reason.into());
    }
}

/// Independent action slots; one in-flight transaction each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionSlot {
    Deposit,
    Withdraw,
}

impl fmt::Display for ActionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Observable state of one action slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum ActionState {
    #[default]
    Idle,
    /// Waiting for the wallet to sign and the node to accept the transaction.
    Submitting { kind: TxKind, amount: TokenAmount },
    /// Broadcast; waiting for one confirmation.
    AwaitingConfirmation { tx: PendingTransaction },
    Succeeded { tx: PendingTransaction },
    Failed { kind: TxKind, message: String },
}

impl ActionState {
    /// A transaction is between submission and its outcome. The trigger
    /// control must stay disabled.
    pub const fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Submitting { .. } | Self::AwaitingConfirmation { .. }
        )
    }

    /// Terminal states that a dismiss returns to `Idle`.
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::AwaitingConfirmation { .. } => "awaiting_confirmation",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;

    fn sample_tx() -> PendingTransaction {
        PendingTransaction::submitted(
            TxKind::Deposit,
            TokenAmount::from_raw(U256::from(5_000u64), 0),
            TxHash::repeat_byte(0xab),
        )
    }

    #[test]
    fn test_pending_transaction_lifecycle() {
        let mut tx = sample_tx();
        assert_eq!(tx.status, TxStatus::Submitted);
        assert!(tx.finished_at.is_none());

        tx.mark_confirmed();
        assert_eq!(tx.status, TxStatus::Confirmed);
        assert!(tx.finished_at.is_some());
    }

    #[test]
    fn test_pending_transaction_failure_keeps_reason() {
        let mut tx = sample_tx();
        tx.mark_failed("execution reverted: Lock period active");
        assert_eq!(tx.status, TxStatus::Failed);
        assert_eq!(tx.failure.as_deref(), Some("execution reverted: Lock period active"));
    }

    #[test]
    fn test_action_state_flags() {
        let amount = TokenAmount::from_raw(U256::from(1u64), 0);
        assert!(!ActionState::Idle.is_in_flight());
        assert!(ActionState::Submitting { kind: TxKind::Approve, amount }.is_in_flight());
        assert!(ActionState::AwaitingConfirmation { tx: sample_tx() }.is_in_flight());
        assert!(ActionState::Succeeded { tx: sample_tx() }.is_finished());
        assert!(
            ActionState::Failed { kind: TxKind::Withdraw, message: "x".into() }.is_finished()
        );
        assert!(!ActionState::Idle.is_finished());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(sample_tx().id, sample_tx().id);
    }
}
