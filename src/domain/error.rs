//! Lending client error taxonomy.
//!
//! Every failure the client can surface to a user maps onto one of these
//! variants. Validation variants are raised before any network call;
//! `ReadError` is recoverable by the next refresh; write failures end the
//! orchestrator's state machine at `Failed`.

use thiserror::Error;

use super::transaction::ActionSlot;

/// Errors produced by the lending client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    /// No wallet session (signer) is available.
    #[error("wallet not connected")]
    NotConnected,

    /// The wallet's active network differs from the configured chain.
    #[error("unsupported chain: expected chain_id={expected}, wallet is on {actual}")]
    UnsupportedChain { expected: u64, actual: u64 },

    /// Provider or network fault on a read. Retry or wait for the next poll.
    #[error("read failed: {0}")]
    ReadError(String),

    /// User input is not a positive amount representable with the token decimals.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Current allowance does not cover the requested deposit.
    #[error("allowance {current} is below the requested {required}; approval required")]
    InsufficientAllowance { required: String, current: String },

    /// Requested deposit exceeds the wallet's token balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: String, available: String },

    /// Requested withdrawal exceeds the deposited amount.
    #[error("withdrawal of {requested} exceeds deposited {deposited}")]
    ExceedsDeposit { requested: String, deposited: String },

    /// Funds are still inside the lock period.
    #[error("deposit is locked: unlock in {remaining}")]
    WithdrawalLocked { remaining: String },

    /// The position has not been read yet, so the action cannot be validated.
    #[error("lending position not loaded yet")]
    PositionUnavailable,

    /// A transaction is already in flight on this action slot.
    #[error("{0} already in progress")]
    ActionInFlight(ActionSlot),

    /// The user declined to sign. Treated as a cancellation, not a failure.
    #[error("transaction rejected by user")]
    TransactionRejectedByUser,

    /// On-chain revert or node-level failure, with the revert reason when decodable.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Confirmation wait exceeded the configured bound. The transaction may still land.
    #[error("timed out after {waited_secs}s waiting for {tx_hash}")]
    Timeout { tx_hash: String, waited_secs: u64 },

    /// Invalid static configuration (addresses, keys).
    #[error("configuration error: {0}")]
    Config(String),
}

impl LendingError {
    /// Client-side validation errors; these never touch the network.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InsufficientBalance { .. }
                | Self::ExceedsDeposit { .. }
                | Self::WithdrawalLocked { .. }
                | Self::PositionUnavailable
                | Self::ActionInFlight(_)
        )
    }

    /// Errors that clear on their own (next poll / refresh).
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReadError(_) | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(LendingError::InvalidAmount("x".into()).is_validation());
        assert!(LendingError::ActionInFlight(ActionSlot::Deposit).is_validation());
        assert!(!LendingError::TransactionFailed("revert".into()).is_validation());
        assert!(!LendingError::NotConnected.is_validation());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(LendingError::ReadError("timeout".into()).is_recoverable());
        assert!(!LendingError::TransactionRejectedByUser.is_recoverable());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = LendingError::UnsupportedChain { expected: 97, actual: 1 };
        assert_eq!(
            err.to_string(),
            "unsupported chain: expected chain_id=97, wallet is on 1"
        );
        assert_eq!(
            LendingError::ActionInFlight(ActionSlot::Withdraw).to_string(),
            "withdraw already in progress"
        );
    }
}
