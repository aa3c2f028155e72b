//! Provider error classification.
//!
//! alloy surfaces wallet rejections, reverts and transport faults as one
//! error type; the orchestrator needs them apart. Classification works on
//! the rendered message because JSON-RPC providers disagree on codes.

use std::fmt;

use crate::domain::LendingError;

/// Message fragments wallets use when the user declines to sign (EIP-1193 code 4001).
const USER_REJECTION_MARKERS: &[&str] = &[
    "user rejected",
    "user denied",
    "rejected by user",
    "error code 4001",
];

const REVERT_MARKER: &str = "execution reverted";

/// Map a read failure to `ReadError`, keeping the call name.
pub fn read_error(call: &str, err: &impl fmt::Display) -> LendingError {
    LendingError::ReadError(format!("{call}: {err}"))
}

/// Map a write (send) failure onto the lending error taxonomy.
pub fn classify_write_error(err: impl fmt::Display) -> LendingError {
    let message = err.to_string();
    let lower = message.to_lowercase();

    if USER_REJECTION_MARKERS.iter().any(|m| lower.contains(m)) {
        return LendingError::TransactionRejectedByUser;
    }

    match revert_reason(&message) {
        Some(reason) => LendingError::TransactionFailed(reason),
        None => LendingError::TransactionFailed(message),
    }
}

/// Extract `"execution reverted: <reason>"`, or the bare marker when no
/// reason string was returned.
fn revert_reason(message: &str) -> Option<String> {
    let start = message.find(REVERT_MARKER)?;
    let tail = &message[start + REVERT_MARKER.len()..];
    let reason = tail
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .split(", data")
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"');

    if reason.is_empty() {
        Some(REVERT_MARKER.to_string())
    } else {
        Some(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection() {
        let err = classify_write_error(
            "server returned an error response: error code 4001: User rejected the request.",
        );
        assert_eq!(err, LendingError::TransactionRejectedByUser);
        assert_eq!(
            classify_write_error("MetaMask Tx Signature: User denied transaction signature."),
            LendingError::TransactionRejectedByUser
        );
    }

    #[test]
    fn test_revert_reason_extracted() {
        let err = classify_write_error(
            "server returned an error response: error code 3: execution reverted: Lock period active, data: \"0x08c379a0\"",
        );
        assert_eq!(err, LendingError::TransactionFailed("Lock period active".into()));
    }

    #[test]
    fn test_bare_revert() {
        let err = classify_write_error("execution reverted");
        assert_eq!(err, LendingError::TransactionFailed("execution reverted".into()));
    }

    #[test]
    fn test_other_failures_verbatim() {
        let err = classify_write_error("insufficient funds for gas * price + value");
        assert_eq!(
            err,
            LendingError::TransactionFailed("insufficient funds for gas * price + value".into())
        );
    }

    #[test]
    fn test_read_error_keeps_call_name() {
        let err = read_error("balanceOf", &"connection refused");
        assert_eq!(err, LendingError::ReadError("balanceOf: connection refused".into()));
    }
}
