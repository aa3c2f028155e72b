//! Read-side models: token position, lending position, lock status.
//!
//! All three mirror contract state. They change only when a transaction
//! lands and are re-read after every write and on the poll timer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::amount::TokenAmount;

/// Balance and spend allowance of the deposit token for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenPosition {
    /// Wallet balance of the deposit token.
    pub balance: TokenAmount,
    /// Amount the lending contract may transfer on the account's behalf.
    pub allowance: TokenAmount,
}

impl TokenPosition {
    /// Whether the allowance already covers a deposit of `amount`.
    pub fn allowance_covers(&self, amount: &TokenAmount) -> bool {
        self.allowance.raw() >= amount.raw()
    }
}

/// The account's stake in the lending contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LendingPosition {
    /// Principal currently deposited.
    pub deposited_amount: TokenAmount,
    /// Rewards accrued but not yet claimed.
    pub pending_rewards: TokenAmount,
}

/// Lock period state as reported by the contract clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub is_locked: bool,
    /// End of the lock period. `None` when the account never deposited.
    pub lock_end_time: Option<DateTime<Utc>>,
    /// Seconds until unlock, as computed by the contract.
    pub time_remaining: u64,
}

impl LockStatus {
    /// Build from raw contract fields; a zero end time means "no lock".
    pub fn from_chain(is_locked: bool, lock_end_unix: u64, time_remaining: u64) -> Self {
        let lock_end_time = i64::try_from(lock_end_unix)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        Self {
            is_locked,
            lock_end_time,
            time_remaining,
        }
    }

    pub const fn unlocked() -> Self {
        Self {
            is_locked: false,
            lock_end_time: None,
            time_remaining: 0,
        }
    }

    /// Human-readable remaining lock time.
    pub fn remaining_display(&self) -> String {
        format_time_remaining(self.time_remaining)
    }
}

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Break a duration into `"{d}d {h}h {m}m"`; leftover seconds are dropped.
pub fn format_time_remaining(seconds: u64) -> String {
    if seconds == 0 {
        return "Ready to withdraw".to_string();
    }
    let days = seconds / SECS_PER_DAY;
    let hours = (seconds % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    format!("{days}d {hours}h {minutes}m")
}
