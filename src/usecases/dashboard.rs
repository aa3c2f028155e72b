//! Lending Dashboard - Live Read-side State for One Account
//!
//! Owns the token tracker and position reader and publishes the union of
//! their latest successful results on a `watch` channel. A failed read
//! keeps the previous value and records a soft error (banner); it never
//! clears state or aborts the other reads.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::domain::{LendingError, LendingPosition, LockStatus, TokenAmount, TokenPosition};
use crate::ports::chain_client::{LendingContract, TokenContract};

use super::position_reader::LendingPositionReader;
use super::token_tracker::TokenAllowanceTracker;

/// Read names used as keys for soft errors.
pub const READ_DECIMALS: &str = "decimals";
pub const READ_BALANCE: &str = "balance";
pub const READ_ALLOWANCE: &str = "allowance";
pub const READ_LENDER_INFO: &str = "lender_info";
pub const READ_LOCK_STATUS: &str = "lock_status";

/// Latest known read-side state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
  pub account: Address,
  pub balance: Option<TokenAmount>,
  pub allowance: Option<TokenAmount>,
  pub lending: Option<LendingPosition>,
  pub lock: Option<LockStatus>,
  /// Failed reads by name, cleared when that read next succeeds.
  pub read_errors: BTreeMap<String, String>,
  pub last_refreshed: Option<DateTime<Utc>>,
  /// Completed full refreshes this session.
  pub refresh_count: u64,
}

impl DashboardSnapshot {
  pub const fn new(account: Address) -> Self {
    Self {
      account,
      balance: None,
      allowance: None,
      lending: None,
      lock: None,
      read_errors: BTreeMap::new(),
      last_refreshed: None,
      refresh_count: 0,
    }
  }

  /// Balance and allowance, once both have been read at least once.
  pub fn token_position(&self) -> Option<TokenPosition> {
    Some(TokenPosition {
      balance: self.balance?,
      allowance: self.allowance?,
    })
  }

  /// Non-blocking error banner text, if any read is currently failing.
  pub fn banner(&self) -> Option<String> {
    if self.read_errors.is_empty() {
      return None;
    }
    let parts: Vec<String> = self
      .read_errors
      .iter()
      .map(|(read, error)| format!("{read}: {error}"))
      .collect();
    Some(format!("Showing last known values ({})", parts.join("; ")))
  }

  fn record<V>(&mut self, read: &str, result: Result<V, LendingError>) -> Option<V> {
    match result {
      Ok(value) => {
        self.read_errors.remove(read);
        Some(value)
      }
      Err(e) => {
        self.read_errors.insert(read.to_string(), e.to_string());
        None
      }
    }
  }
}

/// Outcome of a full refresh.
#[derive(Debug, Default)]
pub struct RefreshReport {
  /// Reads that failed, by name.
  pub failures: Vec<(&'static str, LendingError)>,
}

impl RefreshReport {
  pub fn is_complete(&self) -> bool {
    self.failures.is_empty()
  }
}

/// Read-side state for the connected account.
pub struct LendingDashboard<T: TokenContract, L: LendingContract> {
  tracker: TokenAllowanceTracker<T>,
  reader: LendingPositionReader<L>,
  account: Address,
  /// Lending pool address; the token spender.
  spender: Address,
  state: watch::Sender<DashboardSnapshot>,
}

impl<T: TokenContract, L: LendingContract> LendingDashboard<T, L> {
  /// Create a dashboard for `account`. Nothing is read until the first refresh.
  pub fn new(token: Arc<T>, pool: Arc<L>, account: Address) -> Self {
    let spender = pool.address();
    let (state, _) = watch::channel(DashboardSnapshot::new(account));
    Self {
      tracker: TokenAllowanceTracker::new(token),
      reader: LendingPositionReader::new(pool),
      account,
      spender,
      state,
    }
  }

  pub const fn tracker(&self) -> &TokenAllowanceTracker<T> {
    &self.tracker
  }

  pub const fn reader(&self) -> &LendingPositionReader<L> {
    &self.reader
  }

  pub const fn account(&self) -> Address {
    self.account
  }

  pub const fn spender(&self) -> Address {
    self.spender
  }

  /// Current state (cloned).
  pub fn snapshot(&self) -> DashboardSnapshot {
    self.state.borrow().clone()
  }

  /// Subscribe to state changes.
  pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
    self.state.subscribe()
  }

  /// Re-read balance, allowance, lender info and lock status.
  ///
  /// The four reads run concurrently. Successful results replace the
  /// stored values; failures keep the last known values.
  #[instrument(skip(self), fields(account = %self.account))]
  pub async fn refresh_all(&self) -> RefreshReport {
    let mut report = RefreshReport::default();

    let (balance, allowance, lending, lock) = match self.tracker.decimals().await {
      Ok(decimals) => {
        let (balance, allowance, lending, lock) = tokio::join!(
          self.tracker.get_balance(self.account),
          self.tracker.get_allowance(self.account, self.spender),
          self.reader.get_lender_info(self.account, decimals),
          self.reader.get_lock_status(self.account),
        );
        (Some(balance), Some(allowance), Some(lending), lock)
      }
      Err(e) => {
        report.failures.push((READ_DECIMALS, e.clone()));
        self.state.send_modify(|s| {
          s.read_errors.insert(READ_DECIMALS.to_string(), e.to_string());
        });
        (None, None, None, self.reader.get_lock_status(self.account).await)
      }
    };

    for (read, failure) in [
      (READ_BALANCE, balance.as_ref().and_then(|r| r.as_ref().err())),
      (READ_ALLOWANCE, allowance.as_ref().and_then(|r| r.as_ref().err())),
      (READ_LENDER_INFO, lending.as_ref().and_then(|r| r.as_ref().err())),
      (READ_LOCK_STATUS, lock.as_ref().err()),
    ] {
      if let Some(e) = failure {
        report.failures.push((read, e.clone()));
      }
    }

    self.state.send_modify(|s| {
      if balance.is_some() {
        s.read_errors.remove(READ_DECIMALS);
      }
      if let Some(value) = balance.and_then(|r| s.record(READ_BALANCE, r)) {
        s.balance = Some(value);
      }
      if let Some(value) = allowance.and_then(|r| s.record(READ_ALLOWANCE, r)) {
        s.allowance = Some(value);
      }
      if let Some(value) = lending.and_then(|r| s.record(READ_LENDER_INFO, r)) {
        s.lending = Some(value);
      }
      if let Some(value) = s.record(READ_LOCK_STATUS, lock) {
        s.lock = Some(value);
      }
      s.last_refreshed = Some(Utc::now());
      s.refresh_count += 1;
    });

    if report.is_complete() {
      debug!("Dashboard refreshed");
    } else {
      warn!(failed = report.failures.len(), "Dashboard refresh incomplete; keeping last known values");
    }
    report
  }

  /// Re-read only the lock status (poll tick).
  #[instrument(skip(self), fields(account = %self.account))]
  pub async fn refresh_lock_status(&self) -> Result<LockStatus, LendingError> {
    let result = self.reader.get_lock_status(self.account).await;

    self.state.send_modify(|s| {
      if let Some(value) = s.record(READ_LOCK_STATUS, result.clone()) {
        s.lock = Some(value);
      }
    });

    if let Ok(status) = &result {
      if status.is_locked {
        debug!(remaining = %status.remaining_display(), "Lock status refreshed");
      } else {
        info!("Deposit unlocked");
      }
    }
    result
  }
}
