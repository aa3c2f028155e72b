//! Polling Refresher - Fixed-interval Lock Status Refresh
//!
//! Keeps the countdown and lock flag current while the client is open.
//! One spawned task at most: `start()` replaces a running timer and
//! dropping the refresher cancels it. Read failures land in the
//! dashboard's soft error banner and never stop the timer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::ports::chain_client::{LendingContract, TokenContract};

use super::dashboard::LendingDashboard;

/// Aborts the loop when dropped.
struct PollTask {
  handle: JoinHandle<()>,
}

impl Drop for PollTask {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

/// Owns the background refresh timer for one dashboard.
pub struct PollingRefresher<T: TokenContract, L: LendingContract> {
  dashboard: Arc<LendingDashboard<T, L>>,
  period: Duration,
  include_balances: bool,
  task: Mutex<Option<PollTask>>,
}

impl<T: TokenContract, L: LendingContract> PollingRefresher<T, L> {
  /// `period` is clamped to at least one second.
  pub fn new(dashboard: Arc<LendingDashboard<T, L>>, period: Duration, include_balances: bool) -> Self {
    Self {
      dashboard,
      period: period.max(Duration::from_secs(1)),
      include_balances,
      task: Mutex::new(None),
    }
  }

  pub const fn period(&self) -> Duration {
    self.period
  }

  /// Start the timer, replacing any running one. The first tick fires
  /// one period from now.
  pub fn start(&self) {
    let handle = tokio::spawn(run_loop(
      Arc::clone(&self.dashboard),
      self.period,
      self.include_balances,
    ));

    let previous = self
      .task
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .replace(PollTask { handle });

    if previous.is_some() {
      debug!("Replacing running poll timer");
      drop(previous);
    }
    info!(period_secs = self.period.as_secs(), balances = self.include_balances, "Polling started");
  }

  /// Stop the timer. No-op when not running.
  pub fn stop(&self) {
    let current = self
      .task
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    if let Some(task) = current {
      drop(task);
      info!("Polling stopped");
    }
  }

  pub fn is_running(&self) -> bool {
    self
      .task
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
      .is_some_and(|task| !task.handle.is_finished())
  }
}

async fn run_loop<T: TokenContract, L: LendingContract>(
  dashboard: Arc<LendingDashboard<T, L>>,
  period: Duration,
  include_balances: bool,
) {
  let mut ticker = interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    ticker.tick().await;
    if include_balances {
      let report = dashboard.refresh_all().await;
      debug!(complete = report.is_complete(), "Poll tick: full refresh");
    } else if let Err(e) = dashboard.refresh_lock_status().await {
      debug!(error = %e, "Poll tick: lock status read failed");
    }
  }
}
