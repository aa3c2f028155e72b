//! Status View - Display Rendering of the Dashboard Snapshot
//!
//! Turns a `DashboardSnapshot` into the figures an operator sees: fixed
//! two-place amounts, lock countdown, APY and the projected yearly return.
//! Serializable for `status --json`.

use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::domain::{estimate_yearly_return, TokenAmount};

use super::dashboard::DashboardSnapshot;

const AMOUNT_PLACES: usize = 2;
const UNKNOWN: &str = "-";

/// Rendered dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
  pub account: Address,
  pub token: String,
  pub balance: String,
  pub allowance: String,
  pub deposited: String,
  pub pending_rewards: String,
  pub locked: Option<bool>,
  pub lock_remaining: String,
  pub apy_percent: Decimal,
  /// Projected yearly return on the deposited amount.
  pub estimated_yearly_return: Option<Decimal>,
  pub withdraw_enabled: bool,
  pub banner: Option<String>,
}

impl StatusView {
  pub fn from_snapshot(snapshot: &DashboardSnapshot, display: &DisplayConfig) -> Self {
    let fixed = |amount: Option<TokenAmount>| {
      amount.map_or_else(|| UNKNOWN.to_string(), |a| a.format_fixed(AMOUNT_PLACES))
    };

    let deposited = snapshot.lending.map(|l| l.deposited_amount);

    Self {
      account: snapshot.account,
      token: display.token_label.clone(),
      balance: fixed(snapshot.balance),
      allowance: fixed(snapshot.allowance),
      deposited: fixed(deposited),
      pending_rewards: fixed(snapshot.lending.map(|l| l.pending_rewards)),
      locked: snapshot.lock.map(|l| l.is_locked),
      lock_remaining: snapshot
        .lock
        .map_or_else(|| UNKNOWN.to_string(), |l| l.remaining_display()),
      apy_percent: display.apy_percent,
      estimated_yearly_return: deposited
        .and_then(|amount| estimate_yearly_return(&amount, display.apy_percent)),
      withdraw_enabled: snapshot.lock.is_some_and(|l| !l.is_locked),
      banner: snapshot.banner(),
    }
  }

  /// Plain-text rendering, one figure per line.
  pub fn lines(&self) -> Vec<String> {
    let label = &self.token;
    let mut lines = vec![
      format!("Account:          {}", self.account),
      format!("Wallet balance:   {} {label}", self.balance),
      format!("Allowance:        {} {label}", self.allowance),
      format!("Deposited:        {} {label}", self.deposited),
      format!("Pending rewards:  {} {label}", self.pending_rewards),
      format!("Lock:             {}", self.lock_remaining),
      format!("APY:              {}%", self.apy_percent),
    ];
    if let Some(estimate) = self.estimated_yearly_return {
      lines.push(format!("Est. yearly:      {estimate} {label}"));
    }
    lines.push(format!(
      "Withdraw:         {}",
      if self.withdraw_enabled { "enabled" } else { "disabled" }
    ));
    if let Some(banner) = &self.banner {
      lines.push(format!("Warning:          {banner}"));
    }
    lines
  }
}

#[cfg(test)]
mod tests {
  use alloy::primitives::U256;
  use rust_decimal_macros::dec;

  use super::*;
  use crate::domain::{LendingPosition, LockStatus};

  fn tokens(whole: u64) -> TokenAmount {
    TokenAmount::from_raw(U256::from(whole) * U256::from(10u64).pow(U256::from(18u64)), 18)
  }

  #[test]
  fn test_empty_snapshot_renders_placeholders() {
    let view = StatusView::from_snapshot(&DashboardSnapshot::new(Address::ZERO), &DisplayConfig::default());
    assert_eq!(view.balance, "-");
    assert_eq!(view.lock_remaining, "-");
    assert!(view.locked.is_none());
    assert!(view.estimated_yearly_return.is_none());
    assert!(!view.withdraw_enabled);
    assert!(view.banner.is_none());
  }

  #[test]
  fn test_locked_position() {
    let mut snapshot = DashboardSnapshot::new(Address::ZERO);
    snapshot.balance = Some(tokens(10_000));
    snapshot.allowance = Some(TokenAmount::zero(18));
    snapshot.lending = Some(LendingPosition {
      deposited_amount: tokens(5_000),
      pending_rewards: TokenAmount::zero(18),
    });
    snapshot.lock = Some(LockStatus::from_chain(true, 1_700_000_000, 836_400));

    let view = StatusView::from_snapshot(&snapshot, &DisplayConfig::default());
    assert_eq!(view.balance, "10000.00");
    assert_eq!(view.deposited, "5000.00");
    assert_eq!(view.lock_remaining, "9d 16h 20m");
    assert_eq!(view.locked, Some(true));
    assert_eq!(view.estimated_yearly_return, Some(dec!(950.00)));
    assert!(!view.withdraw_enabled);
    assert!(view.lines().iter().any(|l| l.contains("disabled")));
  }

  #[test]
  fn test_banner_is_shown() {
    let mut snapshot = DashboardSnapshot::new(Address::ZERO);
    snapshot.lock = Some(LockStatus::unlocked());
    snapshot
      .read_errors
      .insert("balance".into(), "read failed: balanceOf: timeout".into());

    let view = StatusView::from_snapshot(&snapshot, &DisplayConfig::default());
    assert!(view.withdraw_enabled);
    assert_eq!(view.lock_remaining, "Ready to withdraw");
    let banner = view.banner.unwrap();
    assert!(banner.contains("balance: read failed"));
  }
}
