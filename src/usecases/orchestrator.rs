//! Transaction Orchestrator - Approve, Deposit and Withdraw Sequencing
//!
//! Runs user actions as submit-then-confirm steps on two independent
//! slots (deposit, withdraw). Each slot publishes its `ActionState` on a
//! `watch` channel so a front end can render progress and disable the
//! trigger while a transaction is in flight.
//!
//! Rules:
//! - Validation failures return before any state change or network write
//! - A slot admits one in-flight transaction; a second trigger is refused
//! - Every confirmed write is followed by exactly one full dashboard refresh
//! - A confirmation timeout also refreshes once to reconcile
//! - Failed transactions are never retried automatically
//! - Dropping an action mid-flight marks its slot `Failed` ("abandoned")

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::config::ApprovalPolicy;
use crate::domain::{ActionSlot, ActionState, LendingError, PendingTransaction, TokenAmount, TxKind};
use crate::ports::chain_client::{LendingContract, TokenContract};

use super::confirmation::ConfirmationWaiter;
use super::dashboard::LendingDashboard;

/// Result of an action that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
  /// Every step confirmed, in submission order.
  Confirmed { transactions: Vec<PendingTransaction> },
  /// The user declined to sign; nothing was broadcast for that step.
  /// `confirmed` holds the earlier steps that did confirm.
  Cancelled { confirmed: Vec<PendingTransaction> },
}

const ABANDONED: &str = "abandoned";

enum Step {
  Confirmed(PendingTransaction),
  Rejected,
}

/// Held for the lifetime of a claimed action. If the action is dropped
/// while its slot is still in flight, the slot moves to `Failed`.
struct InFlight<'a> {
  slot: &'a watch::Sender<ActionState>,
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.slot.send_if_modified(|state| {
      let kind = match state {
        ActionState::Submitting { kind, .. } => *kind,
        ActionState::AwaitingConfirmation { tx } => tx.kind,
        _ => return false,
      };
      warn!(%kind, "Action dropped while in flight; the transaction may still land");
      *state = ActionState::Failed {
        kind,
        message: ABANDONED.to_string(),
      };
      true
    });
  }
}

/// Sequences chain writes for the dashboard's account.
pub struct TransactionOrchestrator<T: TokenContract, L: LendingContract> {
  dashboard: Arc<LendingDashboard<T, L>>,
  pool: Arc<L>,
  waiter: ConfirmationWaiter,
  policy: ApprovalPolicy,
  deposit_slot: watch::Sender<ActionState>,
  withdraw_slot: watch::Sender<ActionState>,
}

impl<T: TokenContract, L: LendingContract> TransactionOrchestrator<T, L> {
  pub fn new(
    dashboard: Arc<LendingDashboard<T, L>>,
    waiter: ConfirmationWaiter,
    policy: ApprovalPolicy,
  ) -> Self {
    let pool = dashboard.reader().pool();
    let (deposit_slot, _) = watch::channel(ActionState::Idle);
    let (withdraw_slot, _) = watch::channel(ActionState::Idle);
    Self {
      dashboard,
      pool,
      waiter,
      policy,
      deposit_slot,
      withdraw_slot,
    }
  }

  pub fn dashboard(&self) -> &Arc<LendingDashboard<T, L>> {
    &self.dashboard
  }

  pub const fn policy(&self) -> ApprovalPolicy {
    self.policy
  }

  /// Current state of `slot`.
  pub fn state(&self, slot: ActionSlot) -> ActionState {
    self.slot(slot).borrow().clone()
  }

  /// Subscribe to state changes of `slot`.
  pub fn subscribe(&self, slot: ActionSlot) -> watch::Receiver<ActionState> {
    self.slot(slot).subscribe()
  }

  /// Whether the trigger for `slot` should be enabled.
  ///
  /// Disabled while a transaction is in flight. Withdraw is also disabled
  /// while the deposit is locked or the lock status is unknown.
  pub fn control_enabled(&self, slot: ActionSlot) -> bool {
    if self.slot(slot).borrow().is_in_flight() {
      return false;
    }
    match slot {
      ActionSlot::Deposit => true,
      ActionSlot::Withdraw => self
        .dashboard
        .snapshot()
        .lock
        .is_some_and(|lock| !lock.is_locked),
    }
  }

  /// Return a finished slot to `Idle`. Returns whether anything changed.
  pub fn dismiss(&self, slot: ActionSlot) -> bool {
    self.slot(slot).send_if_modified(|state| {
      if state.is_finished() {
        *state = ActionState::Idle;
        true
      } else {
        false
      }
    })
  }

  /// Deposit `input` tokens, approving first when the allowance is short
  /// and the policy allows it.
  #[instrument(skip(self))]
  pub async fn deposit(&self, input: &str) -> Result<ActionOutcome, LendingError> {
    let slot = ActionSlot::Deposit;
    self.ensure_available(slot)?;

    let amount = self.dashboard.tracker().parse_amount(input).await?;
    if let Some(balance) = self.dashboard.snapshot().balance {
      if amount.raw() > balance.raw() {
        return Err(LendingError::InsufficientBalance {
          requested: amount.to_string(),
          available: balance.to_string(),
        });
      }
    }

    let allowance = self
      .dashboard
      .tracker()
      .get_allowance(self.dashboard.account(), self.dashboard.spender())
      .await?;
    let needs_approval = allowance.raw() < amount.raw();
    if needs_approval && self.policy == ApprovalPolicy::Manual {
      return Err(LendingError::InsufficientAllowance {
        required: amount.to_string(),
        current: allowance.to_string(),
      });
    }

    let first = if needs_approval { TxKind::Approve } else { TxKind::Deposit };
    let _guard = self.claim(slot, first, amount)?;
    let mut transactions = Vec::with_capacity(2);

    if needs_approval {
      info!(%amount, %allowance, "Allowance short; approving before deposit");
      match self.run_approval(slot, amount).await? {
        Step::Confirmed(tx) => transactions.push(tx),
        Step::Rejected => return Ok(ActionOutcome::Cancelled { confirmed: transactions }),
      }
    }

    let pool = Arc::clone(&self.pool);
    let submit = async move {
      let tx_hash = pool.deposit(amount.raw()).await?;
      Ok::<_, LendingError>(PendingTransaction::submitted(TxKind::Deposit, amount, tx_hash))
    };
    match self.execute(slot, TxKind::Deposit, amount, submit).await? {
      Step::Confirmed(tx) => transactions.push(tx),
      Step::Rejected => return Ok(ActionOutcome::Cancelled { confirmed: transactions }),
    }

    Ok(self.finish(slot, transactions))
  }

  /// Approve exactly `input` tokens for the lending pool, on the deposit slot.
  #[instrument(skip(self))]
  pub async fn approve_for_deposit(&self, input: &str) -> Result<ActionOutcome, LendingError> {
    let slot = ActionSlot::Deposit;
    self.ensure_available(slot)?;

    let amount = self.dashboard.tracker().parse_amount(input).await?;
    let _guard = self.claim(slot, TxKind::Approve, amount)?;

    match self.run_approval(slot, amount).await? {
      Step::Confirmed(tx) => Ok(self.finish(slot, vec![tx])),
      Step::Rejected => Ok(ActionOutcome::Cancelled { confirmed: Vec::new() }),
    }
  }

  /// Withdraw `input` tokens of deposited principal.
  ///
  /// Checked against the last known position; a locked or exceeded
  /// withdrawal is refused without touching the network.
  #[instrument(skip(self))]
  pub async fn withdraw(&self, input: &str) -> Result<ActionOutcome, LendingError> {
    let slot = ActionSlot::Withdraw;
    self.ensure_available(slot)?;

    let snapshot = self.dashboard.snapshot();
    let lock = snapshot.lock.ok_or(LendingError::PositionUnavailable)?;
    if lock.is_locked {
      return Err(LendingError::WithdrawalLocked {
        remaining: lock.remaining_display(),
      });
    }
    let deposited = snapshot
      .lending
      .ok_or(LendingError::PositionUnavailable)?
      .deposited_amount;

    let amount = TokenAmount::parse_positive(input, deposited.decimals())?;
    if amount.raw() > deposited.raw() {
      return Err(LendingError::ExceedsDeposit {
        requested: amount.to_string(),
        deposited: deposited.to_string(),
      });
    }

    let _guard = self.claim(slot, TxKind::Withdraw, amount)?;

    let pool = Arc::clone(&self.pool);
    let submit = async move {
      let tx_hash = pool.withdraw(amount.raw()).await?;
      Ok::<_, LendingError>(PendingTransaction::submitted(TxKind::Withdraw, amount, tx_hash))
    };
    match self.execute(slot, TxKind::Withdraw, amount, submit).await? {
      Step::Confirmed(tx) => Ok(self.finish(slot, vec![tx])),
      Step::Rejected => Ok(ActionOutcome::Cancelled { confirmed: Vec::new() }),
    }
  }

  async fn run_approval(&self, slot: ActionSlot, amount: TokenAmount) -> Result<Step, LendingError> {
    let submit = self
      .dashboard
      .tracker()
      .submit_approval(self.dashboard.spender(), &amount);
    self.execute(slot, TxKind::Approve, amount, submit).await
  }

  /// Submit one transaction and wait for it.
  ///
  /// Leaves the slot `AwaitingConfirmation` on success (the caller
  /// decides whether more steps follow), `Idle` on user rejection, and
  /// `Failed` on any other error.
  async fn execute<F>(
    &self,
    slot: ActionSlot,
    kind: TxKind,
    amount: TokenAmount,
    submit: F,
  ) -> Result<Step, LendingError>
  where
    F: Future<Output = Result<PendingTransaction, LendingError>>,
  {
    let sender = self.slot(slot);
    sender.send_replace(ActionState::Submitting { kind, amount });

    let mut tx = match submit.await {
      Ok(tx) => tx,
      Err(LendingError::TransactionRejectedByUser) => {
        info!(%slot, %kind, "Signing declined by user");
        sender.send_replace(ActionState::Idle);
        return Ok(Step::Rejected);
      }
      Err(e) => {
        warn!(%slot, %kind, error = %e, "Submission failed");
        sender.send_replace(ActionState::Failed { kind, message: e.to_string() });
        return Err(e);
      }
    };

    info!(%slot, %kind, %amount, tx = %tx.tx_hash, id = %tx.id, "Transaction submitted");
    sender.send_replace(ActionState::AwaitingConfirmation { tx: tx.clone() });

    match self.waiter.wait(&mut tx).await {
      Ok(_) => {
        self.dashboard.refresh_all().await;
        Ok(Step::Confirmed(tx))
      }
      Err(e) => {
        if matches!(e, LendingError::Timeout { .. }) {
          self.dashboard.refresh_all().await;
        }
        sender.send_replace(ActionState::Failed { kind, message: e.to_string() });
        Err(e)
      }
    }
  }

  fn finish(&self, slot: ActionSlot, transactions: Vec<PendingTransaction>) -> ActionOutcome {
    if let Some(last) = transactions.last() {
      self.slot(slot).send_replace(ActionState::Succeeded { tx: last.clone() });
    }
    ActionOutcome::Confirmed { transactions }
  }

  fn ensure_available(&self, slot: ActionSlot) -> Result<(), LendingError> {
    if self.slot(slot).borrow().is_in_flight() {
      warn!(%slot, "Action refused; transaction already in flight");
      return Err(LendingError::ActionInFlight(slot));
    }
    Ok(())
  }

  /// Atomically move `slot` out of any non-in-flight state.
  fn claim(
    &self,
    slot: ActionSlot,
    kind: TxKind,
    amount: TokenAmount,
  ) -> Result<InFlight<'_>, LendingError> {
    let sender = self.slot(slot);
    let claimed = sender.send_if_modified(|state| {
      if state.is_in_flight() {
        return false;
      }
      *state = ActionState::Submitting { kind, amount };
      true
    });
    if claimed {
      Ok(InFlight { slot: sender })
    } else {
      Err(LendingError::ActionInFlight(slot))
    }
  }

  const fn slot(&self, slot: ActionSlot) -> &watch::Sender<ActionState> {
    match slot {
      ActionSlot::Deposit => &self.deposit_slot,
      ActionSlot::Withdraw => &self.withdraw_slot,
    }
  }
}
