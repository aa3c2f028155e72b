//! Domain layer - Core lending client models.
//!
//! Pure types and rules for amounts, positions and transaction state.
//! No I/O here (hexagonal architecture inner ring); everything is
//! testable in isolation.

pub mod amount;
pub mod error;
pub mod position;
pub mod transaction;
pub mod yield_estimate;

// Re-export core types for convenience
pub use amount::{AmountError, TokenAmount};
pub use error::LendingError;
pub use position::{LendingPosition, LockStatus, TokenPosition, format_time_remaining};
pub use transaction::{ActionSlot, ActionState, PendingTransaction, TxKind, TxStatus};
pub use yield_estimate::estimate_yearly_return;
