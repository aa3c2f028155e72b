//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `TokenContract`: ERC-20 deposit token reads and approvals
//! - `LendingContract`: Lending pool reads, deposits and withdrawals
//! - `TxConfirmer`: Confirmation tracking for broadcast transactions

pub mod chain_client;

pub use chain_client::{
  Confirmation, LenderInfoRaw, LendingContract, LockStatusRaw, TokenContract, TxConfirmer,
};
