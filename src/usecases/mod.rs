//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the client's workflows. Each use case is generic over the chain
//! ports, so tests drive it with mocks.
//!
//! Use cases:
//! - `TokenAllowanceTracker`: Decimals, balance, allowance and approvals
//! - `LendingPositionReader`: Deposited amount, rewards and lock status
//! - `LendingDashboard`: Observable read-side state with soft errors
//! - `TransactionOrchestrator`: Approve, deposit and withdraw sequencing
//! - `PollingRefresher`: Background lock status refresh
//! - `StatusView`: Operator-facing rendering of the dashboard

pub mod confirmation;
pub mod dashboard;
pub mod orchestrator;
pub mod poller;
pub mod position_reader;
pub mod status;
pub mod token_tracker;

pub use confirmation::ConfirmationWaiter;
pub use dashboard::{DashboardSnapshot, LendingDashboard, RefreshReport};
pub use orchestrator::{ActionOutcome, TransactionOrchestrator};
pub use poller::PollingRefresher;
pub use position_reader::LendingPositionReader;
pub use status::StatusView;
pub use token_tracker::TokenAllowanceTracker;
