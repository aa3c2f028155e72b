//! Chain Adapters - EVM Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - Wallet session (signer + provider) with chain pinning
//! - Lending pool and ERC-20 token bindings
//! - Bounded receipt polling for confirmations
//! - Startup validation of configured contract addresses

pub mod confirmations;
pub mod contracts;
pub mod errors;
pub mod session;
pub mod validator;

pub use confirmations::ReceiptWatcher;
pub use contracts::{Erc20Token, LendingPool};
pub use session::{SignerProvider, WalletSession};
pub use validator::ContractValidator;
