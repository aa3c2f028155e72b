//! Lending Pool and Token Contract Bindings
//!
//! Implements the `TokenContract` and `LendingContract` ports with typed
//! `sol!` bindings over the shared wallet session. Addresses come from
//! `config.toml`; nothing here is a module-level constant.
//!
//! Reads return decoded values. Writes return the transaction hash as soon
//! as the node accepts the transaction; confirmation is `ReceiptWatcher`'s
//! job. No retries at this layer.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::domain::LendingError;
use crate::ports::chain_client::{LenderInfoRaw, LendingContract, LockStatusRaw, TokenContract};

use super::errors::{classify_write_error, read_error};
use super::session::WalletSession;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface ILendingPool {
        function getLenderInfo(address lender) external view returns (uint256 depositAmount, uint256 pendingRewards);
        function getLockStatus(address lender) external view returns (bool isLocked, uint256 lockEndTime, uint256 timeRemaining);
        function deposit(uint256 amount) external;
        function withdraw(uint256 amount) external;
    }
}

/// ERC-20 deposit token bound to the wallet session.
pub struct Erc20Token {
    /// Shared signer-backed session.
    session: Arc<WalletSession>,
    /// Token contract address from config.
    address: Address,
}

impl Erc20Token {
    pub fn new(session: Arc<WalletSession>, address: Address) -> Self {
        Self { session, address }
    }
}

#[async_trait]
impl TokenContract for Erc20Token {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self), fields(token = %self.address))]
    async fn decimals(&self) -> Result<u8, LendingError> {
        let token = IERC20::new(self.address, self.session.provider().clone());
        let decimals = token
            .decimals()
            .call()
            .await
            .map_err(|e| read_error("decimals", &e))?
            ._0;

        debug!(decimals, "Token decimals read");
        Ok(decimals)
    }

    #[instrument(skip(self), fields(token = %self.address))]
    async fn balance_of(&self, account: Address) -> Result<U256, LendingError> {
        let token = IERC20::new(self.address, self.session.provider().clone());
        Ok(token
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| read_error("balanceOf", &e))?
            ._0)
    }

    #[instrument(skip(self), fields(token = %self.address))]
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, LendingError> {
        let token = IERC20::new(self.address, self.session.provider().clone());
        Ok(token
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| read_error("allowance", &e))?
            ._0)
    }

    #[instrument(skip(self), fields(token = %self.address))]
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, LendingError> {
        self.session.verify_chain().await?;

        let token = IERC20::new(self.address, self.session.provider().clone());
        let pending = token
            .approve(spender, amount)
            .send()
            .await
            .map_err(classify_write_error)?;

        let tx_hash = *pending.tx_hash();
        info!(tx = %tx_hash, "Approval broadcast");
        Ok(tx_hash)
    }
}

/// Lending pool bound to the wallet session.
pub struct LendingPool {
    /// Shared signer-backed session.
    session: Arc<WalletSession>,
    /// Lending pool address from config.
    address: Address,
    /// Fixed gas limit for deposit/withdraw (estimated when `None`).
    gas_limit: Option<u64>,
}

impl LendingPool {
    pub fn new(session: Arc<WalletSession>, address: Address, gas_limit: Option<u64>) -> Self {
        Self {
            session,
            address,
            gas_limit,
        }
    }
}

#[async_trait]
impl LendingContract for LendingPool {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self), fields(pool = %self.address))]
    async fn lender_info(&self, account: Address) -> Result<LenderInfoRaw, LendingError> {
        let pool = ILendingPool::new(self.address, self.session.provider().clone());
        let info = pool
            .getLenderInfo(account)
            .call()
            .await
            .map_err(|e| read_error("getLenderInfo", &e))?;

        Ok(LenderInfoRaw {
            deposit_amount: info.depositAmount,
            pending_rewards: info.pendingRewards,
        })
    }

    #[instrument(skip(self), fields(pool = %self.address))]
    async fn lock_status(&self, account: Address) -> Result<LockStatusRaw, LendingError> {
        let pool = ILendingPool::new(self.address, self.session.provider().clone());
        let status = pool
            .getLockStatus(account)
            .call()
            .await
            .map_err(|e| read_error("getLockStatus", &e))?;

        Ok(LockStatusRaw {
            is_locked: status.isLocked,
            lock_end_time: u64::try_from(status.lockEndTime).unwrap_or(u64::MAX),
            time_remaining: u64::try_from(status.timeRemaining).unwrap_or(u64::MAX),
        })
    }

    #[instrument(skip(self), fields(pool = %self.address))]
    async fn deposit(&self, amount: U256) -> Result<TxHash, LendingError> {
        self.session.verify_chain().await?;

        let pool = ILendingPool::new(self.address, self.session.provider().clone());
        let mut call = pool.deposit(amount);
        if let Some(limit) = self.gas_limit {
            call = call.gas(limit);
        }
        let pending = call.send().await.map_err(classify_write_error)?;

        let tx_hash = *pending.tx_hash();
        info!(tx = %tx_hash, "Deposit broadcast");
        Ok(tx_hash)
    }

    #[instrument(skip(self), fields(pool = %self.address))]
    async fn withdraw(&self, amount: U256) -> Result<TxHash, LendingError> {
        self.session.verify_chain().await?;

        let pool = ILendingPool::new(self.address, self.session.provider().clone());
        let mut call = pool.withdraw(amount);
        if let Some(limit) = self.gas_limit {
            call = call.gas(limit);
        }
        let pending = call.send().await.map_err(classify_write_error)?;

        let tx_hash = *pending.tx_hash();
        info!(tx = %tx_hash, "Withdrawal broadcast");
        Ok(tx_hash)
    }
}
