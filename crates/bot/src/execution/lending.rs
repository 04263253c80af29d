//! Aave V2 LendingPool client — typed reads plus confirmed mutations.
//!
//! Every mutating call (`deposit`, `borrow`, `repay`, `withdraw`) blocks
//! until its transaction reaches one confirmation before returning, so a
//! following [`LendingClient::get_account_data`] observes the mutation's
//! effect. That confirmation-before-read discipline is the workflow's only
//! ordering mechanism.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use std::sync::Arc;
use tracing::info;

use crate::errors::WorkflowError;
use crate::execution::contracts::{ILendingPool, ILendingPoolAddressesProvider};
use crate::execution::tx_submitter::{HttpProvider, TxSubmitter};
use crate::types::Position;

/// Client for one Aave V2 LendingPool, acting for a single user.
pub struct LendingClient {
    pool: ILendingPool::ILendingPoolInstance<HttpProvider>,
    pool_address: Address,
    submitter: Arc<TxSubmitter>,
    user: Address,
    rate_mode: u8,
    referral_code: u16,
}

impl LendingClient {
    /// Resolve the live LendingPool address from the addresses provider and
    /// construct a client bound to it.
    pub async fn discover(
        provider: HttpProvider,
        addresses_provider: Address,
        submitter: Arc<TxSubmitter>,
        user: Address,
        rate_mode: u8,
        referral_code: u16,
    ) -> Result<Self, WorkflowError> {
        let resolver = ILendingPoolAddressesProvider::new(addresses_provider, provider.clone());
        let pool_address = resolver.getLendingPool().call().await.map_err(|e| {
            WorkflowError::Rpc {
                reason: format!("getLendingPool call failed: {e}"),
            }
        })?;

        info!(pool = %pool_address, "LendingPool resolved from addresses provider");

        Ok(Self {
            pool: ILendingPool::new(pool_address, provider),
            pool_address,
            submitter,
            user,
            rate_mode,
            referral_code,
        })
    }

    /// Address of the resolved LendingPool — the spender for deposit and
    /// repay approvals.
    pub fn pool_address(&self) -> Address {
        self.pool_address
    }

    // -----------------------------------------------------------------------
    // Mutations (each blocks until one confirmation)
    // -----------------------------------------------------------------------

    /// Deposit `amount` of `asset` as collateral.
    pub async fn deposit(&self, asset: Address, amount: U256) -> Result<(), WorkflowError> {
        let call = ILendingPool::depositCall {
            asset,
            amount,
            onBehalfOf: self.user,
            referralCode: self.referral_code,
        };
        self.send(Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| WorkflowError::DepositRejected {
                reason: e.revert_reason(),
            })?;

        info!(asset = %asset, amount = %amount, "deposit confirmed");
        Ok(())
    }

    /// Borrow `amount` of `asset` against deposited collateral.
    pub async fn borrow(&self, asset: Address, amount: U256) -> Result<(), WorkflowError> {
        let call = ILendingPool::borrowCall {
            asset,
            amount,
            interestRateMode: U256::from(self.rate_mode),
            referralCode: self.referral_code,
            onBehalfOf: self.user,
        };
        self.send(Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| WorkflowError::BorrowRejected {
                reason: e.revert_reason(),
            })?;

        info!(asset = %asset, amount = %amount, "borrow confirmed");
        Ok(())
    }

    /// Repay up to `amount` of outstanding `asset` debt.
    ///
    /// Over-repayment is passed through: the pool clamps the amount to the
    /// actual debt. Returns the amount effectively repaid.
    pub async fn repay(&self, asset: Address, amount: U256) -> Result<U256, WorkflowError> {
        let call = ILendingPool::repayCall {
            asset,
            amount,
            rateMode: U256::from(self.rate_mode),
            onBehalfOf: self.user,
        };
        let output = self
            .send(Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| WorkflowError::RepayRejected {
                reason: e.revert_reason(),
            })?;

        let repaid = ILendingPool::repayCall::abi_decode_returns(&output).unwrap_or(amount);
        info!(asset = %asset, requested = %amount, repaid = %repaid, "repay confirmed");
        Ok(repaid)
    }

    /// Withdraw `amount` of `asset` collateral to `to`. Returns the amount
    /// withdrawn.
    pub async fn withdraw(
        &self,
        asset: Address,
        amount: U256,
        to: Address,
    ) -> Result<U256, WorkflowError> {
        let call = ILendingPool::withdrawCall { asset, amount, to };
        let output = self
            .send(Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| WorkflowError::WithdrawRejected {
                reason: e.revert_reason(),
            })?;

        let withdrawn = ILendingPool::withdrawCall::abi_decode_returns(&output).unwrap_or(amount);
        info!(asset = %asset, withdrawn = %withdrawn, "withdraw confirmed");
        Ok(withdrawn)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch the user's current aggregate position.
    ///
    /// Must be called after every confirmed mutation to obtain a fresh
    /// snapshot before the next amount computation.
    pub async fn get_account_data(&self) -> Result<Position, WorkflowError> {
        let result = self
            .pool
            .getUserAccountData(self.user)
            .call()
            .await
            .map_err(|e| WorkflowError::Rpc {
                reason: format!("getUserAccountData call failed: {e}"),
            })?;

        Ok(Position {
            total_collateral_eth: result.totalCollateralETH,
            total_debt_eth: result.totalDebtETH,
            available_borrow_eth: result.availableBorrowsETH,
            liquidation_threshold_bps: result.currentLiquidationThreshold,
            ltv_bps: result.ltv,
            health_factor: result.healthFactor,
        })
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    async fn send(&self, calldata: Bytes) -> Result<Bytes, WorkflowError> {
        let mut tx = TransactionRequest::default();
        tx.set_from(self.user);
        tx.set_to(self.pool_address);
        tx.set_value(U256::ZERO);
        tx.set_input(calldata);
        self.submitter.submit_and_wait(tx).await
    }
}
