//! Token allowance manager.
//!
//! Always re-approves instead of reading the current allowance first;
//! repeated approvals with the same amount are idempotent at the protocol
//! level. Called immediately before every transfer-consuming operation.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use std::sync::Arc;
use tracing::info;

use crate::errors::WorkflowError;
use crate::execution::contracts::IERC20;
use crate::execution::tx_submitter::TxSubmitter;

/// Issues ERC20 approvals on behalf of the workflow owner.
pub struct AllowanceManager {
    submitter: Arc<TxSubmitter>,
    owner: Address,
}

impl AllowanceManager {
    pub fn new(submitter: Arc<TxSubmitter>, owner: Address) -> Self {
        Self { submitter, owner }
    }

    /// Encode calldata for `ERC20.approve(spender, amount)`.
    pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
        let call = IERC20::approveCall { spender, amount };
        Bytes::from(call.abi_encode())
    }

    /// Approve `spender` to transfer `amount` of `token` from the owner and
    /// wait for one confirmation.
    ///
    /// Fails with [`WorkflowError::ApprovalRejected`] if the transaction
    /// reverts or times out.
    pub async fn ensure_allowance(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), WorkflowError> {
        let mut tx = TransactionRequest::default();
        tx.set_from(self.owner);
        tx.set_to(token);
        tx.set_value(U256::ZERO);
        tx.set_input(Self::approve_calldata(spender, amount));

        self.submitter
            .submit_and_wait(tx)
            .await
            .map_err(|e| WorkflowError::ApprovalRejected {
                spender,
                reason: e.revert_reason(),
            })?;

        info!(token = %token, spender = %spender, amount = %amount, "allowance approved");
        Ok(())
    }
}
