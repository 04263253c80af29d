//! Uniswap V3 swap executor — pool discovery, immutable resolution, and
//! exact-input / exact-output swap execution.
//!
//! Pool and fee resolution happen once per token pair per workflow run;
//! nothing is cached across runs.

use alloy::network::TransactionBuilder;
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::errors::WorkflowError;
use crate::execution::contracts::{ISwapRouter, IUniswapV3Factory, IUniswapV3Pool};
use crate::execution::tx_submitter::{HttpProvider, TxSubmitter};

/// Immutable parameters of a resolved pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolImmutables {
    pub token0: Address,
    pub token1: Address,
    pub fee_tier: u32,
}

/// Which bound an executed swap is constrained by, for failure mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapKind {
    ExactOutput,
    ExactInput,
}

/// Uniswap V3 factory + router client.
pub struct SwapExecutor {
    factory: IUniswapV3Factory::IUniswapV3FactoryInstance<HttpProvider>,
    router: Address,
    provider: HttpProvider,
    submitter: Arc<TxSubmitter>,
}

impl SwapExecutor {
    pub fn new(
        provider: HttpProvider,
        factory: Address,
        router: Address,
        submitter: Arc<TxSubmitter>,
    ) -> Self {
        Self {
            factory: IUniswapV3Factory::new(factory, provider.clone()),
            router,
            provider,
            submitter,
        }
    }

    /// Router address — the spender for swap input approvals.
    pub fn router_address(&self) -> Address {
        self.router
    }

    // -----------------------------------------------------------------------
    // Pool discovery
    // -----------------------------------------------------------------------

    /// Look up the pool for a token pair at a fee tier.
    ///
    /// Fails with [`WorkflowError::PoolNotFound`] when the factory returns
    /// the zero address.
    pub async fn resolve_pool(
        &self,
        token_a: Address,
        token_b: Address,
        fee_tier: u32,
    ) -> Result<Address, WorkflowError> {
        let pool = self
            .factory
            .getPool(token_a, token_b, U24::from(fee_tier))
            .call()
            .await
            .map_err(|e| WorkflowError::Rpc {
                reason: format!("getPool call failed: {e}"),
            })?;

        if pool == Address::ZERO {
            return Err(WorkflowError::PoolNotFound {
                token_a,
                token_b,
                fee_tier,
            });
        }

        debug!(pool = %pool, "pool resolved");
        Ok(pool)
    }

    /// Fetch a pool's immutable parameters.
    ///
    /// The three accessors are independent read-only queries, so they run
    /// concurrently — the only concurrency the workflow permits.
    pub async fn get_immutables(&self, pool: Address) -> Result<PoolImmutables, WorkflowError> {
        let pool = IUniswapV3Pool::new(pool, self.provider.clone());

        let token0_call = pool.token0();
        let token1_call = pool.token1();
        let fee_call = pool.fee();
        let (token0, token1, fee) = tokio::try_join!(
            token0_call.call(),
            token1_call.call(),
            fee_call.call(),
        )
        .map_err(|e| WorkflowError::Rpc {
            reason: format!("pool immutables call failed: {e}"),
        })?;

        Ok(PoolImmutables {
            token0,
            token1,
            fee_tier: fee.to::<u32>(),
        })
    }

    // -----------------------------------------------------------------------
    // Swap execution
    // -----------------------------------------------------------------------

    /// Swap for exactly `amount_out` of `token_out`, spending at most
    /// `amount_in_max` of `token_in`. Returns the input actually spent.
    pub async fn swap_exact_output(
        &self,
        token_in: Address,
        token_out: Address,
        fee_tier: u32,
        amount_out: U256,
        amount_in_max: U256,
        recipient: Address,
        deadline: u64,
    ) -> Result<U256, WorkflowError> {
        check_deadline(deadline, unix_now())?;

        let params = ISwapRouter::ExactOutputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            fee: U24::from(fee_tier),
            recipient,
            deadline: U256::from(deadline),
            amountOut: amount_out,
            amountInMaximum: amount_in_max,
            sqrtPriceLimitX96: U160::ZERO,
        };
        let call = ISwapRouter::exactOutputSingleCall { params };

        let output = self
            .send(Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| map_swap_failure(e, SwapKind::ExactOutput, deadline))?;

        let amount_in =
            ISwapRouter::exactOutputSingleCall::abi_decode_returns(&output).map_err(|e| {
                WorkflowError::Rpc {
                    reason: format!("failed to decode exactOutputSingle return: {e}"),
                }
            })?;

        info!(
            amount_out = %amount_out,
            amount_in = %amount_in,
            amount_in_max = %amount_in_max,
            "exact-output swap confirmed"
        );
        Ok(amount_in)
    }

    /// Swap exactly `amount_in` of `token_in`, receiving at least
    /// `amount_out_min` of `token_out`. Returns the output actually received.
    pub async fn swap_exact_input(
        &self,
        token_in: Address,
        token_out: Address,
        fee_tier: u32,
        amount_in: U256,
        amount_out_min: U256,
        recipient: Address,
        deadline: u64,
    ) -> Result<U256, WorkflowError> {
        check_deadline(deadline, unix_now())?;

        let params = ISwapRouter::ExactInputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            fee: U24::from(fee_tier),
            recipient,
            deadline: U256::from(deadline),
            amountIn: amount_in,
            amountOutMinimum: amount_out_min,
            sqrtPriceLimitX96: U160::ZERO,
        };
        let call = ISwapRouter::exactInputSingleCall { params };

        let output = self
            .send(Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| map_swap_failure(e, SwapKind::ExactInput, deadline))?;

        let amount_out =
            ISwapRouter::exactInputSingleCall::abi_decode_returns(&output).map_err(|e| {
                WorkflowError::Rpc {
                    reason: format!("failed to decode exactInputSingle return: {e}"),
                }
            })?;

        info!(
            amount_in = %amount_in,
            amount_out = %amount_out,
            amount_out_min = %amount_out_min,
            "exact-input swap confirmed"
        );
        Ok(amount_out)
    }

    /// The sender is always the submitter's signer; `recipient` inside the
    /// swap params is independent of it.
    async fn send(&self, calldata: Bytes) -> Result<Bytes, WorkflowError> {
        let mut tx = TransactionRequest::default();
        tx.set_from(self.submitter.signer_address());
        tx.set_to(self.router);
        tx.set_value(U256::ZERO);
        tx.set_input(calldata);
        self.submitter.submit_and_wait(tx).await
    }
}

// ---------------------------------------------------------------------------
// Deadline and failure mapping
// ---------------------------------------------------------------------------

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Deadline `window_seconds` from now, per swap submission.
pub fn deadline_after(window_seconds: u64) -> u64 {
    unix_now() + window_seconds
}

/// Reject a deadline that has already passed, before submission.
fn check_deadline(deadline: u64, now: u64) -> Result<(), WorkflowError> {
    if deadline <= now {
        return Err(WorkflowError::SwapDeadlineExpired { deadline, now });
    }
    Ok(())
}

/// Map a transaction-layer failure to the bound the swap violated.
///
/// The router's revert strings distinguish the cases: "Transaction too old"
/// for a missed deadline, otherwise an exact-output swap failed because the
/// required input exceeded `amountInMaximum` ("STF" / "Too much requested")
/// and an exact-input swap because the output fell below the minimum
/// ("Too little received"). Timeouts pass through unchanged.
fn map_swap_failure(err: WorkflowError, kind: SwapKind, deadline: u64) -> WorkflowError {
    if matches!(err, WorkflowError::TxTimeout { .. }) {
        return err;
    }

    let reason = err.revert_reason();
    if reason.contains("Transaction too old") {
        return WorkflowError::SwapDeadlineExpired {
            deadline,
            now: unix_now(),
        };
    }

    match kind {
        SwapKind::ExactOutput => WorkflowError::SwapExceededMaximum { reason },
        SwapKind::ExactInput => WorkflowError::SwapBelowMinimum { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_in_past_rejected() {
        let err = check_deadline(1_000, 1_000).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::SwapDeadlineExpired {
                deadline: 1_000,
                now: 1_000
            }
        ));
    }

    #[test]
    fn deadline_in_future_accepted() {
        assert!(check_deadline(1_600, 1_000).is_ok());
    }

    #[test]
    fn deadline_after_adds_window() {
        let now = unix_now();
        let deadline = deadline_after(600);
        assert!(deadline >= now + 600);
        // Window is 10 minutes, not more than a few seconds of clock skew.
        assert!(deadline <= now + 605);
    }

    #[test]
    fn exact_output_revert_maps_to_exceeded_maximum() {
        let err = WorkflowError::TxReverted {
            tx_hash: "0xabc".into(),
            reason: "STF".into(),
        };
        let mapped = map_swap_failure(err, SwapKind::ExactOutput, 0);
        assert!(matches!(mapped, WorkflowError::SwapExceededMaximum { .. }));
    }

    #[test]
    fn exact_input_revert_maps_to_below_minimum() {
        let err = WorkflowError::SimulationFailed {
            reason: "Too little received".into(),
        };
        let mapped = map_swap_failure(err, SwapKind::ExactInput, 0);
        assert!(matches!(mapped, WorkflowError::SwapBelowMinimum { .. }));
    }

    #[test]
    fn too_old_revert_maps_to_deadline_expired() {
        let err = WorkflowError::TxReverted {
            tx_hash: "0xabc".into(),
            reason: "Transaction too old".into(),
        };
        let mapped = map_swap_failure(err, SwapKind::ExactOutput, 123);
        assert!(matches!(
            mapped,
            WorkflowError::SwapDeadlineExpired { deadline: 123, .. }
        ));
    }

    #[test]
    fn timeout_passes_through() {
        let err = WorkflowError::TxTimeout {
            tx_hash: "0xabc".into(),
            timeout_seconds: 60,
        };
        let mapped = map_swap_failure(err, SwapKind::ExactOutput, 0);
        assert!(matches!(mapped, WorkflowError::TxTimeout { .. }));
    }
}
