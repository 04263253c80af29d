use alloy::primitives::Address;
use thiserror::Error;

/// Typed error hierarchy for the unwind workflow.
///
/// Every stage failure aborts the whole run with the originating variant
/// intact — there is no local recovery or compensation. Application code
/// wraps with `anyhow::Context` for propagation.
#[derive(Error, Debug)]
pub enum WorkflowError {
    // -- Price feed ---------------------------------------------------------
    #[error("price feed unavailable: {reason}")]
    OracleUnavailable { reason: String },

    // -- Allowance ----------------------------------------------------------
    #[error("token approval rejected for spender {spender}: {reason}")]
    ApprovalRejected { spender: Address, reason: String },

    // -- Lending pool -------------------------------------------------------
    #[error("deposit rejected: {reason}")]
    DepositRejected { reason: String },

    #[error("borrow rejected: {reason}")]
    BorrowRejected { reason: String },

    #[error("repay rejected: {reason}")]
    RepayRejected { reason: String },

    #[error("withdraw rejected: {reason}")]
    WithdrawRejected { reason: String },

    // -- Swap ---------------------------------------------------------------
    #[error("no pool for pair {token_a}/{token_b} at fee tier {fee_tier}")]
    PoolNotFound {
        token_a: Address,
        token_b: Address,
        fee_tier: u32,
    },

    #[error("exact-output swap exceeded maximum input: {reason}")]
    SwapExceededMaximum { reason: String },

    #[error("exact-input swap returned less than minimum output: {reason}")]
    SwapBelowMinimum { reason: String },

    #[error("swap deadline expired (deadline {deadline}, now {now})")]
    SwapDeadlineExpired { deadline: u64, now: u64 },

    // -- Transaction layer --------------------------------------------------
    #[error("transaction simulation failed: {reason}")]
    SimulationFailed { reason: String },

    #[error("transaction reverted: {reason} (tx: {tx_hash})")]
    TxReverted { tx_hash: String, reason: String },

    #[error("transaction timed out after {timeout_seconds}s (tx: {tx_hash})")]
    TxTimeout {
        tx_hash: String,
        timeout_seconds: u64,
    },

    #[error("rpc call failed: {reason}")]
    Rpc { reason: String },

    #[error("precondition failed in {stage}: {reason}")]
    Precondition { stage: &'static str, reason: String },

    // -- Configuration ------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    Alloy(#[from] alloy::transports::TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WorkflowError {
    /// Revert reason or message of a transaction-layer failure, used by the
    /// domain clients to fill their rejection variants.
    pub fn revert_reason(&self) -> String {
        match self {
            WorkflowError::TxReverted { reason, .. } => reason.clone(),
            WorkflowError::SimulationFailed { reason } => reason.clone(),
            other => other.to_string(),
        }
    }
}
