//! Workflow orchestrator — an explicit state machine over the borrow/unwind
//! sequence.
//!
//! Each transition is driven by exactly one confirmed external operation and
//! checks its own precondition instead of assuming it from call order. Any
//! failure aborts the run with the originating error; funds left mid-way sit
//! safely in the lending protocol and can be recovered manually.
//!
//! Amount computations always start from a freshly fetched position and a
//! freshly fetched quote: both are stale after one use.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use std::sync::Arc;
use tracing::info;

use crate::config::WorkflowConfig;
use crate::core::sizing;
use crate::errors::WorkflowError;
use crate::execution::allowance::AllowanceManager;
use crate::execution::contracts::{IERC20, IWeth};
use crate::execution::lending::LendingClient;
use crate::execution::price_feed::PriceFeedClient;
use crate::execution::swap::{deadline_after, SwapExecutor};
use crate::execution::tx_submitter::{HttpProvider, TxSubmitter};
use crate::types::Position;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Workflow progress. Variants carry the confirmed amount the next
/// transition depends on; everything else is re-fetched fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing has happened yet.
    Start,
    /// Native ETH wrapped; collateral balance confirmed.
    Funded { collateral_balance: U256 },
    /// Collateral deposited into the lending pool.
    Deposited { deposited: U256 },
    /// Borrowed asset drawn against the collateral.
    Borrowed { borrowed: U256 },
    /// The borrowed amount has been repaid; interest dust remains.
    PartiallyRepaid,
    /// Collateral swapped for exactly the residual debt.
    Swapped { acquired: U256 },
    /// All debt repaid.
    FullyRepaid,
    /// Collateral withdrawn from the pool.
    Withdrawn { withdrawn: U256 },
    /// Terminal.
    Done,
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Start => "Start",
            WorkflowState::Funded { .. } => "Funded",
            WorkflowState::Deposited { .. } => "Deposited",
            WorkflowState::Borrowed { .. } => "Borrowed",
            WorkflowState::PartiallyRepaid => "PartiallyRepaid",
            WorkflowState::Swapped { .. } => "Swapped",
            WorkflowState::FullyRepaid => "FullyRepaid",
            WorkflowState::Withdrawn { .. } => "Withdrawn",
            WorkflowState::Done => "Done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Done)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Top-level sequencer for the deposit → borrow → repay → swap → repay →
/// withdraw workflow.
pub struct WorkflowOrchestrator {
    lending: LendingClient,
    swap: SwapExecutor,
    feed: PriceFeedClient,
    allowance: AllowanceManager,
    submitter: Arc<TxSubmitter>,
    provider: HttpProvider,
    user: Address,
    /// Volatile collateral token (WETH).
    collateral: Address,
    /// Stable borrowed token (DAI).
    borrowed: Address,
    cfg: WorkflowConfig,
}

impl WorkflowOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lending: LendingClient,
        swap: SwapExecutor,
        feed: PriceFeedClient,
        allowance: AllowanceManager,
        submitter: Arc<TxSubmitter>,
        provider: HttpProvider,
        user: Address,
        collateral: Address,
        borrowed: Address,
        cfg: WorkflowConfig,
    ) -> Self {
        Self {
            lending,
            swap,
            feed,
            allowance,
            submitter,
            provider,
            user,
            collateral,
            borrowed,
            cfg,
        }
    }

    /// Run the workflow from `Start` to `Done`, fail-fast.
    pub async fn run(&self) -> Result<(), WorkflowError> {
        let mut state = WorkflowState::Start;
        info!(state = state.name(), "workflow starting");

        while !state.is_terminal() {
            state = self.step(state).await?;
            info!(state = state.name(), "state entered");
        }

        Ok(())
    }

    /// One transition: exactly one confirmed external operation per state.
    async fn step(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        match state {
            WorkflowState::Start => self.acquire_collateral().await,
            WorkflowState::Funded { collateral_balance } => {
                self.deposit_collateral(collateral_balance).await
            }
            WorkflowState::Deposited { .. } => self.borrow_against_collateral().await,
            WorkflowState::Borrowed { borrowed } => self.repay_borrowed(borrowed).await,
            WorkflowState::PartiallyRepaid => self.swap_for_residual_debt().await,
            WorkflowState::Swapped { acquired } => self.repay_residual(acquired).await,
            WorkflowState::FullyRepaid => self.withdraw_collateral().await,
            WorkflowState::Withdrawn { .. } => self.report_final_balances().await,
            WorkflowState::Done => Ok(WorkflowState::Done),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start → Funded: wrap native ETH into the collateral token.
    async fn acquire_collateral(&self) -> Result<WorkflowState, WorkflowError> {
        let funding = self.cfg.funding_amount()?;

        let mut tx = TransactionRequest::default();
        tx.set_from(self.user);
        tx.set_to(self.collateral);
        tx.set_value(funding);
        tx.set_input(Bytes::from(IWeth::depositCall {}.abi_encode()));
        self.submitter.submit_and_wait(tx).await?;

        let balance = self.token_balance(self.collateral).await?;
        if balance < funding {
            return Err(WorkflowError::Precondition {
                stage: "Funded",
                reason: format!("collateral balance {balance} below funding amount {funding}"),
            });
        }

        info!(balance = %balance, "collateral acquired");
        Ok(WorkflowState::Funded {
            collateral_balance: balance,
        })
    }

    /// Funded → Deposited: approve the pool, deposit a fraction of the
    /// collateral balance.
    async fn deposit_collateral(&self, balance: U256) -> Result<WorkflowState, WorkflowError> {
        let amount = balance / U256::from(self.cfg.deposit_divisor);
        if amount.is_zero() {
            return Err(WorkflowError::Precondition {
                stage: "Deposited",
                reason: "deposit amount is zero".into(),
            });
        }

        self.allowance
            .ensure_allowance(self.collateral, self.lending.pool_address(), amount)
            .await?;
        self.lending.deposit(self.collateral, amount).await?;

        Ok(WorkflowState::Deposited { deposited: amount })
    }

    /// Deposited → Borrowed: size the borrow from fresh account data and a
    /// fresh quote, discounted for safety.
    async fn borrow_against_collateral(&self) -> Result<WorkflowState, WorkflowError> {
        let position = self.lending.get_account_data().await?;
        info!(position = %position, "position after deposit");

        check_borrow_capacity(&position)?;

        let quote = self.feed.get_quote().await?;
        info!(quote = %quote, "quote for borrow sizing");

        let amount = sizing::borrow_amount_from_capacity(
            position.available_borrow_eth,
            quote.rate,
            self.cfg.borrow_discount_bps,
        );
        if amount.is_zero() {
            return Err(WorkflowError::BorrowRejected {
                reason: "computed borrow amount is zero".into(),
            });
        }

        self.lending.borrow(self.borrowed, amount).await?;
        Ok(WorkflowState::Borrowed { borrowed: amount })
    }

    /// Borrowed → PartiallyRepaid: repay what was borrowed; accrued interest
    /// leaves residual debt.
    async fn repay_borrowed(&self, borrowed: U256) -> Result<WorkflowState, WorkflowError> {
        self.allowance
            .ensure_allowance(self.borrowed, self.lending.pool_address(), borrowed)
            .await?;
        self.lending.repay(self.borrowed, borrowed).await?;
        Ok(WorkflowState::PartiallyRepaid)
    }

    /// PartiallyRepaid → Swapped: convert the residual debt to borrowed-asset
    /// units from a fresh quote, then buy exactly that amount with
    /// over-provisioned collateral input.
    async fn swap_for_residual_debt(&self) -> Result<WorkflowState, WorkflowError> {
        let position = self.lending.get_account_data().await?;
        info!(position = %position, "position before unwind swap");

        if !swap_required(&position) {
            info!("no residual debt — skipping swap");
            return Ok(WorkflowState::FullyRepaid);
        }

        let quote = self.feed.get_quote().await?;
        info!(quote = %quote, "quote for debt conversion");

        let debt_amount = sizing::debt_in_borrow_asset(position.total_debt_eth, quote.rate);
        let amount_in_max = sizing::overprovision(
            position.total_debt_eth,
            self.cfg.overprovision_numerator,
            self.cfg.overprovision_denominator,
        );

        let pool = self
            .swap
            .resolve_pool(self.collateral, self.borrowed, self.cfg.pool_fee_tier)
            .await?;
        let immutables = self.swap.get_immutables(pool).await?;
        info!(
            pool = %pool,
            token0 = %immutables.token0,
            token1 = %immutables.token1,
            fee_tier = immutables.fee_tier,
            "pool resolved for unwind swap"
        );

        self.allowance
            .ensure_allowance(self.collateral, self.swap.router_address(), amount_in_max)
            .await?;

        let deadline = deadline_after(self.cfg.swap_deadline_seconds);
        let spent = self
            .swap
            .swap_exact_output(
                self.collateral,
                self.borrowed,
                immutables.fee_tier,
                debt_amount,
                amount_in_max,
                self.user,
                deadline,
            )
            .await?;

        info!(spent = %spent, acquired = %debt_amount, "unwind swap complete");
        Ok(WorkflowState::Swapped {
            acquired: debt_amount,
        })
    }

    /// Swapped → FullyRepaid: repay the acquired amount. A slight over-repay
    /// passes through to the pool's own clamping.
    async fn repay_residual(&self, acquired: U256) -> Result<WorkflowState, WorkflowError> {
        self.allowance
            .ensure_allowance(self.borrowed, self.lending.pool_address(), acquired)
            .await?;
        self.lending.repay(self.borrowed, acquired).await?;
        Ok(WorkflowState::FullyRepaid)
    }

    /// FullyRepaid → Withdrawn: withdraw the full collateral value as
    /// reported by the pool — its accounting, not ours.
    async fn withdraw_collateral(&self) -> Result<WorkflowState, WorkflowError> {
        let position = self.lending.get_account_data().await?;
        info!(position = %position, "position before withdrawal");

        let withdrawn = self
            .lending
            .withdraw(self.collateral, position.total_collateral_eth, self.user)
            .await?;
        Ok(WorkflowState::Withdrawn { withdrawn })
    }

    /// Withdrawn → Done: log final token balances.
    async fn report_final_balances(&self) -> Result<WorkflowState, WorkflowError> {
        let collateral_balance = self.token_balance(self.collateral).await?;
        let borrowed_balance = self.token_balance(self.borrowed).await?;
        info!(
            collateral_balance = %collateral_balance,
            borrowed_balance = %borrowed_balance,
            "workflow complete"
        );
        Ok(WorkflowState::Done)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    async fn token_balance(&self, token: Address) -> Result<U256, WorkflowError> {
        let erc20 = IERC20::new(token, self.provider.clone());
        erc20
            .balanceOf(self.user)
            .call()
            .await
            .map_err(|e| WorkflowError::Rpc {
                reason: format!("balanceOf call failed: {e}"),
            })
    }
}

// ---------------------------------------------------------------------------
// Stage gate decisions
// ---------------------------------------------------------------------------

/// Post-deposit borrow gate: zero remaining capacity aborts the run.
fn check_borrow_capacity(position: &Position) -> Result<(), WorkflowError> {
    if position.available_borrow_eth.is_zero() {
        return Err(WorkflowError::BorrowRejected {
            reason: "no borrow capacity after deposit".into(),
        });
    }
    Ok(())
}

/// Whether the unwind swap is needed at all: no residual debt after the
/// partial repay means the swap stage is skipped.
fn swap_required(position: &Position) -> bool {
    position.has_debt()
}
