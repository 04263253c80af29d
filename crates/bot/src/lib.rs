//! Aave V2 borrow/unwind workflow bot.
//!
//! Drives one linear workflow against Aave V2 and Uniswap V3 on Ethereum
//! mainnet: wrap ETH → deposit WETH → borrow DAI against it → repay → swap
//! collateral for the residual debt → repay fully → withdraw.
//!
//! The crate is split into a read/encode execution layer (`execution`), pure
//! amount-sizing arithmetic (`core::sizing`), and an explicit state machine
//! that sequences the external calls (`core::workflow`).

pub mod config;
pub mod constants;
pub mod core;
pub mod errors;
pub mod execution;
pub mod logging;
pub mod types;
