//! Compile-time ABI definitions for on-chain contracts via Alloy `sol!`.
//! Encoding mistakes surface as compile errors rather than runtime reverts.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

// ---------------------------------------------------------------------------
// Aave V2 LendingPool
// ---------------------------------------------------------------------------

sol! {
    /// Aave V2 LendingPoolAddressesProvider — resolves the live pool address.
    #[sol(rpc)]
    interface ILendingPoolAddressesProvider {
        function getLendingPool() external view returns (address);
    }
}

sol! {
    /// Aave V2 LendingPool — deposit/borrow/repay/withdraw entry point.
    #[sol(rpc)]
    interface ILendingPool {
        /// Deposit `amount` of `asset` as collateral.
        function deposit(
            address asset,
            uint256 amount,
            address onBehalfOf,
            uint16 referralCode
        ) external;

        /// Borrow `amount` of `asset` against deposited collateral.
        function borrow(
            address asset,
            uint256 amount,
            uint256 interestRateMode,
            uint16 referralCode,
            address onBehalfOf
        ) external;

        /// Repay outstanding debt. The pool clamps `amount` to the actual
        /// debt and returns the amount effectively repaid.
        function repay(
            address asset,
            uint256 amount,
            uint256 rateMode,
            address onBehalfOf
        ) external returns (uint256);

        /// Withdraw collateral to `to`. Returns the amount withdrawn.
        function withdraw(
            address asset,
            uint256 amount,
            address to
        ) external returns (uint256);

        /// Aggregated user position data, ETH-denominated (WAD).
        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralETH,
            uint256 totalDebtETH,
            uint256 availableBorrowsETH,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );
    }
}

// ---------------------------------------------------------------------------
// Chainlink Aggregator V3
// ---------------------------------------------------------------------------

sol! {
    /// Chainlink price feed interface.
    #[sol(rpc)]
    interface IAggregatorV3 {
        function latestRoundData() external view returns (
            uint80 roundId,
            int256 answer,
            uint256 startedAt,
            uint256 updatedAt,
            uint80 answeredInRound
        );

        function decimals() external view returns (uint8);
    }
}

// ---------------------------------------------------------------------------
// Uniswap V3
// ---------------------------------------------------------------------------

sol! {
    /// Uniswap V3 factory — pool lookup by pair and fee tier.
    #[sol(rpc)]
    interface IUniswapV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
    }
}

sol! {
    /// Uniswap V3 pool immutable accessors.
    #[sol(rpc)]
    interface IUniswapV3Pool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function fee() external view returns (uint24);
    }
}

sol! {
    /// Uniswap V3 SwapRouter — single-pool exact-input/exact-output swaps.
    #[sol(rpc)]
    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountOut;
            uint256 amountInMaximum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams calldata params)
            external payable returns (uint256 amountOut);

        function exactOutputSingle(ExactOutputSingleParams calldata params)
            external payable returns (uint256 amountIn);
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

sol! {
    /// Minimal ERC20 surface used by the workflow.
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
    }
}

sol! {
    /// WETH — payable deposit wraps native ETH 1:1.
    #[sol(rpc)]
    interface IWeth {
        function deposit() external payable;
        function balanceOf(address owner) external view returns (uint256);
    }
}
