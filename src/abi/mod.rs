//! Solidity bindings for the range pool, its factory, the vault and ERC-20 tokens

use alloy::sol;

sol! {
    #[derive(Debug)]
    interface IRangePool {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function getActualSupply() external view returns (uint256);
        function getSwapFeePercentage() external view returns (uint256);
        function getNormalizedWeights() external view returns (uint256[]);
        function getScalingFactors() external view returns (uint256[]);
        function getVirtualBalances() external view returns (uint256[]);
        function getInvariant() external view returns (uint256);
        function getLastPostJoinExitInvariant() external view returns (uint256);
        function getPoolId() external view returns (bytes32);
        function getOwner() external view returns (address);
        function getVault() external view returns (address);
        function getPausedState() external view returns (bool paused, uint256 pauseWindowEndTime, uint256 bufferPeriodEndTime);
        function inRecoveryMode() external view returns (bool);
        function getATHRateProduct() external view returns (uint256);
    }
}

sol! {
    #[derive(Debug)]
    interface IRangePoolFactory {
        event PoolCreated(address indexed pool);

        function create(
            string name,
            string symbol,
            address[] tokens,
            uint256[] normalizedWeights,
            address[] rateProviders,
            uint256 swapFeePercentage,
            address owner,
            bytes32 salt
        ) external returns (address);
    }
}

sol! {
    #[derive(Debug)]
    interface IVault {
        struct JoinPoolRequest {
            address[] assets;
            uint256[] maxAmountsIn;
            bytes userData;
            bool fromInternalBalance;
        }

        struct ExitPoolRequest {
            address[] assets;
            uint256[] minAmountsOut;
            bytes userData;
            bool toInternalBalance;
        }

        function getPoolTokens(bytes32 poolId) external view returns (address[] tokens, uint256[] balances, uint256 lastChangeBlock);
        function joinPool(bytes32 poolId, address sender, address recipient, JoinPoolRequest request) external payable;
        function exitPool(bytes32 poolId, address sender, address recipient, ExitPoolRequest request) external;
    }
}

sol! {
    #[derive(Debug)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}
