//! Pool share token holdings

use alloy::primitives::{Address, U256};
use crate::{
    abi::IRangePool,
    errors::{PoolError, PoolResult},
    network::{read_contract, ContractReader},
    types::PoolShare,
    utils::pool_share_percent,
};

pub async fn get_bpt_balance(reader: &dyn ContractReader, pool: Address, account: Address) -> PoolResult<U256> {
    read_contract(reader, pool, IRangePool::balanceOfCall { account })
        .await
        .map(|r| r._0)
        .map_err(|source| PoolError::Contract {
            contract: pool,
            message: format!("Failed to read pool share balance of {}", account),
            source,
        })
}

pub async fn get_total_supply(reader: &dyn ContractReader, pool: Address) -> PoolResult<U256> {
    read_contract(reader, pool, IRangePool::totalSupplyCall {})
        .await
        .map(|r| r._0)
        .map_err(|source| PoolError::Contract {
            contract: pool,
            message: "Failed to read total supply".to_string(),
            source,
        })
}

/// Caller's share of the pool. Both reads must succeed.
pub async fn get_pool_share(reader: &dyn ContractReader, pool: Address, account: Address) -> PoolResult<PoolShare> {
    let (balance, total_supply) = tokio::try_join!(
        get_bpt_balance(reader, pool, account),
        get_total_supply(reader, pool),
    )?;

    Ok(PoolShare {
        balance,
        total_supply,
        percent: pool_share_percent(balance, total_supply),
    })
}
