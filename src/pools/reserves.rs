//! Vault-held pool tokens and balances

use alloy::primitives::{Address, B256, U256};
use anyhow::{Context, Result};
use crate::{
    abi::IVault,
    errors::{PoolError, PoolResult},
    network::{read_contract, ContractReader},
};

/// Tokens registered for a pool in the vault with their balances, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultPoolTokens {
    pub tokens: Vec<Address>,
    pub balances: Vec<U256>,
}

pub async fn get_pool_tokens(reader: &dyn ContractReader, vault: Address, pool_id: B256) -> Result<VaultPoolTokens> {
    let result = read_contract(reader, vault, IVault::getPoolTokensCall { poolId: pool_id })
        .await
        .context("Failed to get pool tokens from vault")?;

    if result.tokens.len() != result.balances.len() {
        anyhow::bail!(
            "vault returned {} tokens but {} balances",
            result.tokens.len(),
            result.balances.len()
        );
    }

    Ok(VaultPoolTokens {
        tokens: result.tokens,
        balances: result.balances,
    })
}

/// Strict variant for value-moving paths; failures are typed, never defaulted.
pub async fn get_pool_tokens_enhanced(
    reader: &dyn ContractReader,
    vault: Address,
    pool_id: B256,
) -> PoolResult<VaultPoolTokens> {
    get_pool_tokens(reader, vault, pool_id)
        .await
        .map_err(|source| PoolError::Contract {
            contract: vault,
            message: format!("Failed to read balances for pool {}", pool_id),
            source,
        })
}
