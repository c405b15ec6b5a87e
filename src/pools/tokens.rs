//! Token discovery for a pool: cache, vault, creation transaction, placeholders

use alloy::{
    primitives::{Address, B256, Bytes, U256},
    sol_types::SolCall,
};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use crate::{
    abi::{IERC20, IRangePoolFactory},
    network::ContractReader,
    pools::{fallback::guarded_call, reserves::get_pool_tokens},
    types::{SnapshotPool, TokenDescriptor, TokenSource, DEFAULT_TOKEN_DECIMALS, UNKNOWN},
};

/// Token lists keyed by pool address, shared across fetches.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<Address, Vec<TokenDescriptor>>>>,
}

impl TokenCache {
    pub async fn get(&self, pool: Address) -> Option<Vec<TokenDescriptor>> {
        self.inner.read().await.get(&pool).cloned()
    }

    pub async fn insert(&self, pool: Address, tokens: Vec<TokenDescriptor>) {
        self.inner.write().await.insert(pool, tokens);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Seeds from a previously written snapshot. Pools with any non-address token
    /// entry are skipped so they get rediscovered. Returns the number of pools seeded.
    pub async fn seed_from_snapshot(&self, pools: &[SnapshotPool]) -> usize {
        let mut cache = self.inner.write().await;
        let mut seeded = 0;
        for pool in pools {
            if pool.tokens.is_empty() {
                continue;
            }
            let tokens: Option<Vec<_>> = pool.tokens.iter().map(|t| t.to_descriptor()).collect();
            if let Some(tokens) = tokens {
                cache.insert(pool.pool_address, tokens);
                seeded += 1;
            }
        }
        seeded
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveredTokens {
    pub tokens: Vec<TokenDescriptor>,
    /// Only filled by the vault path.
    pub balances: Vec<U256>,
}

impl DiscoveredTokens {
    pub fn is_placeholder(&self) -> bool {
        self.tokens.iter().any(TokenDescriptor::is_placeholder)
    }
}

/// Inputs the pool reads produce for discovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryHints<'a> {
    pub vault: Option<Address>,
    pub pool_id: Option<B256>,
    pub creation_input: Option<&'a Bytes>,
    /// Length of the weight array, used to size placeholders.
    pub token_count: usize,
}

pub async fn discover_tokens(
    reader: &dyn ContractReader,
    cache: &TokenCache,
    pool: Address,
    hints: DiscoveryHints<'_>,
) -> DiscoveredTokens {
    if let Some(tokens) = cache.get(pool).await {
        debug!(%pool, count = tokens.len(), "Tokens served from cache");
        return DiscoveredTokens { tokens, balances: Vec::new() };
    }

    if let (Some(vault), Some(pool_id)) = (hints.vault, hints.pool_id) {
        match get_pool_tokens(reader, vault, pool_id).await {
            Ok(registered) if !registered.tokens.is_empty() => {
                let tokens = describe_tokens(reader, &registered.tokens, TokenSource::Vault).await;
                cache.insert(pool, tokens.clone()).await;
                return DiscoveredTokens { tokens, balances: registered.balances };
            }
            Ok(_) => debug!(%pool, "Vault has no tokens registered for pool"),
            Err(e) => warn!("⚠️ Vault token lookup failed for {}: {:#}", pool, e),
        }
    }

    if let Some(addresses) = hints.creation_input.and_then(tokens_from_creation_input) {
        let tokens = describe_tokens(reader, &addresses, TokenSource::CreationTransaction).await;
        cache.insert(pool, tokens.clone()).await;
        return DiscoveredTokens { tokens, balances: Vec::new() };
    }

    warn!(
        "⚠️ Could not resolve tokens for {}, using {} placeholders",
        pool, hints.token_count
    );
    DiscoveredTokens {
        tokens: placeholder_tokens(hints.token_count),
        balances: Vec::new(),
    }
}

/// Token list passed to the factory `create` call, if `input` is one.
pub fn tokens_from_creation_input(input: &Bytes) -> Option<Vec<Address>> {
    let call = IRangePoolFactory::createCall::abi_decode(input, true).ok()?;
    if call.tokens.is_empty() {
        return None;
    }
    Some(call.tokens)
}

pub fn placeholder_tokens(count: usize) -> Vec<TokenDescriptor> {
    (0..count).map(TokenDescriptor::placeholder).collect()
}

pub async fn describe_tokens(
    reader: &dyn ContractReader,
    tokens: &[Address],
    source: TokenSource,
) -> Vec<TokenDescriptor> {
    join_all(tokens.iter().map(|token| describe_token(reader, *token, source))).await
}

/// Reads ERC-20 metadata; each field falls back independently.
pub async fn describe_token(reader: &dyn ContractReader, token: Address, source: TokenSource) -> TokenDescriptor {
    let (name, symbol, decimals) = tokio::join!(
        guarded_call(reader, token, "name", IERC20::nameCall {}, UNKNOWN.to_string(), |r| r._0),
        guarded_call(reader, token, "symbol", IERC20::symbolCall {}, UNKNOWN.to_string(), |r| r._0),
        guarded_call(reader, token, "decimals", IERC20::decimalsCall {}, DEFAULT_TOKEN_DECIMALS, |r| r._0),
    );

    TokenDescriptor {
        address: token,
        name: name.value,
        symbol: symbol.value,
        decimals: decimals.value,
        source,
    }
}
