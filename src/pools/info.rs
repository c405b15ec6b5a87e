//! Pool metadata retrieval

use alloy::primitives::{Address, Bytes, U256};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use crate::{
    abi::IRangePool,
    config::Config,
    errors::{PoolError, PoolResult},
    network::{BatchExecutor, ContractReader, ProviderChain},
    pools::{
        fallback::guarded_call,
        tokens::{discover_tokens, DiscoveryHints, TokenCache},
    },
    types::{PausedState, PoolCreationRecord, PoolDescriptor, UNKNOWN},
    ConcreteProvider,
};

/// Reads that, when all defaulted, mean nothing answered at the pool address.
const CORE_FIELDS: [&str; 4] = ["name", "symbol", "total_supply", "pool_id"];

pub struct PoolMetadataFetcher {
    reader: Arc<dyn ContractReader>,
    executor: BatchExecutor,
    token_cache: TokenCache,
}

impl PoolMetadataFetcher {
    pub fn new(reader: Arc<dyn ContractReader>, batch_size: usize) -> Self {
        Self {
            reader,
            executor: BatchExecutor::new(batch_size),
            token_cache: TokenCache::default(),
        }
    }

    pub fn from_config(provider: Arc<ConcreteProvider>, config: &Config) -> Self {
        Self::new(Arc::new(ProviderChain::new(provider)), config.fetch_batch_size)
    }

    pub fn with_token_cache(mut self, token_cache: TokenCache) -> Self {
        self.token_cache = token_cache;
        self
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }

    pub async fn fetch_one(&self, pool: Address) -> PoolResult<PoolDescriptor> {
        fetch_pool(self.reader.as_ref(), &self.token_cache, pool, None).await
    }

    /// Like [`fetch_one`](Self::fetch_one), with the creation input available for token discovery.
    pub async fn fetch_record(&self, record: &PoolCreationRecord) -> PoolResult<PoolDescriptor> {
        fetch_pool(
            self.reader.as_ref(),
            &self.token_cache,
            record.pool,
            record.creation_input.as_ref(),
        )
        .await
    }

    /// One descriptor per input address, in input order.
    pub async fn fetch_many(&self, pools: &[Address]) -> Vec<PoolDescriptor> {
        fetch_many_with(&self.executor, pools.iter().copied(), |pool| async move {
            (pool, self.fetch_one(pool).await)
        })
        .await
    }

    pub async fn fetch_records(&self, records: &[PoolCreationRecord]) -> Vec<PoolDescriptor> {
        fetch_many_with(&self.executor, records.iter(), |record| async move {
            (record.pool, self.fetch_record(record).await)
        })
        .await
    }
}

/// Runs `fetch` for every item through `executor`; failures become error markers.
pub async fn fetch_many_with<I, F, Fut>(executor: &BatchExecutor, items: I, fetch: F) -> Vec<PoolDescriptor>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = (Address, PoolResult<PoolDescriptor>)>,
{
    let started = Instant::now();
    let results = executor.run(items, fetch).await;

    let mut failed = 0usize;
    let descriptors: Vec<PoolDescriptor> = results
        .into_iter()
        .map(|(pool, result)| match result {
            Ok(descriptor) => descriptor,
            Err(e) => {
                failed += 1;
                warn!("❌ Failed to fetch pool {}: {}", pool, e);
                PoolDescriptor::error_marker(pool, e.to_string())
            }
        })
        .collect();

    info!(
        "📦 Fetched {} pools ({} failed) in {:.1}s",
        descriptors.len(),
        failed,
        started.elapsed().as_secs_f64()
    );
    descriptors
}

pub async fn fetch_pool(
    reader: &dyn ContractReader,
    token_cache: &TokenCache,
    pool: Address,
    creation_input: Option<&Bytes>,
) -> PoolResult<PoolDescriptor> {
    debug!("Getting info for pool: {}", pool);

    let (
        name,
        symbol,
        total_supply,
        actual_supply,
        swap_fee_percentage,
        normalized_weights,
        scaling_factors,
        virtual_balances,
        invariant,
        last_post_join_exit_invariant,
        pool_id,
        owner,
        vault,
        paused_state,
        in_recovery_mode,
        ath_rate_product,
    ) = tokio::join!(
        guarded_call(reader, pool, "name", IRangePool::nameCall {}, UNKNOWN.to_string(), |r| r._0),
        guarded_call(reader, pool, "symbol", IRangePool::symbolCall {}, UNKNOWN.to_string(), |r| r._0),
        guarded_call(reader, pool, "total_supply", IRangePool::totalSupplyCall {}, U256::ZERO, |r| r._0),
        guarded_call(reader, pool, "actual_supply", IRangePool::getActualSupplyCall {}, U256::ZERO, |r| r._0),
        guarded_call(reader, pool, "swap_fee_percentage", IRangePool::getSwapFeePercentageCall {}, U256::ZERO, |r| r._0),
        guarded_call(reader, pool, "normalized_weights", IRangePool::getNormalizedWeightsCall {}, Vec::new(), |r| r._0),
        guarded_call(reader, pool, "scaling_factors", IRangePool::getScalingFactorsCall {}, Vec::new(), |r| r._0),
        guarded_call(reader, pool, "virtual_balances", IRangePool::getVirtualBalancesCall {}, Vec::new(), |r| r._0),
        guarded_call(reader, pool, "invariant", IRangePool::getInvariantCall {}, U256::ZERO, |r| r._0),
        guarded_call(reader, pool, "last_post_join_exit_invariant", IRangePool::getLastPostJoinExitInvariantCall {}, U256::ZERO, |r| r._0),
        guarded_call(reader, pool, "pool_id", IRangePool::getPoolIdCall {}, None, |r| Some(r._0)),
        guarded_call(reader, pool, "owner", IRangePool::getOwnerCall {}, None, |r| Some(r._0)),
        guarded_call(reader, pool, "vault", IRangePool::getVaultCall {}, None, |r| Some(r._0)),
        guarded_call(reader, pool, "paused_state", IRangePool::getPausedStateCall {}, PausedState::default(), |r| PausedState {
            paused: r.paused,
            pause_window_end_time: r.pauseWindowEndTime,
            buffer_period_end_time: r.bufferPeriodEndTime,
        }),
        guarded_call(reader, pool, "in_recovery_mode", IRangePool::inRecoveryModeCall {}, false, |r| r._0),
        guarded_call(reader, pool, "ath_rate_product", IRangePool::getATHRateProductCall {}, U256::ZERO, |r| r._0),
    );

    let mut degraded = Vec::new();
    let mut descriptor = PoolDescriptor {
        address: pool,
        name: name.take(&mut degraded),
        symbol: symbol.take(&mut degraded),
        total_supply: total_supply.take(&mut degraded),
        actual_supply: actual_supply.take(&mut degraded),
        swap_fee_percentage: swap_fee_percentage.take(&mut degraded),
        normalized_weights: normalized_weights.take(&mut degraded),
        scaling_factors: scaling_factors.take(&mut degraded),
        virtual_balances: virtual_balances.take(&mut degraded),
        invariant: invariant.take(&mut degraded),
        last_post_join_exit_invariant: last_post_join_exit_invariant.take(&mut degraded),
        pool_id: pool_id.take(&mut degraded),
        owner: owner.take(&mut degraded),
        vault: vault.take(&mut degraded),
        paused_state: paused_state.take(&mut degraded),
        in_recovery_mode: in_recovery_mode.take(&mut degraded),
        ath_rate_product: ath_rate_product.take(&mut degraded),
        ..Default::default()
    };

    if CORE_FIELDS.iter().all(|field| degraded.contains(field)) {
        return Err(PoolError::Contract {
            contract: pool,
            message: "no pool contract answered at this address".to_string(),
            source: anyhow::anyhow!("all core reads failed"),
        });
    }

    let token_count = descriptor
        .normalized_weights
        .len()
        .max(descriptor.scaling_factors.len())
        .max(descriptor.virtual_balances.len());
    let discovered = discover_tokens(
        reader,
        token_cache,
        pool,
        DiscoveryHints {
            vault: descriptor.vault,
            pool_id: descriptor.pool_id,
            creation_input,
            token_count,
        },
    )
    .await;

    if discovered.is_placeholder() {
        degraded.push("tokens");
    }
    descriptor.tokens = discovered.tokens;
    descriptor.balances = discovered.balances;
    descriptor.degraded_fields = degraded;

    if !descriptor.has_aligned_token_arrays() {
        warn!(
            "⚠️ Pool {} returned misaligned token arrays ({} tokens)",
            pool,
            descriptor.tokens.len()
        );
    }
    if descriptor.is_degraded() {
        warn!("⚠️ Pool {} is degraded: {:?}", pool, descriptor.degraded_fields);
    }

    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abi::{IERC20, IRangePoolFactory, IVault},
        network::scripted::ScriptedChain,
        types::TokenSource,
    };
    use alloy::{primitives::B256, sol_types::SolCall};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const POOL: Address = Address::repeat_byte(0x90);
    const VAULT: Address = Address::repeat_byte(0xba);
    const TOKEN_A: Address = Address::repeat_byte(0x0a);
    const TOKEN_B: Address = Address::repeat_byte(0x0b);

    fn wads(values: &[u64]) -> Vec<U256> {
        values.iter().map(|v| U256::from(*v) * U256::from(10u64).pow(U256::from(16u64))).collect()
    }

    fn token(chain: &ScriptedChain, address: Address, name: &str, symbol: &str, decimals: u8) {
        chain.answer::<IERC20::nameCall>(address, IERC20::nameCall::abi_encode_returns(&(name.to_string(),)));
        chain.answer::<IERC20::symbolCall>(address, IERC20::symbolCall::abi_encode_returns(&(symbol.to_string(),)));
        chain.answer::<IERC20::decimalsCall>(address, IERC20::decimalsCall::abi_encode_returns(&(decimals,)));
    }

    /// A healthy 60/40 pool whose vault knows both tokens.
    fn healthy_pool() -> Arc<ScriptedChain> {
        let chain = Arc::new(ScriptedChain::default());
        let one = U256::from(10u64).pow(U256::from(18u64));
        chain.answer::<IRangePool::nameCall>(POOL, IRangePool::nameCall::abi_encode_returns(&("Range 60 WETH 40 USDC".to_string(),)));
        chain.answer::<IRangePool::symbolCall>(POOL, IRangePool::symbolCall::abi_encode_returns(&("R-60WETH-40USDC".to_string(),)));
        chain.answer::<IRangePool::totalSupplyCall>(POOL, IRangePool::totalSupplyCall::abi_encode_returns(&(one * U256::from(100u64),)));
        chain.answer::<IRangePool::getActualSupplyCall>(POOL, IRangePool::getActualSupplyCall::abi_encode_returns(&(one * U256::from(100u64),)));
        chain.answer::<IRangePool::getSwapFeePercentageCall>(POOL, IRangePool::getSwapFeePercentageCall::abi_encode_returns(&(U256::from(3_000_000_000_000_000u64),)));
        chain.answer::<IRangePool::getNormalizedWeightsCall>(POOL, IRangePool::getNormalizedWeightsCall::abi_encode_returns(&(wads(&[60, 40]),)));
        chain.answer::<IRangePool::getScalingFactorsCall>(POOL, IRangePool::getScalingFactorsCall::abi_encode_returns(&(vec![one, one * U256::from(1_000_000_000_000u64)],)));
        chain.answer::<IRangePool::getVirtualBalancesCall>(POOL, IRangePool::getVirtualBalancesCall::abi_encode_returns(&(vec![one, one],)));
        chain.answer::<IRangePool::getInvariantCall>(POOL, IRangePool::getInvariantCall::abi_encode_returns(&(U256::from(42u64),)));
        chain.answer::<IRangePool::getLastPostJoinExitInvariantCall>(POOL, IRangePool::getLastPostJoinExitInvariantCall::abi_encode_returns(&(U256::from(41u64),)));
        chain.answer::<IRangePool::getPoolIdCall>(POOL, IRangePool::getPoolIdCall::abi_encode_returns(&(B256::repeat_byte(0x1d),)));
        chain.answer::<IRangePool::getOwnerCall>(POOL, IRangePool::getOwnerCall::abi_encode_returns(&(Address::repeat_byte(0x0e),)));
        chain.answer::<IRangePool::getVaultCall>(POOL, IRangePool::getVaultCall::abi_encode_returns(&(VAULT,)));
        chain.answer::<IRangePool::getPausedStateCall>(POOL, IRangePool::getPausedStateCall::abi_encode_returns(&(false, U256::from(1u64), U256::from(2u64))));
        chain.answer::<IRangePool::inRecoveryModeCall>(POOL, IRangePool::inRecoveryModeCall::abi_encode_returns(&(false,)));
        chain.answer::<IRangePool::getATHRateProductCall>(POOL, IRangePool::getATHRateProductCall::abi_encode_returns(&(one,)));
        chain.answer::<IVault::getPoolTokensCall>(
            VAULT,
            IVault::getPoolTokensCall::abi_encode_returns(&(
                vec![TOKEN_A, TOKEN_B],
                vec![U256::from(6_000u64), U256::from(4_000u64)],
                U256::from(7u64),
            )),
        );
        token(&chain, TOKEN_A, "Wrapped Ether", "WETH", 18);
        token(&chain, TOKEN_B, "USD Coin", "USDC", 6);
        chain
    }

    #[tokio::test]
    async fn healthy_pool_is_not_degraded() {
        let chain = healthy_pool();
        let pool = fetch_pool(&*chain, &TokenCache::default(), POOL, None).await.unwrap();

        assert!(!pool.is_degraded(), "degraded: {:?}", pool.degraded_fields);
        assert_eq!(pool.symbol, "R-60WETH-40USDC");
        assert_eq!(pool.vault, Some(VAULT));
        assert_eq!(pool.invariant, U256::from(42u64));
        assert_eq!(pool.paused_state.buffer_period_end_time, U256::from(2u64));
        assert_eq!(pool.tokens.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>(), ["WETH", "USDC"]);
        assert_eq!(pool.tokens[1].decimals, 6);
        assert_eq!(pool.balances, vec![U256::from(6_000u64), U256::from(4_000u64)]);
        assert!(pool.has_aligned_token_arrays());
    }

    #[tokio::test]
    async fn failed_field_defaults_without_failing_the_pool() {
        let chain = healthy_pool();
        chain.forget::<IRangePool::getInvariantCall>(POOL);
        chain.forget::<IERC20::decimalsCall>(TOKEN_B);

        let pool = fetch_pool(&*chain, &TokenCache::default(), POOL, None).await.unwrap();

        assert_eq!(pool.degraded_fields, vec!["invariant"]);
        assert_eq!(pool.invariant, U256::ZERO);
        assert_eq!(pool.last_post_join_exit_invariant, U256::from(41u64));
        assert_eq!(pool.name, "Range 60 WETH 40 USDC");
        assert_eq!(pool.tokens[1].symbol, "USDC");
        assert_eq!(pool.tokens[1].decimals, 18);
    }

    #[tokio::test]
    async fn unknown_vault_falls_through_to_creation_input() {
        let chain = healthy_pool();
        chain.forget::<IRangePool::getVaultCall>(POOL);
        let input: Bytes = IRangePoolFactory::createCall {
            name: "Range 60 WETH 40 USDC".to_string(),
            symbol: "R-60WETH-40USDC".to_string(),
            tokens: vec![TOKEN_A, TOKEN_B],
            normalizedWeights: wads(&[60, 40]),
            rateProviders: vec![Address::ZERO, Address::ZERO],
            swapFeePercentage: U256::from(3_000_000_000_000_000u64),
            owner: Address::repeat_byte(0x0e),
            salt: B256::ZERO,
        }
        .abi_encode()
        .into();

        let pool = fetch_pool(&*chain, &TokenCache::default(), POOL, Some(&input)).await.unwrap();

        assert_eq!(pool.degraded_fields, vec!["vault"]);
        assert!(pool.tokens.iter().all(|t| t.source == TokenSource::CreationTransaction));
        assert_eq!(pool.tokens[0].symbol, "WETH");
        assert!(pool.balances.is_empty());
    }

    #[tokio::test]
    async fn unresolvable_tokens_become_placeholders() {
        let chain = healthy_pool();
        chain.forget::<IRangePool::getVaultCall>(POOL);

        let pool = fetch_pool(&*chain, &TokenCache::default(), POOL, None).await.unwrap();

        assert_eq!(pool.degraded_fields, vec!["vault", "tokens"]);
        assert_eq!(pool.tokens.len(), 2);
        assert!(pool.tokens.iter().all(|t| t.is_placeholder()));
    }

    #[tokio::test]
    async fn silent_address_is_an_error() {
        let chain = Arc::new(ScriptedChain::default());
        let err = fetch_pool(&*chain, &TokenCache::default(), POOL, None).await.unwrap_err();
        assert!(matches!(err, PoolError::Contract { contract, .. } if contract == POOL));
    }

    #[tokio::test]
    async fn fetcher_marks_silent_pools_in_place() {
        let chain = healthy_pool();
        let fetcher = PoolMetadataFetcher::new(chain.clone(), 2);
        let silent = Address::repeat_byte(0x55);

        let out = fetcher.fetch_many(&[silent, POOL, silent]).await;

        assert_eq!(out.iter().map(|d| d.address).collect::<Vec<_>>(), vec![silent, POOL, silent]);
        assert!(out[0].is_error() && out[2].is_error());
        assert!(!out[1].is_error());
        assert_eq!(fetcher.token_cache().len().await, 1);
    }

    fn ok(pool: Address) -> PoolResult<PoolDescriptor> {
        Ok(PoolDescriptor {
            address: pool,
            name: format!("Pool {}", pool),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn failed_pools_become_error_markers_in_place() {
        let pools: Vec<Address> = (1..=7u8).map(Address::repeat_byte).collect();
        let executor = BatchExecutor::new(3);

        let out = fetch_many_with(&executor, pools.clone(), |pool| async move {
            if pool == Address::repeat_byte(4) {
                (pool, Err(PoolError::Contract {
                    contract: pool,
                    message: "boom".to_string(),
                    source: anyhow::anyhow!("execution reverted"),
                }))
            } else {
                (pool, ok(pool))
            }
        })
        .await;

        assert_eq!(out.len(), pools.len());
        assert_eq!(out.iter().map(|d| d.address).collect::<Vec<_>>(), pools);
        assert!(out[3].is_error());
        assert_eq!(out[3].name, "Error");
        assert_eq!(out.iter().filter(|d| d.is_error()).count(), 1);
    }

    #[tokio::test]
    async fn every_pool_is_fetched_exactly_once() {
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let pools: Vec<Address> = (0..12u8).map(Address::repeat_byte).collect();

        let out = fetch_many_with(&BatchExecutor::new(5), pools, move |pool| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            (pool, ok(pool))
        })
        .await;

        assert_eq!(out.len(), 12);
        assert_eq!(calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn empty_input_fetches_nothing() {
        let out = fetch_many_with(&BatchExecutor::new(5), Vec::<Address>::new(), |pool| async move {
            (pool, ok(pool))
        })
        .await;
        assert!(out.is_empty());
    }
}
