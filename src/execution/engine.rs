//! Signed liquidity operations: approvals, joins, exits and pool creation

use alloy::{
    primitives::{Address, B256, U256},
    rpc::types::Log,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use crate::{
    abi::{IERC20, IRangePoolFactory, IVault},
    accounting::{
        build_withdrawal_quote, encode_exact_tokens_join, encode_proportional_exit, plan_approvals,
        prepare_initial_deposit, read_allowances, ApprovalStep,
    },
    config::Config,
    errors::{PoolError, PoolResult},
    network::{contract_transaction, setup_wallet_provider, ContractReader, ProviderChain, TransactionSink},
    pools::{get_bpt_balance, get_pool_share, get_pool_tokens_enhanced, get_total_supply},
    types::{ExitRequest, JoinRequest, LiquidityReceipt, PoolShare, WithdrawalQuote, ZERO_SALT},
    validation::PoolCreationParams,
};

/// A pool deployed through the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedPool {
    pub pool: Address,
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
}

pub struct LiquidityEngine {
    reader: Arc<dyn ContractReader>,
    sink: Arc<dyn TransactionSink>,
    account: Address,
    factory: Address,
    receipt_timeout: Duration,
    slippage_bps: u32,
}

impl LiquidityEngine {
    pub fn new(
        reader: Arc<dyn ContractReader>,
        sink: Arc<dyn TransactionSink>,
        account: Address,
        config: &Config,
    ) -> Self {
        Self {
            reader,
            sink,
            account,
            factory: config.factory_address,
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            slippage_bps: config.slippage_tolerance_bps,
        }
    }

    /// Requires `PRIVATE_KEY`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (provider, account) = setup_wallet_provider(config)?;
        let chain = Arc::new(ProviderChain::new(provider));
        Ok(Self::new(chain.clone(), chain, account, config))
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub async fn pool_share(&self, pool: Address) -> PoolResult<PoolShare> {
        get_pool_share(self.reader.as_ref(), pool, self.account).await
    }

    /// Submits approvals one at a time, waiting for each receipt. Stops at the first
    /// failure; approvals already confirmed stay in place.
    pub async fn approve_tokens(&self, spender: Address, steps: &[ApprovalStep]) -> PoolResult<Vec<B256>> {
        let mut hashes = Vec::with_capacity(steps.len());
        for step in steps {
            info!("🔓 Approving {} of token {} for {}", step.amount, step.token, spender);
            let call = IERC20::approveCall { spender, value: step.amount };
            let tx = contract_transaction(self.account, step.token, &call);

            let confirmed = self.sink.submit(tx, "approval", self.receipt_timeout)
                .await
                .map_err(|e| PoolError::Approval {
                    token: step.token,
                    index: step.index,
                    source: anyhow::Error::new(e),
                })?;
            hashes.push(confirmed.transaction_hash);
        }
        Ok(hashes)
    }

    /// Approves what the vault still needs, then joins. An empty pool gets the
    /// initialization payload; otherwise an exact-tokens-in join. Deposits above
    /// their virtual balances are rejected before anything touches the chain.
    pub async fn approve_and_join(&self, request: &JoinRequest) -> PoolResult<LiquidityReceipt> {
        let reader = self.reader.as_ref();
        let assets: Vec<Address> = request.amounts.iter().map(|a| a.token).collect();
        let amounts_in = request
            .amounts
            .iter()
            .map(|a| a.base_units())
            .collect::<PoolResult<Vec<U256>>>()?;

        let initial_deposit = if request.virtual_balances.is_empty() {
            None
        } else {
            Some(prepare_initial_deposit(&amounts_in, &request.virtual_balances)?)
        };

        let total_supply = get_total_supply(reader, request.pool).await?;
        let user_data = if total_supply.is_zero() {
            info!("🌱 Pool {} is empty, sending initial deposit", request.pool);
            match initial_deposit {
                Some(payload) => payload,
                None => prepare_initial_deposit(&amounts_in, &request.virtual_balances)?,
            }
        } else {
            encode_exact_tokens_join(&amounts_in, request.min_bpt_out)
        };

        let requirements: Vec<(Address, U256)> = assets.iter().copied().zip(amounts_in.iter().copied()).collect();
        let allowances = read_allowances(reader, self.account, request.vault, &assets).await;
        let steps = plan_approvals(&requirements, &allowances);
        let approvals = self.approve_tokens(request.vault, &steps).await?;

        let call = IVault::joinPoolCall {
            poolId: request.pool_id,
            sender: self.account,
            recipient: self.account,
            request: IVault::JoinPoolRequest {
                assets,
                maxAmountsIn: amounts_in,
                userData: user_data,
                fromInternalBalance: request.from_internal_balance,
            },
        };
        let tx = contract_transaction(self.account, request.vault, &call);
        let confirmed = self.sink.submit(tx, "join", self.receipt_timeout).await?;

        info!("💧 Joined pool {} ({} approvals)", request.pool, approvals.len());
        Ok(LiquidityReceipt {
            approvals,
            transaction_hash: confirmed.transaction_hash,
        })
    }

    /// Checks the holding, quotes proportional amounts out, approves the share token
    /// if needed and exits.
    pub async fn approve_and_exit(&self, request: &ExitRequest) -> PoolResult<(LiquidityReceipt, WithdrawalQuote)> {
        let reader = self.reader.as_ref();

        let (owned, total_supply, vault_tokens) = tokio::try_join!(
            get_bpt_balance(reader, request.pool, self.account),
            get_total_supply(reader, request.pool),
            get_pool_tokens_enhanced(reader, request.vault, request.pool_id),
        )?;

        if request.tokens.len() != vault_tokens.balances.len() {
            return Err(PoolError::LengthMismatch {
                context: "exit assets",
                expected: vault_tokens.balances.len(),
                actual: request.tokens.len(),
            });
        }

        let quote = build_withdrawal_quote(
            request.bpt_amount_in,
            owned,
            total_supply,
            &vault_tokens.balances,
            self.slippage_bps,
        )?;

        let allowances = read_allowances(reader, self.account, request.vault, &[request.pool]).await;
        let steps = plan_approvals(&[(request.pool, request.bpt_amount_in)], &allowances);
        let approvals = self.approve_tokens(request.vault, &steps).await?;

        let call = IVault::exitPoolCall {
            poolId: request.pool_id,
            sender: self.account,
            recipient: self.account,
            request: IVault::ExitPoolRequest {
                assets: request.tokens.clone(),
                minAmountsOut: quote.min_amounts_out.clone(),
                userData: encode_proportional_exit(request.bpt_amount_in),
                toInternalBalance: request.to_internal_balance,
            },
        };
        let tx = contract_transaction(self.account, request.vault, &call);
        let confirmed = self.sink.submit(tx, "exit", self.receipt_timeout).await?;

        info!("💸 Exited {} shares from pool {}", request.bpt_amount_in, request.pool);
        Ok((
            LiquidityReceipt {
                approvals,
                transaction_hash: confirmed.transaction_hash,
            },
            quote,
        ))
    }

    /// Deploys a pool owned by the signing account and returns its address.
    pub async fn create_pool(&self, params: &PoolCreationParams) -> PoolResult<CreatedPool> {
        let call = IRangePoolFactory::createCall {
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            tokens: params.tokens.clone(),
            normalizedWeights: params.normalized_weights.clone(),
            rateProviders: params.rate_providers.clone(),
            swapFeePercentage: params.swap_fee_percentage,
            owner: self.account,
            salt: ZERO_SALT,
        };
        let tx = contract_transaction(self.account, self.factory, &call);

        info!("🏗️ Creating pool {} ({}) with {} tokens", params.name, params.symbol, params.tokens.len());
        let confirmed = self.sink.submit(tx, "pool creation", self.receipt_timeout).await?;

        let pool = created_pool_from_logs(self.factory, &confirmed.logs).ok_or_else(|| {
            warn!("⚠️ Receipt {} carries no PoolCreated event", confirmed.transaction_hash);
            PoolError::Transaction {
                stage: "pool creation",
                message: format!("no PoolCreated event in {}", confirmed.transaction_hash),
                source: None,
            }
        })?;

        info!("✅ Pool created at {}", pool);
        Ok(CreatedPool {
            pool,
            transaction_hash: confirmed.transaction_hash,
            block_number: confirmed.block_number,
        })
    }
}

/// First `PoolCreated` emitted by `factory` among `logs`.
pub fn created_pool_from_logs(factory: Address, logs: &[Log]) -> Option<Address> {
    logs.iter()
        .filter(|log| log.address() == factory)
        .find_map(|log| log.log_decode::<IRangePoolFactory::PoolCreated>().ok())
        .map(|decoded| decoded.inner.data.pool)
}
