//! Raw contract calls and transaction submission

use alloy::{
    primitives::{Address, B256, Bytes},
    providers::Provider,
    rpc::types::{
        eth::{TransactionReceipt, TransactionRequest},
        Log,
    },
    sol_types::SolCall,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;
use crate::{
    errors::{PoolError, PoolResult},
    SharedProvider,
};

/// Read-only `eth_call` access.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call_raw(&self, to: Address, input: Bytes) -> Result<Bytes>;
}

/// A mined, successful transaction reduced to what the write paths read back.
#[derive(Debug, Clone, Default)]
pub struct ConfirmedTransaction {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub logs: Vec<Log>,
}

impl From<TransactionReceipt> for ConfirmedTransaction {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            logs: receipt.inner.logs().to_vec(),
        }
    }
}

/// Signed submission. Returns only once the transaction is confirmed.
#[async_trait]
pub trait TransactionSink: Send + Sync {
    async fn submit(
        &self,
        tx: TransactionRequest,
        stage: &'static str,
        timeout: Duration,
    ) -> PoolResult<ConfirmedTransaction>;
}

/// Any alloy provider behind the read and write seams.
#[derive(Clone)]
pub struct ProviderChain {
    provider: SharedProvider,
}

impl ProviderChain {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ContractReader for ProviderChain {
    async fn call_raw(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().to(to).input(input.into());
        let output = self.provider.call(&tx).await?;
        Ok(output)
    }
}

#[async_trait]
impl TransactionSink for ProviderChain {
    async fn submit(
        &self,
        tx: TransactionRequest,
        stage: &'static str,
        timeout: Duration,
    ) -> PoolResult<ConfirmedTransaction> {
        send_and_confirm(self.provider.as_ref(), tx, stage, timeout)
            .await
            .map(ConfirmedTransaction::from)
    }
}

/// Executes a read-only call and decodes its return values.
pub async fn read_contract<C: SolCall>(
    reader: &dyn ContractReader,
    to: Address,
    call: C,
) -> Result<C::Return> {
    let output = reader.call_raw(to, call.abi_encode().into()).await
        .with_context(|| format!("Failed to call {} on {}", C::SIGNATURE, to))?;
    C::abi_decode_returns(&output, true)
        .with_context(|| format!("Failed to decode {} from {}", C::SIGNATURE, to))
}

/// Builds an unsigned transaction carrying `call` to `to`.
pub fn contract_transaction<C: SolCall>(from: Address, to: Address, call: &C) -> TransactionRequest {
    TransactionRequest::default()
        .from(from)
        .to(to)
        .input(call.abi_encode().into())
}

/// Sends a transaction and waits for a successful receipt.
pub async fn send_and_confirm(
    provider: &dyn Provider,
    tx: TransactionRequest,
    stage: &'static str,
    timeout: Duration,
) -> PoolResult<TransactionReceipt> {
    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(|e| PoolError::Transaction {
            stage,
            message: "submission failed".to_string(),
            source: Some(e.into()),
        })?;

    let tx_hash: B256 = *pending.tx_hash();
    info!("📡 {} transaction sent: {}", stage, tx_hash);

    let receipt = tokio::select! {
        result = pending.get_receipt() => {
            result.map_err(|e| PoolError::Transaction {
                stage,
                message: format!("no receipt for {}", tx_hash),
                source: Some(e.into()),
            })?
        }
        _ = tokio::time::sleep(timeout) => {
            return Err(PoolError::Transaction {
                stage,
                message: format!("{} unconfirmed after {} seconds", tx_hash, timeout.as_secs()),
                source: None,
            });
        }
    };

    if !receipt.status() {
        return Err(PoolError::Transaction {
            stage,
            message: format!("{} reverted", tx_hash),
            source: None,
        });
    }

    info!("✅ {} transaction confirmed: {}", stage, tx_hash);
    Ok(receipt)
}
