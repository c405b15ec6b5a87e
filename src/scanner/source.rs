//! Chain access needed by the event scanner

use alloy::{
    consensus::Transaction as _,
    primitives::{B256, Bytes},
    providers::Provider,
    rpc::types::{Filter, Log},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use crate::ConcreteProvider;

#[async_trait]
pub trait LogSource: Send + Sync {
    /// Current chain head.
    async fn latest_block(&self) -> Result<u64>;

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>>;

    /// Raw input of a mined transaction, `None` when the node does not know it.
    async fn transaction_input(&self, hash: B256) -> Result<Option<Bytes>>;
}

#[async_trait]
impl LogSource for ConcreteProvider {
    async fn latest_block(&self) -> Result<u64> {
        self.get_block_number().await
            .context("Failed to get block number")
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        self.get_logs(filter).await
            .context("Failed to get logs")
    }

    async fn transaction_input(&self, hash: B256) -> Result<Option<Bytes>> {
        let tx = self.get_transaction_by_hash(hash).await
            .with_context(|| format!("Failed to get transaction {}", hash))?;
        Ok(tx.map(|tx| tx.input().clone()))
    }
}
