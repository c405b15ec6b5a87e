//! In-memory contracts for unit tests: canned call results and recorded submissions

use alloy::{
    primitives::{Address, B256, Bytes},
    rpc::types::eth::TransactionRequest,
    sol_types::SolCall,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use crate::{
    errors::{PoolError, PoolResult},
    network::{ConfirmedTransaction, ContractReader, TransactionSink},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub to: Address,
    pub selector: [u8; 4],
    pub stage: &'static str,
}

/// Calls without a canned answer revert. Submissions to a failing target revert
/// after being recorded.
#[derive(Default)]
pub struct ScriptedChain {
    answers: Mutex<HashMap<(Address, [u8; 4]), Bytes>>,
    failing: Mutex<HashSet<Address>>,
    submitted: Mutex<Vec<Submitted>>,
    reads: AtomicUsize,
    in_flight: AtomicUsize,
}

impl ScriptedChain {
    pub fn answer<C: SolCall>(&self, to: Address, output: Vec<u8>) {
        self.answers.lock().unwrap().insert((to, C::SELECTOR), output.into());
    }

    pub fn forget<C: SolCall>(&self, to: Address) {
        self.answers.lock().unwrap().remove(&(to, C::SELECTOR));
    }

    pub fn fail_submissions_to(&self, to: Address) {
        self.failing.lock().unwrap().insert(to);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<Submitted> {
        self.submitted.lock().unwrap().clone()
    }
}

fn selector(input: &[u8]) -> [u8; 4] {
    let mut selector = [0u8; 4];
    if input.len() >= 4 {
        selector.copy_from_slice(&input[..4]);
    }
    selector
}

#[async_trait]
impl ContractReader for ScriptedChain {
    async fn call_raw(&self, to: Address, input: Bytes) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.lock().unwrap().get(&(to, selector(&input))).cloned();
        answer.ok_or_else(|| anyhow::anyhow!("execution reverted"))
    }
}

#[async_trait]
impl TransactionSink for ScriptedChain {
    async fn submit(
        &self,
        tx: TransactionRequest,
        stage: &'static str,
        _timeout: Duration,
    ) -> PoolResult<ConfirmedTransaction> {
        assert_eq!(
            self.in_flight.fetch_add(1, Ordering::SeqCst),
            0,
            "{} submitted before the previous transaction confirmed",
            stage
        );
        tokio::task::yield_now().await;

        let to = tx.to.and_then(|kind| kind.to().copied()).unwrap_or_default();
        let input = tx.input.input().cloned().unwrap_or_default();
        let count = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(Submitted { to, selector: selector(&input), stage });
            submitted.len()
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&to) {
            return Err(PoolError::Transaction {
                stage,
                message: "execution reverted".to_string(),
                source: None,
            });
        }
        Ok(ConfirmedTransaction {
            transaction_hash: B256::with_last_byte(count as u8),
            ..Default::default()
        })
    }
}
