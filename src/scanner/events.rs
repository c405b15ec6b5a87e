//! Chunked `PoolCreated` log scanning over a block range

use alloy::{
    primitives::Address,
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};
use std::sync::Arc;
use tracing::{debug, info};
use crate::{
    abi::IRangePoolFactory::PoolCreated,
    config::{Config, DEFAULT_FETCH_BATCH_SIZE, DEFAULT_LOG_CHUNK_SIZE},
    errors::{PoolError, PoolResult},
    network::{retry_with_backoff, BatchExecutor, RetryPolicy},
    scanner::LogSource,
    types::PoolCreationRecord,
};

/// Splits `[start, end]` into contiguous inclusive ranges of at most `span` blocks.
/// Empty when `start > end`.
pub fn chunk_ranges(start: u64, end: u64, span: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    if start > end {
        return ranges;
    }
    let span = span.max(1);
    let mut cursor = start;
    loop {
        let to = cursor.saturating_add(span - 1).min(end);
        ranges.push((cursor, to));
        if to == end {
            break;
        }
        cursor = to + 1;
    }
    ranges
}

pub struct EventScanner {
    source: Arc<dyn LogSource>,
    factory: Address,
    start_block: u64,
    chunk_size: u64,
    fetch_creation_inputs: bool,
    executor: BatchExecutor,
    head_retry: RetryPolicy,
}

impl EventScanner {
    pub fn new(source: Arc<dyn LogSource>, factory: Address, start_block: u64) -> Self {
        Self {
            source,
            factory,
            start_block,
            chunk_size: DEFAULT_LOG_CHUNK_SIZE,
            fetch_creation_inputs: false,
            executor: BatchExecutor::new(DEFAULT_FETCH_BATCH_SIZE),
            head_retry: RetryPolicy::head_lookup(),
        }
    }

    pub fn from_config(source: Arc<dyn LogSource>, config: &Config) -> Self {
        Self::new(source, config.factory_address, config.start_block)
            .chunk_size(config.log_chunk_size)
            .with_creation_inputs(config.fetch_creation_transactions, config.fetch_batch_size)
    }

    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Also resolve each creation transaction's input, `batch_size` lookups at a time.
    pub fn with_creation_inputs(mut self, enabled: bool, batch_size: usize) -> Self {
        self.fetch_creation_inputs = enabled;
        self.executor = BatchExecutor::new(batch_size);
        self
    }

    pub fn with_head_retry(mut self, policy: RetryPolicy) -> Self {
        self.head_retry = policy;
        self
    }

    /// Scans from the configured start block up to the current chain head. Only the
    /// head lookup is retried; log queries are not.
    pub async fn scan(&self) -> PoolResult<Vec<PoolCreationRecord>> {
        let latest = retry_with_backoff(
            || self.source.latest_block(),
            &self.head_retry,
            "latest block",
        )
        .await?;
        self.scan_range(self.start_block, latest).await
    }

    /// Any failing query aborts the whole scan; no partial results are returned.
    pub async fn scan_range(&self, start_block: u64, latest_block: u64) -> PoolResult<Vec<PoolCreationRecord>> {
        let ranges = chunk_ranges(start_block, latest_block, self.chunk_size);
        if ranges.is_empty() {
            debug!(start_block, latest_block, "Nothing to scan");
            return Ok(Vec::new());
        }

        info!(
            "🔍 Scanning blocks {}..={} for PoolCreated in {} chunks",
            start_block, latest_block, ranges.len()
        );

        let mut logs = Vec::new();
        for (from_block, to_block) in ranges {
            let filter = Filter::new()
                .address(self.factory)
                .event_signature(PoolCreated::SIGNATURE_HASH)
                .from_block(from_block)
                .to_block(to_block);

            let chunk = self.source.logs(&filter).await
                .map_err(|source| PoolError::Scan { from_block, to_block, source })?;
            debug!(from_block, to_block, found = chunk.len(), "Scanned chunk");
            logs.extend(chunk);
        }

        let mut records = logs
            .iter()
            .map(decode_pool_created)
            .collect::<PoolResult<Vec<_>>>()?;

        if self.fetch_creation_inputs {
            self.attach_creation_inputs(&mut records).await?;
        }

        info!("✅ Found {} pool creation events", records.len());
        Ok(records)
    }

    async fn attach_creation_inputs(&self, records: &mut [PoolCreationRecord]) -> PoolResult<()> {
        let hashes: Vec<_> = records.iter().map(|r| r.transaction_hash).collect();
        let source = &self.source;
        let inputs = self.executor
            .run(hashes, |hash| async move { source.transaction_input(hash).await })
            .await;

        for (record, input) in records.iter_mut().zip(inputs) {
            record.creation_input = input.map_err(|source| PoolError::Scan {
                from_block: record.block_number,
                to_block: record.block_number,
                source,
            })?;
        }
        Ok(())
    }
}

fn decode_pool_created(log: &Log) -> PoolResult<PoolCreationRecord> {
    let block_number = log.block_number.unwrap_or_default();
    let malformed = |reason: String| PoolError::Scan {
        from_block: block_number,
        to_block: block_number,
        source: anyhow::anyhow!(reason),
    };

    let decoded = log.log_decode::<PoolCreated>()
        .map_err(|e| malformed(format!("undecodable PoolCreated log: {}", e)))?;
    let block_number = log.block_number
        .ok_or_else(|| malformed("log without block number".to_string()))?;
    let transaction_hash = log.transaction_hash
        .ok_or_else(|| malformed("log without transaction hash".to_string()))?;

    Ok(PoolCreationRecord {
        pool: decoded.inner.data.pool,
        block_number,
        transaction_hash,
        creation_input: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, Bytes};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const FACTORY: Address = Address::repeat_byte(0xfa);

    #[derive(Default)]
    struct MockChain {
        head: u64,
        // (block, pool, tx hash)
        events: Vec<(u64, Address, B256)>,
        inputs: HashMap<B256, Bytes>,
        fail_from_block: Option<u64>,
        // head lookups that fail before one succeeds
        head_failures: u32,
        head_lookups: AtomicU32,
        queried: Mutex<Vec<(u64, u64)>>,
    }

    fn pool_created_log(block: u64, pool: Address, tx: B256) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: FACTORY,
                data: PoolCreated { pool }.encode_log_data(),
            },
            block_number: Some(block),
            transaction_hash: Some(tx),
            ..Default::default()
        }
    }

    #[async_trait]
    impl LogSource for MockChain {
        async fn latest_block(&self) -> anyhow::Result<u64> {
            if self.head_lookups.fetch_add(1, Ordering::SeqCst) < self.head_failures {
                anyhow::bail!("connection reset by peer");
            }
            Ok(self.head)
        }

        async fn logs(&self, filter: &Filter) -> anyhow::Result<Vec<Log>> {
            let from = filter.get_from_block().unwrap_or_default();
            let to = filter.get_to_block().unwrap_or_default();
            self.queried.lock().unwrap().push((from, to));
            if self.fail_from_block == Some(from) {
                anyhow::bail!("block range too large");
            }
            Ok(self.events
                .iter()
                .filter(|(block, _, _)| (from..=to).contains(block))
                .map(|(block, pool, tx)| pool_created_log(*block, *pool, *tx))
                .collect())
        }

        async fn transaction_input(&self, hash: B256) -> anyhow::Result<Option<Bytes>> {
            Ok(self.inputs.get(&hash).cloned())
        }
    }

    fn scanner(chain: Arc<MockChain>, start: u64, chunk: u64) -> EventScanner {
        EventScanner::new(chain, FACTORY, start)
            .chunk_size(chunk)
            .with_head_retry(RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                multiplier: 2.0,
            })
    }

    #[test]
    fn chunks_tile_the_range() {
        assert_eq!(
            chunk_ranges(100, 112, 5),
            vec![(100, 104), (105, 109), (110, 112)]
        );
        assert_eq!(chunk_ranges(7, 7, 5000), vec![(7, 7)]);
        assert!(chunk_ranges(10, 9, 5).is_empty());
    }

    #[test]
    fn chunking_does_not_overflow_at_chain_limit() {
        let ranges = chunk_ranges(u64::MAX - 3, u64::MAX, 10);
        assert_eq!(ranges, vec![(u64::MAX - 3, u64::MAX)]);
    }

    proptest! {
        #[test]
        fn chunks_have_no_gaps_or_overlaps(start in 0u64..1_000_000, len in 0u64..50_000, span in 1u64..10_000) {
            let end = start + len;
            let ranges = chunk_ranges(start, end, span);
            prop_assert_eq!(ranges.first().unwrap().0, start);
            prop_assert_eq!(ranges.last().unwrap().1, end);
            for (from, to) in &ranges {
                prop_assert!(from <= to);
                prop_assert!(to - from < span);
            }
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].1 + 1, pair[1].0);
            }
        }
    }

    #[tokio::test]
    async fn collects_events_across_chunks_in_order() {
        let chain = Arc::new(MockChain {
            head: 120,
            events: vec![
                (101, Address::repeat_byte(1), B256::repeat_byte(1)),
                (109, Address::repeat_byte(2), B256::repeat_byte(2)),
                (120, Address::repeat_byte(3), B256::repeat_byte(3)),
            ],
            ..Default::default()
        });

        let records = scanner(chain.clone(), 100, 10).scan().await.unwrap();

        assert_eq!(
            records.iter().map(|r| r.pool).collect::<Vec<_>>(),
            vec![Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3)]
        );
        assert_eq!(records[1].block_number, 109);
        assert!(records.iter().all(|r| r.creation_input.is_none()));
        assert_eq!(
            *chain.queried.lock().unwrap(),
            vec![(100, 109), (110, 119), (120, 120)]
        );
    }

    #[tokio::test]
    async fn start_after_head_issues_no_queries() {
        let chain = Arc::new(MockChain { head: 50, ..Default::default() });
        let records = scanner(chain.clone(), 51, 10).scan().await.unwrap();
        assert!(records.is_empty());
        assert!(chain.queried.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_chunk_aborts_the_scan() {
        let chain = Arc::new(MockChain {
            head: 30,
            events: vec![(5, Address::repeat_byte(1), B256::repeat_byte(1))],
            fail_from_block: Some(10),
            ..Default::default()
        });

        let err = scanner(chain.clone(), 0, 10).scan().await.unwrap_err();
        match err {
            PoolError::Scan { from_block, to_block, .. } => {
                assert_eq!((from_block, to_block), (10, 19));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // nothing past the failing chunk was queried
        assert_eq!(chain.queried.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn attaches_creation_inputs_when_requested() {
        let tx = B256::repeat_byte(9);
        let chain = Arc::new(MockChain {
            head: 10,
            events: vec![(3, Address::repeat_byte(4), tx)],
            inputs: HashMap::from([(tx, Bytes::from_static(&[0xde, 0xad]))]),
            ..Default::default()
        });

        let records = scanner(chain, 0, 100)
            .with_creation_inputs(true, 2)
            .scan()
            .await
            .unwrap();
        assert_eq!(records[0].creation_input, Some(Bytes::from_static(&[0xde, 0xad])));
    }

    #[tokio::test]
    async fn head_lookup_is_retried() {
        let chain = Arc::new(MockChain {
            head: 20,
            events: vec![(15, Address::repeat_byte(1), B256::repeat_byte(1))],
            head_failures: 2,
            ..Default::default()
        });

        let records = scanner(chain.clone(), 10, 100).scan().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(chain.head_lookups.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unreachable_head_fails_without_querying_logs() {
        let chain = Arc::new(MockChain { head: 20, head_failures: 10, ..Default::default() });

        let err = scanner(chain.clone(), 10, 100).scan().await.unwrap_err();
        assert!(matches!(err, PoolError::Network { retry_count: 3, .. }));
        assert!(chain.queried.lock().unwrap().is_empty());
    }
}
