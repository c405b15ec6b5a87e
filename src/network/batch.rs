//! Bounded fan-out of RPC work in fixed-size batches

use futures::future::join_all;
use std::future::Future;
use tracing::debug;

/// Runs one operation per item, `batch_size` at a time.
///
/// Batches run strictly one after another; the items of a batch run concurrently.
/// Results come back in input order, one per item.
#[derive(Debug, Clone, Copy)]
pub struct BatchExecutor {
    batch_size: usize,
}

impl BatchExecutor {
    /// A batch size of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn run<I, T, F, Fut>(&self, items: I, operation: F) -> Vec<T>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T>,
    {
        let items: Vec<I::Item> = items.into_iter().collect();
        let total_batches = items.len().div_ceil(self.batch_size);
        let mut results = Vec::with_capacity(items.len());
        let mut remaining = items.into_iter();

        for batch_index in 0..total_batches {
            let batch: Vec<I::Item> = remaining.by_ref().take(self.batch_size).collect();
            debug!(
                batch = batch_index + 1,
                total_batches,
                size = batch.len(),
                "Running batch"
            );
            results.extend(join_all(batch.into_iter().map(&operation)).await);
        }

        results
    }
}
