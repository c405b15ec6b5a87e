//! Lazily loaded, memoized pool catalogue with lookup and search

use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::info;
use crate::{
    errors::PoolResult,
    storage::source::SnapshotSource,
    types::{PoolListing, SnapshotPool},
};

type Catalogue = Arc<Vec<SnapshotPool>>;

/// Read-only view over a snapshot source. The first access loads the snapshot;
/// concurrent first accesses share a single load. A failed load is not kept, so the
/// next access tries again.
pub struct AggregateStore {
    source: Arc<dyn SnapshotSource>,
    cell: RwLock<Arc<OnceCell<Catalogue>>>,
}

impl AggregateStore {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            cell: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    pub async fn get_all(&self) -> PoolResult<Catalogue> {
        let cell = self.cell.read().await.clone();
        let pools = cell
            .get_or_try_init(|| async {
                let pools = self.source.load().await?;
                info!("📚 Loaded {} pools from {}", pools.len(), self.source.describe());
                Ok::<_, crate::errors::PoolError>(Arc::new(pools))
            })
            .await?;
        Ok(Arc::clone(pools))
    }

    /// Case-insensitive match on the pool address.
    pub async fn get_by_address(&self, address: &str) -> PoolResult<Option<SnapshotPool>> {
        let wanted = address.trim();
        Ok(self
            .get_all()
            .await?
            .iter()
            .find(|pool| pool.pool_address.to_string().eq_ignore_ascii_case(wanted))
            .cloned())
    }

    /// Case-insensitive substring search over pool address, name, symbol and token
    /// names and symbols. Only the empty query returns every pool.
    pub async fn search(&self, query: &str) -> PoolResult<Vec<SnapshotPool>> {
        let pools = self.get_all().await?;
        if query.is_empty() {
            return Ok(pools.as_ref().clone());
        }
        let needle = query.to_lowercase();
        Ok(pools.iter().filter(|pool| pool.matches(&needle)).cloned().collect())
    }

    pub async fn listings(&self) -> PoolResult<Vec<PoolListing>> {
        Ok(self.get_all().await?.iter().map(SnapshotPool::listing).collect())
    }

    /// Drops the cached catalogue; the next access reloads.
    pub async fn refresh(&self) {
        *self.cell.write().await = Arc::new(OnceCell::new());
    }
}
