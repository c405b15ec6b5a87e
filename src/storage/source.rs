//! Where the aggregate store reads its snapshot from

use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use crate::{
    config::Config,
    errors::{PoolError, PoolResult},
    storage::snapshot::parse_snapshot,
    types::SnapshotPool,
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load(&self) -> PoolResult<Vec<SnapshotPool>>;

    fn describe(&self) -> String;
}

pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn load(&self) -> PoolResult<Vec<SnapshotPool>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))
            .map_err(|source| PoolError::Snapshot {
                context: format!("reading {}", self.path.display()),
                source,
            })?;
        parse_snapshot(&raw, &self.describe())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct HttpSnapshotSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSnapshotSource {
    pub fn new(url: impl Into<String>) -> PoolResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| PoolError::Snapshot {
                context: "building HTTP client".to_string(),
                source: e.into(),
            })?;
        Ok(Self { url: url.into(), client })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn load(&self) -> PoolResult<Vec<SnapshotPool>> {
        let to_error = |source: anyhow::Error| PoolError::Snapshot {
            context: format!("fetching {}", self.url),
            source,
        };

        let response = self.client
            .get(&self.url)
            .send()
            .await
            .context("Request failed")
            .map_err(to_error)?
            .error_for_status()
            .context("Snapshot endpoint returned an error status")
            .map_err(to_error)?;
        let body = response.text().await.context("Failed to read body").map_err(to_error)?;

        debug!(url = %self.url, bytes = body.len(), "Fetched snapshot");
        parse_snapshot(&body, &self.url)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// `SNAPSHOT_URL` wins over the snapshot file when set.
pub fn snapshot_source_from_config(config: &Config) -> PoolResult<Arc<dyn SnapshotSource>> {
    let source: Arc<dyn SnapshotSource> = match &config.snapshot_url {
        Some(url) => Arc::new(HttpSnapshotSource::new(url.clone())?),
        None => Arc::new(FileSnapshotSource::new(config.snapshot_path.clone())),
    };
    Ok(source)
}
