//! Pool snapshot persistence

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::{
    errors::{PoolError, PoolResult},
    types::{PoolCreationRecord, PoolDescriptor, SnapshotPool},
};

/// Joins scan records with their fetched descriptors, index by index.
pub fn build_snapshot(records: &[PoolCreationRecord], descriptors: &[PoolDescriptor]) -> PoolResult<Vec<SnapshotPool>> {
    if records.len() != descriptors.len() {
        return Err(PoolError::LengthMismatch {
            context: "snapshot records",
            expected: records.len(),
            actual: descriptors.len(),
        });
    }
    Ok(records
        .iter()
        .zip(descriptors)
        .map(|(record, descriptor)| SnapshotPool::from_scan(record, descriptor))
        .collect())
}

pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("backup.json")
}

/// Writes the snapshot as pretty JSON. The first overwrite of an existing file keeps
/// the previous contents at [`backup_path`].
pub fn save_snapshot(path: &Path, pools: &[SnapshotPool]) -> PoolResult<()> {
    let to_error = |context: String| move |source: anyhow::Error| PoolError::Snapshot { context, source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))
            .map_err(to_error("creating snapshot directory".to_string()))?;
    }

    let backup = backup_path(path);
    if path.exists() && !backup.exists() {
        fs::copy(path, &backup)
            .with_context(|| format!("Failed to back up {}", path.display()))
            .map_err(to_error("backing up snapshot".to_string()))?;
        info!("🗄️ Backed up previous snapshot to {}", backup.display());
    }

    let json = serde_json::to_string_pretty(pools)
        .context("Failed to serialize snapshot")
        .map_err(to_error("serializing snapshot".to_string()))?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))
        .map_err(to_error("writing snapshot".to_string()))?;

    info!(
        pools = pools.len(),
        path = %path.display(),
        "Saved pool snapshot"
    );
    Ok(())
}

pub fn load_snapshot(path: &Path) -> PoolResult<Vec<SnapshotPool>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .map_err(|source| PoolError::Snapshot {
            context: format!("reading {}", path.display()),
            source,
        })?;
    parse_snapshot(&raw, &path.display().to_string())
}

pub fn parse_snapshot(raw: &str, origin: &str) -> PoolResult<Vec<SnapshotPool>> {
    serde_json::from_str(raw).map_err(|e| {
        warn!("⚠️ Snapshot from {} is malformed: {}", origin, e);
        PoolError::Snapshot {
            context: format!("parsing {}", origin),
            source: e.into(),
        }
    })
}
