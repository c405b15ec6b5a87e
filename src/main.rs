//! Range Pool Sync - Main Entry Point
//!
//! Scans the factory, fetches pool metadata, writes the snapshot and serves a lookup

use range_pool_sync::*;
use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let _logging_guard = utils::setup_logging()?;

    // Load configuration
    let config = CONFIG.clone();
    utils::setup_output_directories(&config.snapshot_path)?;

    info!("🏊 Range Pool Sync v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Network: {}", config.network);
    info!("   Factory: {}", config.factory_address);
    info!("   Start block: {}", config.start_block);
    info!("   Log chunk size: {}", config.log_chunk_size);
    info!("   Fetch batch size: {}", config.fetch_batch_size);
    info!("   Snapshot: {}", config.snapshot_path.display());

    let provider = network::setup_provider(&config).await?;

    // Scan
    let scan_started = Instant::now();
    let scanner = scanner::EventScanner::from_config(provider.clone(), &config);
    let records = scanner.scan().await?;
    utils::print_scan_summary(&records, scan_started.elapsed());

    // Fetch, reusing token lists from the previous snapshot where possible
    let fetcher = pools::PoolMetadataFetcher::from_config(provider.clone(), &config);
    if config.snapshot_path.exists() {
        match storage::load_snapshot(&config.snapshot_path) {
            Ok(previous) => {
                let seeded = fetcher.token_cache().seed_from_snapshot(&previous).await;
                info!("🗂️ Seeded token cache for {} pools from previous snapshot", seeded);
            }
            Err(e) => warn!("⚠️ Ignoring unreadable previous snapshot: {}", e),
        }
    }
    let descriptors = fetcher.fetch_records(&records).await;
    utils::print_fetch_summary(&descriptors);

    // Persist
    let snapshot = storage::build_snapshot(&records, &descriptors)?;
    storage::save_snapshot(&config.snapshot_path, &snapshot)?;

    // Serve
    let store = storage::AggregateStore::new(storage::snapshot_source_from_config(&config)?);
    let listings = store.listings().await?;
    info!("✅ Store holds {} pools", listings.len());

    if let Some(query) = &config.pool_query {
        let matches = store.search(query).await?;
        utils::print_search_results(query, &matches);

        let engine = match config.private_key {
            Some(_) => Some(execution::LiquidityEngine::from_config(&config)?),
            None => None,
        };
        for pool in &matches {
            let descriptor = match fetcher.fetch_one(pool.pool_address).await {
                Ok(descriptor) => {
                    utils::print_pool_descriptor(&descriptor);
                    Some(descriptor)
                }
                Err(e) => {
                    warn!("⚠️ Could not refresh {}: {}", pool.pool_address, e);
                    None
                }
            };
            let Some(engine) = &engine else { continue };

            let share = match engine.pool_share(pool.pool_address).await {
                Ok(share) => share,
                Err(e) => {
                    warn!("⚠️ Could not read share of {}: {}", pool.pool_address, e);
                    continue;
                }
            };
            utils::print_pool_share(&share);

            // what a full exit would pay out at current vault balances
            if let Some(descriptor) = descriptor.filter(|d| !share.balance.is_zero() && !d.balances.is_empty()) {
                match accounting::build_withdrawal_quote(
                    share.balance,
                    share.balance,
                    share.total_supply,
                    &descriptor.balances,
                    config.slippage_tolerance_bps,
                ) {
                    Ok(quote) => utils::print_withdrawal_quote(&quote),
                    Err(e) => warn!("⚠️ Could not quote exit from {}: {}", pool.pool_address, e),
                }
            }
        }
    }

    info!("👋 Done");
    Ok(())
}
