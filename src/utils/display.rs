//! Display and printing utilities

use std::time::Duration;
use tracing::{info, warn};
use crate::{
    types::{PoolCreationRecord, PoolDescriptor, PoolShare, SnapshotPool, WithdrawalQuote},
    utils::{format_units_lossy, wad_to_percent},
};

pub fn print_scan_summary(records: &[PoolCreationRecord], elapsed: Duration) {
    info!("\n🔍 Scan Summary ({:.1}s)", elapsed.as_secs_f64());
    info!("   Pools discovered: {}", records.len());
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        info!("   Block span: {} → {}", first.block_number, last.block_number);
    }
    let with_input = records.iter().filter(|r| r.creation_input.is_some()).count();
    info!("   Creation inputs attached: {}", with_input);
}

pub fn print_fetch_summary(descriptors: &[PoolDescriptor]) {
    let failed = descriptors.iter().filter(|d| d.is_error()).count();
    let degraded = descriptors.iter().filter(|d| !d.is_error() && d.is_degraded()).count();

    info!("\n📦 Metadata Summary");
    info!("   Complete: {}", descriptors.len() - failed - degraded);
    info!("   Degraded: {}", degraded);
    info!("   Failed:   {}", failed);

    for descriptor in descriptors.iter().filter(|d| d.is_error()) {
        warn!(
            "   ❌ {}: {}",
            descriptor.address,
            descriptor.fetch_error.as_deref().unwrap_or("unknown error")
        );
    }
}

pub fn print_pool_descriptor(pool: &PoolDescriptor) {
    info!("\n🏊 {} ({})", pool.name, pool.symbol);
    info!("📍 Address: {}", pool.address);
    if let Some(pool_id) = pool.pool_id {
        info!("   Pool id: {}", pool_id);
    }
    info!("   Total supply: {}", format_units_lossy(pool.total_supply, 18));
    info!(
        "   Swap fee: {}%",
        wad_to_percent(pool.swap_fee_percentage).map(|p| p.normalize().to_string()).unwrap_or_else(|| "?".to_string())
    );
    for (index, token) in pool.tokens.iter().enumerate() {
        let weight = pool
            .normalized_weights
            .get(index)
            .and_then(|w| wad_to_percent(*w))
            .map(|p| format!("{:.2}%", p))
            .unwrap_or_else(|| "-".to_string());
        info!("   • {} ({}) weight {} [{:?}]", token.symbol, token.address, weight, token.source);
    }
    if pool.is_paused() {
        warn!("   ⏸️ Pool is paused");
    }
    if pool.in_recovery_mode {
        warn!("   🛟 Pool is in recovery mode");
    }
}

pub fn print_search_results(query: &str, pools: &[SnapshotPool]) {
    info!("\n🔎 {} pools match '{}'", pools.len(), query);
    for pool in pools {
        let symbols: Vec<&str> = pool.tokens.iter().map(|t| t.symbol.as_str()).collect();
        info!(
            "   {} {} [{}] block {}",
            pool.pool_address,
            pool.name,
            symbols.join("/"),
            pool.block_number
        );
    }
}

pub fn print_pool_share(share: &PoolShare) {
    info!("   Your share: {}% ({} of {})", share.percent, share.balance, share.total_supply);
}

pub fn print_withdrawal_quote(quote: &WithdrawalQuote) {
    info!("\n💸 Withdrawal of {} shares", quote.bpt_amount_in);
    for (index, (amount, min)) in quote.amounts_out.iter().zip(&quote.min_amounts_out).enumerate() {
        info!("   Token {}: {} (min {})", index + 1, amount, min);
    }
}
