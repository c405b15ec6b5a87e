//! Sync configuration settings and environment variable handling

use alloy::primitives::{Address, address};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use crate::errors::{PoolError, PoolResult};

// Factory deployment on Sepolia
pub const DEFAULT_FACTORY_ADDRESS: Address = address!("356632c353Cb850dd3E41e466FCbe5a0cAC003A8");
pub const FACTORY_DEPLOYMENT_BLOCK: u64 = 9_185_327;

// Log scanning constants
pub const DEFAULT_LOG_CHUNK_SIZE: u64 = 5_000;
pub const MAX_LOG_CHUNK_SIZE: u64 = 10_000; // provider eth_getLogs range ceiling

// Metadata fan-out constants
pub const DEFAULT_FETCH_BATCH_SIZE: usize = 5;
pub const MAX_FETCH_BATCH_SIZE: usize = 50;

// Write path constants
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50; // 0.5%
pub const MAX_SLIPPAGE_BPS: u32 = 1_000; // 10%
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_SNAPSHOT_PATH: &str = "output/snapshots/allPoolsData.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub network: String,
    pub rpc_url: Option<String>,
    pub alchemy_api_key: Option<String>,
    // Discovery
    pub factory_address: Address,
    pub start_block: u64,
    pub log_chunk_size: u64,
    pub fetch_batch_size: usize,
    pub fetch_creation_transactions: bool,
    // Snapshot
    pub snapshot_path: PathBuf,
    pub snapshot_url: Option<String>,
    // Writes
    pub private_key: Option<String>,
    pub slippage_tolerance_bps: u32,
    pub receipt_timeout_secs: u64,
    // Lookup
    pub pool_query: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: "sepolia".to_string(),
            rpc_url: None,
            alchemy_api_key: None,
            factory_address: DEFAULT_FACTORY_ADDRESS,
            start_block: FACTORY_DEPLOYMENT_BLOCK,
            log_chunk_size: DEFAULT_LOG_CHUNK_SIZE,
            fetch_batch_size: DEFAULT_FETCH_BATCH_SIZE,
            fetch_creation_transactions: true,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            snapshot_url: None,
            private_key: None,
            slippage_tolerance_bps: DEFAULT_SLIPPAGE_BPS,
            receipt_timeout_secs: DEFAULT_RECEIPT_TIMEOUT_SECS,
            pool_query: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            network: env::var("NETWORK")
                .unwrap_or(defaults.network),
            rpc_url: env::var("RPC_URL").ok(),
            alchemy_api_key: env::var("ALCHEMY_API_KEY").ok(),
            factory_address: env::var("FACTORY_ADDRESS")
                .ok()
                .and_then(|s| Address::from_str(&s).ok())
                .unwrap_or(defaults.factory_address),
            start_block: env::var("START_BLOCK")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.start_block),
            log_chunk_size: env::var("LOG_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.log_chunk_size)
                .clamp(1, MAX_LOG_CHUNK_SIZE),
            fetch_batch_size: env::var("FETCH_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fetch_batch_size)
                .clamp(1, MAX_FETCH_BATCH_SIZE),
            fetch_creation_transactions: env::var("FETCH_CREATION_TRANSACTIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            snapshot_url: env::var("SNAPSHOT_URL").ok(),
            private_key: env::var("PRIVATE_KEY").ok(),
            slippage_tolerance_bps: env::var("SLIPPAGE_TOLERANCE_BPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.slippage_tolerance_bps)
                .min(MAX_SLIPPAGE_BPS),
            receipt_timeout_secs: env::var("RECEIPT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.receipt_timeout_secs),
            pool_query: env::var("POOL_QUERY").ok(),
        }
    }

    /// Resolves the JSON-RPC endpoint. An explicit `RPC_URL` wins over the Alchemy key.
    pub fn rpc_endpoint(&self) -> PoolResult<String> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        match &self.alchemy_api_key {
            Some(key) => Ok(format!("https://eth-{}.g.alchemy.com/v2/{}", self.network, key)),
            None => Err(PoolError::ClientUnavailable {
                what: "RPC endpoint (set RPC_URL or ALCHEMY_API_KEY)".to_string(),
            }),
        }
    }
}
