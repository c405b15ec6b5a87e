//! Range Pool Sync - discovery, snapshotting and liquidity operations for weighted
//! range pools deployed through a single factory
//!
//! The read path scans the factory for `PoolCreated` events, fetches each pool's
//! on-chain state and writes a JSON snapshot that the aggregate store serves
//! lookups and searches from. The write path approves, joins, exits and creates
//! pools through the vault with a signing provider.

pub mod abi;
pub mod accounting;
pub mod config;
pub mod errors;
pub mod execution;
pub mod network;
pub mod pools;
pub mod scanner;
pub mod storage;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{PoolError, PoolResult};
pub use types::*;

// Read-only provider over a boxed HTTP transport
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;

// Signing provider with recommended fillers, type-erased
pub type SharedProvider = std::sync::Arc<dyn alloy::providers::Provider>;
