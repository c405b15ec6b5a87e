//! Protocol constants

use alloy::primitives::{Address, B256};

// Pool creation defaults
pub const DEFAULT_RATE_PROVIDER: Address = Address::ZERO;
pub const ZERO_SALT: B256 = B256::ZERO;

// Fixed-point scale used for weights and fee percentages
pub const WAD: u128 = 1_000_000_000_000_000_000;
