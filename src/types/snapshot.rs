//! Persisted pool snapshot records

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use super::{PoolCreationRecord, PoolDescriptor, PoolTransaction, TokenDescriptor, TokenSource};

/// Token entry as written in the snapshot. The address is kept verbatim since older
/// snapshots carry placeholder strings instead of hex addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl SnapshotToken {
    /// `None` when the stored address is not a real address.
    pub fn to_descriptor(&self) -> Option<TokenDescriptor> {
        let address = Address::from_str(&self.address).ok()?;
        if address.is_zero() {
            return None;
        }
        Some(TokenDescriptor {
            address,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            source: TokenSource::Cache,
        })
    }
}

impl From<&TokenDescriptor> for SnapshotToken {
    fn from(token: &TokenDescriptor) -> Self {
        Self {
            address: token.address.to_string(),
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            decimals: token.decimals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPool {
    pub pool_address: Address,
    pub block_number: u64,
    pub transaction_hash: B256,
    pub name: String,
    pub symbol: String,
    #[serde(with = "u256_decimal")]
    pub total_supply: U256,
    pub tokens: Vec<SnapshotToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<PoolTransaction>>,
}

impl SnapshotPool {
    pub fn from_scan(record: &PoolCreationRecord, descriptor: &PoolDescriptor) -> Self {
        Self {
            pool_address: record.pool,
            block_number: record.block_number,
            transaction_hash: record.transaction_hash,
            name: descriptor.name.clone(),
            symbol: descriptor.symbol.clone(),
            total_supply: descriptor.total_supply,
            tokens: descriptor.tokens.iter().map(SnapshotToken::from).collect(),
            transactions: if descriptor.transactions.is_empty() {
                None
            } else {
                Some(descriptor.transactions.clone())
            },
        }
    }

    /// Case-insensitive substring match; `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.pool_address.to_string().to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self.symbol.to_lowercase().contains(needle)
            || self.tokens.iter().any(|token| {
                token.name.to_lowercase().contains(needle)
                    || token.symbol.to_lowercase().contains(needle)
            })
    }

    pub fn listing(&self) -> PoolListing {
        PoolListing {
            pool: self.pool_address,
            block_number: self.block_number,
            transaction_hash: self.transaction_hash,
        }
    }
}

/// Minimal row used by pool lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolListing {
    pub pool: Address,
    pub block_number: u64,
    pub transaction_hash: B256,
}

/// (De)serializes a `U256` as a base-10 string.
pub mod u256_decimal {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_str_radix(raw.trim(), 10).map_err(D::Error::custom)
    }
}
