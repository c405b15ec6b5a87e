//! Pool-related types and structures

use alloy::primitives::{Address, B256, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::tokens::{ERROR_MARKER, TokenDescriptor};

/// One `PoolCreated` log observed on the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCreationRecord {
    pub pool: Address,
    pub block_number: u64,
    pub transaction_hash: B256,
    /// Raw input of the creation transaction, when it was requested.
    pub creation_input: Option<Bytes>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PausedState {
    pub paused: bool,
    pub pause_window_end_time: U256,
    pub buffer_period_end_time: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Swap,
    Join,
    Exit,
}

/// Historical pool interaction as carried by the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTransaction {
    pub hash: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: String,
    pub timestamp: DateTime<Utc>,
    pub from: String,
    pub to: String,
}

/// Aggregate view of a pool assembled from a live contract snapshot.
///
/// Index positions of `tokens`, `normalized_weights`, `scaling_factors`,
/// `virtual_balances` and `balances` refer to the same token.
#[derive(Debug, Clone, Default)]
pub struct PoolDescriptor {
    pub address: Address,
    pub pool_id: Option<B256>,
    pub vault: Option<Address>,
    pub owner: Option<Address>,
    pub name: String,
    pub symbol: String,
    pub total_supply: U256,
    pub actual_supply: U256,
    pub swap_fee_percentage: U256,
    pub tokens: Vec<TokenDescriptor>,
    pub normalized_weights: Vec<U256>,
    pub scaling_factors: Vec<U256>,
    pub virtual_balances: Vec<U256>,
    /// Vault-held balances, empty unless the vault path resolved the tokens.
    pub balances: Vec<U256>,
    pub invariant: U256,
    pub last_post_join_exit_invariant: U256,
    pub paused_state: PausedState,
    pub in_recovery_mode: bool,
    pub ath_rate_product: U256,
    pub transactions: Vec<PoolTransaction>,
    /// Reads that failed and were replaced by their documented default.
    pub degraded_fields: Vec<&'static str>,
    /// Set only on error-marker descriptors.
    pub fetch_error: Option<String>,
}

impl PoolDescriptor {
    /// Stand-in for a pool whose fetch failed as a whole.
    pub fn error_marker(address: Address, reason: impl Into<String>) -> Self {
        Self {
            address,
            name: ERROR_MARKER.to_string(),
            symbol: ERROR_MARKER.to_string(),
            fetch_error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.fetch_error.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_fields.is_empty()
    }

    /// Checks that per-token arrays line up. Arrays whose fetch failed are skipped.
    pub fn has_aligned_token_arrays(&self) -> bool {
        let expected = self.tokens.len();
        [
            ("normalized_weights", self.normalized_weights.len()),
            ("scaling_factors", self.scaling_factors.len()),
            ("virtual_balances", self.virtual_balances.len()),
        ]
        .iter()
        .filter(|(field, _)| !self.degraded_fields.contains(field))
        .all(|(_, len)| *len == expected)
    }

    pub fn token_addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|t| t.address).collect()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_state.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenSource;

    #[test]
    fn error_marker_sets_string_fields() {
        let pool = PoolDescriptor::error_marker(Address::repeat_byte(1), "rpc down");
        assert_eq!(pool.name, "Error");
        assert_eq!(pool.symbol, "Error");
        assert!(pool.is_error());
        assert_eq!(pool.total_supply, U256::ZERO);
    }

    #[test]
    fn alignment_ignores_defaulted_arrays() {
        let mut pool = PoolDescriptor {
            tokens: vec![
                TokenDescriptor::unknown(Address::repeat_byte(1), TokenSource::Vault),
                TokenDescriptor::unknown(Address::repeat_byte(2), TokenSource::Vault),
            ],
            normalized_weights: vec![U256::from(5u64), U256::from(5u64)],
            scaling_factors: vec![U256::from(1u64), U256::from(1u64)],
            virtual_balances: vec![],
            ..Default::default()
        };
        assert!(!pool.has_aligned_token_arrays());

        pool.degraded_fields.push("virtual_balances");
        assert!(pool.has_aligned_token_arrays());
    }

    #[test]
    fn transaction_kind_uses_lowercase_names() {
        let json = serde_json::to_string(&TransactionKind::Exit).unwrap();
        assert_eq!(json, "\"exit\"");
    }
}
