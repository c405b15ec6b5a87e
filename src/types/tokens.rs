//! Token descriptor types

use alloy::primitives::Address;
use serde::Serialize;

pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;
pub const UNKNOWN: &str = "Unknown";
pub const ERROR_MARKER: &str = "Error";

/// Where a token identity was resolved from, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenSource {
    Cache,
    Vault,
    CreationTransaction,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDescriptor {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub source: TokenSource,
}

impl TokenDescriptor {
    pub fn unknown(address: Address, source: TokenSource) -> Self {
        Self {
            address,
            name: UNKNOWN.to_string(),
            symbol: UNKNOWN.to_string(),
            decimals: DEFAULT_TOKEN_DECIMALS,
            source,
        }
    }

    /// Non-identifying stand-in used only when every real discovery path failed.
    /// `index` is zero-based; labels are one-based.
    pub fn placeholder(index: usize) -> Self {
        Self {
            address: Address::ZERO,
            name: format!("Unknown Token {}", index + 1),
            symbol: format!("TKN{}", index + 1),
            decimals: DEFAULT_TOKEN_DECIMALS,
            source: TokenSource::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == TokenSource::Placeholder
    }
}
