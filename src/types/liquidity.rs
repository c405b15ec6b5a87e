//! Liquidity operation types

use alloy::primitives::{Address, B256, U256, utils::{ParseUnits, parse_units}};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::errors::{PoolError, PoolResult};

/// Human-readable token amount, only alive while composing a join or exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Address,
    pub amount: String,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(token: Address, amount: impl Into<String>, decimals: u8) -> Self {
        Self {
            token,
            amount: amount.into(),
            decimals,
        }
    }

    /// Converts the decimal string to base units, rejecting negatives.
    pub fn base_units(&self) -> PoolResult<U256> {
        let context = || format!("token {}", self.token);
        match parse_units(self.amount.trim(), self.decimals) {
            Ok(ParseUnits::U256(value)) => Ok(value),
            Ok(ParseUnits::I256(_)) => Err(PoolError::InvalidAmount {
                context: context(),
                reason: format!("amount {} is negative", self.amount),
            }),
            Err(e) => Err(PoolError::InvalidAmount {
                context: context(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Caller's holding of a pool's share token.
#[derive(Debug, Clone, Serialize)]
pub struct PoolShare {
    pub balance: U256,
    pub total_supply: U256,
    /// Percentage of supply, two decimal places.
    pub percent: Decimal,
}

#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub pool: Address,
    pub pool_id: B256,
    pub vault: Address,
    pub amounts: Vec<TokenAmount>,
    /// Required for the first join into an empty pool.
    pub virtual_balances: Vec<U256>,
    pub min_bpt_out: U256,
    pub from_internal_balance: bool,
}

#[derive(Debug, Clone)]
pub struct ExitRequest {
    pub pool: Address,
    pub pool_id: B256,
    pub vault: Address,
    pub tokens: Vec<Address>,
    pub bpt_amount_in: U256,
    pub to_internal_balance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalQuote {
    pub bpt_amount_in: U256,
    pub amounts_out: Vec<U256>,
    pub min_amounts_out: Vec<U256>,
}

/// Hashes of a confirmed two-phase liquidity operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityReceipt {
    pub approvals: Vec<B256>,
    pub transaction_hash: B256,
}
