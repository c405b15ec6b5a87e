//! Custom error types for pool discovery and liquidity operations

use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Contract interaction failed: {contract} - {message}")]
    Contract {
        contract: Address,
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Log scan failed for blocks {from_block}..={to_block}")]
    Scan {
        from_block: u64,
        to_block: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("{what} is not available")]
    ClientUnavailable {
        what: String,
    },

    #[error("Cannot withdraw {requested} pool shares, balance is {owned}")]
    InsufficientPoolShare {
        requested: U256,
        owned: U256,
    },

    #[error("Deposit at index {index} ({amount}) exceeds its virtual balance ({virtual_balance})")]
    DepositExceedsVirtualBalance {
        index: usize,
        amount: U256,
        virtual_balance: U256,
    },

    #[error("Length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid amount for {context}: {reason}")]
    InvalidAmount {
        context: String,
        reason: String,
    },

    #[error("Invalid pool form: {reason}")]
    InvalidPoolForm {
        reason: String,
    },

    #[error("Approval of token {token} (index {index}) failed")]
    Approval {
        token: Address,
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transaction failed during {stage}: {message}")]
    Transaction {
        stage: &'static str,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Snapshot error: {context}")]
    Snapshot {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type PoolResult<T> = Result<T, PoolError>;
