//! Vault `userData` payloads for joins and exits

use alloy::{
    primitives::{Bytes, U256},
    sol_types::SolValue,
};
use crate::errors::{PoolError, PoolResult};

/// Join request kinds understood by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JoinKind {
    Init = 0,
    ExactTokensInForBptOut = 1,
    TokenInForExactBptOut = 2,
    AllTokensInForExactBptOut = 3,
    AddToken = 4,
}

impl JoinKind {
    pub fn code(self) -> U256 {
        U256::from(self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitKind {
    ExactBptInForOneTokenOut = 0,
    ExactBptInForTokensOut = 1,
    BptInForExactTokensOut = 2,
}

impl ExitKind {
    pub fn code(self) -> U256 {
        U256::from(self as u8)
    }
}

/// Encodes the first join into an empty pool as `(INIT, amountsIn, virtualBalances)`.
///
/// Every deposit must fit within its virtual balance; the first index that does not
/// is reported.
pub fn prepare_initial_deposit(amounts_in: &[U256], virtual_balances: &[U256]) -> PoolResult<Bytes> {
    if amounts_in.len() != virtual_balances.len() {
        return Err(PoolError::LengthMismatch {
            context: "initial deposit",
            expected: virtual_balances.len(),
            actual: amounts_in.len(),
        });
    }

    if let Some((index, (amount, virtual_balance))) = amounts_in
        .iter()
        .zip(virtual_balances)
        .enumerate()
        .find(|(_, (amount, virtual_balance))| amount > virtual_balance)
    {
        return Err(PoolError::DepositExceedsVirtualBalance {
            index,
            amount: *amount,
            virtual_balance: *virtual_balance,
        });
    }

    Ok((JoinKind::Init.code(), amounts_in.to_vec(), virtual_balances.to_vec())
        .abi_encode_params()
        .into())
}

/// `(EXACT_TOKENS_IN_FOR_BPT_OUT, amountsIn, minimumBptOut)`
pub fn encode_exact_tokens_join(amounts_in: &[U256], min_bpt_out: U256) -> Bytes {
    (JoinKind::ExactTokensInForBptOut.code(), amounts_in.to_vec(), min_bpt_out)
        .abi_encode_params()
        .into()
}

/// `(EXACT_BPT_IN_FOR_TOKENS_OUT, bptAmountIn)`
pub fn encode_proportional_exit(bpt_amount_in: U256) -> Bytes {
    (ExitKind::ExactBptInForTokensOut.code(), bpt_amount_in)
        .abi_encode_params()
        .into()
}
