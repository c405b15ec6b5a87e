//! Proportional withdrawal quotes

use alloy::primitives::U256;
use crate::{
    errors::{PoolError, PoolResult},
    types::WithdrawalQuote,
    utils::{mul_div_down, BPS_DENOMINATOR},
};

/// Rejects withdrawing more pool shares than the caller holds.
pub fn ensure_withdrawable(requested: U256, owned: U256) -> PoolResult<()> {
    if requested > owned {
        return Err(PoolError::InsufficientPoolShare { requested, owned });
    }
    Ok(())
}

/// `floor(shares * balance / total_supply)` for each balance, computed without
/// intermediate overflow. All zeros when the pool has no supply.
pub fn quote_withdrawal(shares: U256, total_supply: U256, balances: &[U256]) -> PoolResult<Vec<U256>> {
    if total_supply.is_zero() {
        return Ok(vec![U256::ZERO; balances.len()]);
    }

    balances
        .iter()
        .enumerate()
        .map(|(index, balance)| {
            mul_div_down(shares, *balance, total_supply).ok_or_else(|| PoolError::InvalidAmount {
                context: format!("withdrawal quote for token {}", index),
                reason: "result does not fit 256 bits".to_string(),
            })
        })
        .collect()
}

/// Reduces `amount` by `slippage_bps` basis points, rounding down.
pub fn apply_slippage(amount: U256, slippage_bps: u32) -> U256 {
    let kept = BPS_DENOMINATOR.saturating_sub(slippage_bps.min(BPS_DENOMINATOR));
    mul_div_down(amount, U256::from(kept), U256::from(BPS_DENOMINATOR)).unwrap_or(U256::ZERO)
}

/// Full exit quote: checks the holding, then derives amounts and their slippage floors.
pub fn build_withdrawal_quote(
    bpt_amount_in: U256,
    owned: U256,
    total_supply: U256,
    balances: &[U256],
    slippage_bps: u32,
) -> PoolResult<WithdrawalQuote> {
    ensure_withdrawable(bpt_amount_in, owned)?;
    let amounts_out = quote_withdrawal(bpt_amount_in, total_supply, balances)?;
    let min_amounts_out = amounts_out
        .iter()
        .map(|amount| apply_slippage(*amount, slippage_bps))
        .collect();

    Ok(WithdrawalQuote {
        bpt_amount_in,
        amounts_out,
        min_amounts_out,
    })
}
