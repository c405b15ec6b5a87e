//! Mathematical utility functions

use alloy::primitives::{U256, U512};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::{
    errors::{PoolError, PoolResult},
    types::WAD,
};

pub const BPS_DENOMINATOR: u32 = 10_000;

pub fn pow10(n: i32) -> Decimal {
    match n {
        0 => dec!(1),
        2 => dec!(100),
        16 => dec!(10_000_000_000_000_000),
        18 => dec!(1_000_000_000_000_000_000),
        _ => {
            let mut result = dec!(1);
            if n > 0 {
                for _ in 0..n {
                    result *= dec!(10);
                }
            } else {
                for _ in 0..(-n) {
                    result /= dec!(10);
                }
            }
            result
        }
    }
}

/// Converts a percentage such as `33.5` into its WAD fraction (`0.335e18`).
/// Digits below WAD precision are truncated.
pub fn percent_to_wad(percent: Decimal) -> PoolResult<U256> {
    if percent.is_sign_negative() {
        return Err(PoolError::InvalidAmount {
            context: "percentage".to_string(),
            reason: format!("{} is negative", percent),
        });
    }
    let scaled = percent
        .checked_mul(pow10(16))
        .map(|v| v.trunc())
        .and_then(|v| v.to_u128())
        .ok_or_else(|| PoolError::InvalidAmount {
            context: "percentage".to_string(),
            reason: format!("{} does not fit a WAD fraction", percent),
        })?;
    Ok(U256::from(scaled))
}

/// Inverse of [`percent_to_wad`], for display.
pub fn wad_to_percent(value: U256) -> Option<Decimal> {
    let raw = u128::try_from(value).ok()?;
    let whole = Decimal::from_u128(raw)?;
    Some(whole / pow10(16))
}

/// `floor(a * b / denominator)` over a 512-bit product. `None` on a zero
/// denominator or when the quotient does not fit 256 bits.
pub fn mul_div_down(a: U256, b: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let product: U512 = a.widening_mul(b);
    let quotient = product / U512::from(denominator);

    let limbs = quotient.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// `balance * 100 / total_supply`, rounded to two decimal places. Zero supply gives zero.
pub fn pool_share_percent(balance: U256, total_supply: U256) -> Decimal {
    if total_supply.is_zero() {
        return Decimal::ZERO;
    }
    // four decimals of headroom before rounding to two
    let scaled = mul_div_down(balance, U256::from(1_000_000u64), total_supply)
        .and_then(|v| i64::try_from(v).ok());
    match scaled {
        Some(raw) => Decimal::new(raw, 4)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        None => Decimal::MAX,
    }
}

/// Formats base units with the token's decimals, e.g. `1500000` at 6 decimals is `1.5`.
pub fn format_units_lossy(value: U256, decimals: u8) -> String {
    alloy::primitives::utils::format_units(value, decimals)
        .map(|s| {
            if s.contains('.') {
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                s
            }
        })
        .unwrap_or_else(|_| value.to_string())
}

pub fn wad() -> U256 {
    U256::from(WAD)
}
