//! Pool creation form validation

use alloy::primitives::{Address, U256};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::{
    errors::{PoolError, PoolResult},
    types::DEFAULT_RATE_PROVIDER,
    utils::{percent_to_wad, wad},
};

const WEIGHT_SUM_TOLERANCE: Decimal = dec!(0.01);
const MAX_SWAP_FEE_PERCENT: Decimal = dec!(10);

/// Raw user input for a new pool. Token, amount and weight lists are index-aligned;
/// weights and the swap fee are percentages.
#[derive(Debug, Clone, Default)]
pub struct PoolForm {
    pub name: String,
    pub symbol: String,
    pub tokens: Vec<String>,
    pub amounts: Vec<String>,
    pub weights: Vec<String>,
    pub swap_fee: String,
}

/// Arguments for the factory `create` call, minus owner and salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCreationParams {
    pub name: String,
    pub symbol: String,
    pub tokens: Vec<Address>,
    /// WAD-scaled, summing to exactly `1e18`.
    pub normalized_weights: Vec<U256>,
    pub rate_providers: Vec<Address>,
    /// WAD-scaled fraction.
    pub swap_fee_percentage: U256,
    pub initial_amounts: Vec<Decimal>,
}

fn invalid(reason: impl Into<String>) -> PoolError {
    PoolError::InvalidPoolForm { reason: reason.into() }
}

fn parse_positive(raw: &str, what: &str) -> PoolResult<Decimal> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| invalid(format!("{} '{}' is not a number", what, raw)))?;
    if value <= Decimal::ZERO {
        return Err(invalid(format!("{} must be greater than zero", what)));
    }
    Ok(value)
}

fn parse_token(raw: &str, index: usize) -> PoolResult<Address> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("token {} address is missing", index + 1)));
    }
    let address = Address::from_str(trimmed)
        .map_err(|_| invalid(format!("token {} address '{}' is invalid", index + 1, raw)))?;
    if address.is_zero() {
        return Err(invalid(format!("token {} address is the zero address", index + 1)));
    }
    Ok(address)
}

pub fn validate_pool_form(form: &PoolForm) -> PoolResult<PoolCreationParams> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(invalid("pool name is required"));
    }
    let symbol = form.symbol.trim();
    if symbol.is_empty() {
        return Err(invalid("pool symbol is required"));
    }

    let count = form.tokens.len();
    if count < 2 {
        return Err(invalid("a pool needs at least two tokens"));
    }
    if form.amounts.len() != count || form.weights.len() != count {
        return Err(invalid(format!(
            "{} tokens, {} amounts and {} weights do not line up",
            count,
            form.amounts.len(),
            form.weights.len()
        )));
    }

    let tokens = form
        .tokens
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_token(raw, index))
        .collect::<PoolResult<Vec<_>>>()?;
    for (index, token) in tokens.iter().enumerate() {
        if tokens[..index].contains(token) {
            return Err(invalid(format!("token {} is listed twice", token)));
        }
    }

    let initial_amounts = form
        .amounts
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_positive(raw, &format!("amount for token {}", index + 1)))
        .collect::<PoolResult<Vec<_>>>()?;

    let weights = form
        .weights
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_positive(raw, &format!("weight for token {}", index + 1)))
        .collect::<PoolResult<Vec<_>>>()?;
    let weight_sum: Decimal = weights.iter().sum();
    if (weight_sum - dec!(100)).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(invalid(format!("weights must sum to 100, got {}", weight_sum)));
    }

    let swap_fee = parse_positive(&form.swap_fee, "swap fee")?;
    if swap_fee > MAX_SWAP_FEE_PERCENT {
        return Err(invalid(format!(
            "swap fee {}% exceeds the {}% maximum",
            swap_fee, MAX_SWAP_FEE_PERCENT
        )));
    }

    Ok(PoolCreationParams {
        name: name.to_string(),
        symbol: symbol.to_string(),
        normalized_weights: normalize_weights(&weights)?,
        rate_providers: vec![DEFAULT_RATE_PROVIDER; tokens.len()],
        tokens,
        swap_fee_percentage: percent_to_wad(swap_fee)?,
        initial_amounts,
    })
}

/// Converts percentage weights to WAD. The last weight takes whatever remains so the
/// total is exactly one WAD.
pub fn normalize_weights(weights: &[Decimal]) -> PoolResult<Vec<U256>> {
    let Some((_, leading)) = weights.split_last() else {
        return Ok(Vec::new());
    };

    let mut normalized = leading
        .iter()
        .map(|w| percent_to_wad(*w))
        .collect::<PoolResult<Vec<_>>>()?;
    let assigned = normalized.iter().fold(U256::ZERO, |acc, w| acc.saturating_add(*w));

    let last = wad()
        .checked_sub(assigned)
        .filter(|w| !w.is_zero())
        .ok_or_else(|| invalid("weights leave nothing for the last token"))?;
    normalized.push(last);
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WAD;

    fn form() -> PoolForm {
        PoolForm {
            name: "Range 80/20".to_string(),
            symbol: "R-80-20".to_string(),
            tokens: vec![
                "0x1111111111111111111111111111111111111111".to_string(),
                "0x2222222222222222222222222222222222222222".to_string(),
            ],
            amounts: vec!["1.5".to_string(), "300".to_string()],
            weights: vec!["80".to_string(), "20".to_string()],
            swap_fee: "0.3".to_string(),
        }
    }

    fn reason(result: PoolResult<PoolCreationParams>) -> String {
        match result {
            Err(PoolError::InvalidPoolForm { reason }) => reason,
            other => panic!("expected form error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_a_valid_form() {
        let params = validate_pool_form(&form()).unwrap();
        assert_eq!(params.tokens[1], Address::repeat_byte(0x22));
        assert_eq!(
            params.normalized_weights,
            vec![U256::from(WAD / 10 * 8), U256::from(WAD / 10 * 2)]
        );
        assert_eq!(params.swap_fee_percentage, U256::from(3_000_000_000_000_000u128));
        assert_eq!(params.rate_providers, vec![Address::ZERO, Address::ZERO]);
        assert_eq!(params.initial_amounts, vec![dec!(1.5), dec!(300)]);
    }

    #[test]
    fn last_weight_absorbs_rounding() {
        let weights = normalize_weights(&[dec!(33.333333), dec!(33.333333), dec!(33.333334)]).unwrap();
        let total = weights.iter().fold(U256::ZERO, |acc, w| acc + *w);
        assert_eq!(total, U256::from(WAD));
    }

    #[test]
    fn rejects_blank_name_and_symbol() {
        let mut f = form();
        f.name = "  ".to_string();
        assert!(reason(validate_pool_form(&f)).contains("name"));

        let mut f = form();
        f.symbol = String::new();
        assert!(reason(validate_pool_form(&f)).contains("symbol"));
    }

    #[test]
    fn rejects_missing_and_zero_tokens() {
        let mut f = form();
        f.tokens[1] = String::new();
        assert!(reason(validate_pool_form(&f)).contains("missing"));

        let mut f = form();
        f.tokens[0] = "0x0000000000000000000000000000000000000000".to_string();
        assert!(reason(validate_pool_form(&f)).contains("zero address"));

        let mut f = form();
        f.tokens[1] = f.tokens[0].clone();
        assert!(reason(validate_pool_form(&f)).contains("twice"));
    }

    #[test]
    fn rejects_bad_amounts_and_weights() {
        let mut f = form();
        f.amounts[0] = "0".to_string();
        assert!(validate_pool_form(&f).is_err());

        let mut f = form();
        f.weights = vec!["60".to_string(), "30".to_string()];
        assert!(reason(validate_pool_form(&f)).contains("sum to 100"));

        let mut f = form();
        f.weights = vec!["79.995".to_string(), "20".to_string()];
        assert!(validate_pool_form(&f).is_ok());

        let mut f = form();
        f.weights.push("10".to_string());
        assert!(reason(validate_pool_form(&f)).contains("line up"));
    }

    #[test]
    fn swap_fee_must_be_within_bounds() {
        for (fee, ok) in [("0", false), ("10", true), ("10.01", false), ("abc", false), ("1", true)] {
            let mut f = form();
            f.swap_fee = fee.to_string();
            assert_eq!(validate_pool_form(&f).is_ok(), ok, "fee {}", fee);
        }
    }
}
