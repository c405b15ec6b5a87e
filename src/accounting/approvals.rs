//! Deciding which token approvals a join needs

use alloy::primitives::{Address, U256};
use futures::future::join_all;
use tracing::{debug, warn};
use crate::{
    abi::IERC20,
    network::{read_contract, ContractReader},
};

/// One token that must be approved to the vault before joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalStep {
    /// Position of the token in the join's asset list.
    pub index: usize,
    pub token: Address,
    pub amount: U256,
}

/// Keeps tokens whose allowance does not cover the amount. An unknown allowance
/// counts as insufficient; zero amounts never need approval.
pub fn plan_approvals(requirements: &[(Address, U256)], allowances: &[Option<U256>]) -> Vec<ApprovalStep> {
    requirements
        .iter()
        .enumerate()
        .filter(|(_, (_, amount))| !amount.is_zero())
        .filter(|(index, (_, amount))| match allowances.get(*index).copied().flatten() {
            Some(allowance) => allowance < *amount,
            None => true,
        })
        .map(|(index, (token, amount))| ApprovalStep {
            index,
            token: *token,
            amount: *amount,
        })
        .collect()
}

/// Current allowances granted by `owner` to `spender`, `None` where unreadable.
pub async fn read_allowances(
    reader: &dyn ContractReader,
    owner: Address,
    spender: Address,
    tokens: &[Address],
) -> Vec<Option<U256>> {
    join_all(tokens.iter().map(|token| async move {
        match read_contract(reader, *token, IERC20::allowanceCall { owner, spender }).await {
            Ok(result) => {
                debug!(%token, allowance = %result._0, "Read allowance");
                Some(result._0)
            }
            Err(e) => {
                warn!("⚠️ Could not read allowance on {}: {:#}", token, e);
                None
            }
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_covered_and_zero_amounts() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let c = Address::repeat_byte(3);
        let d = Address::repeat_byte(4);
        let requirements = [
            (a, U256::from(100u64)),
            (b, U256::from(100u64)),
            (c, U256::ZERO),
            (d, U256::from(5u64)),
        ];
        let allowances = [Some(U256::from(100u64)), Some(U256::from(99u64)), None, None];

        let steps = plan_approvals(&requirements, &allowances);
        assert_eq!(
            steps,
            vec![
                ApprovalStep { index: 1, token: b, amount: U256::from(100u64) },
                ApprovalStep { index: 3, token: d, amount: U256::from(5u64) },
            ]
        );
    }

    #[test]
    fn missing_allowance_entries_need_approval() {
        let token = Address::repeat_byte(7);
        let steps = plan_approvals(&[(token, U256::from(1u64))], &[]);
        assert_eq!(steps.len(), 1);
    }
}
