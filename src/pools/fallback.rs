//! Per-field guarded contract reads

use alloy::{primitives::Address, sol_types::SolCall};
use std::future::Future;
use tracing::warn;
use crate::network::{read_contract, ContractReader};

/// Outcome of a read that substitutes a default on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Guarded<T> {
    pub field: &'static str,
    pub value: T,
    pub defaulted: bool,
}

impl<T> Guarded<T> {
    /// Unwraps the value, recording the field name if it was defaulted.
    pub fn take(self, degraded: &mut Vec<&'static str>) -> T {
        if self.defaulted {
            degraded.push(self.field);
        }
        self.value
    }
}

pub async fn read_or_default<T, Fut>(
    contract: Address,
    field: &'static str,
    read: Fut,
    default: T,
) -> Guarded<T>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    match read.await {
        Ok(value) => Guarded { field, value, defaulted: false },
        Err(e) => {
            warn!("⚠️ {} read failed on {}, using default: {:#}", field, contract, e);
            Guarded { field, value: default, defaulted: true }
        }
    }
}

/// Guarded single-call read; `extract` picks the value out of the decoded return.
pub async fn guarded_call<C, T>(
    reader: &dyn ContractReader,
    contract: Address,
    field: &'static str,
    call: C,
    default: T,
    extract: impl FnOnce(C::Return) -> T,
) -> Guarded<T>
where
    C: SolCall,
{
    read_or_default(
        contract,
        field,
        async move { read_contract(reader, contract, call).await.map(extract) },
        default,
    )
    .await
}
