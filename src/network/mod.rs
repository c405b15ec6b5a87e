//! Network providers, contract plumbing and batched fan-out

pub mod batch;
pub mod contracts;
pub mod providers;
pub mod retry;
#[cfg(test)]
pub mod scripted;

pub use batch::*;
pub use contracts::*;
pub use providers::*;
pub use retry::*;
