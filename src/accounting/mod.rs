//! Liquidity accounting: quotes, vault payloads and approval planning

pub mod approvals;
pub mod encoder;
pub mod quote;

pub use approvals::*;
pub use encoder::*;
pub use quote::*;
