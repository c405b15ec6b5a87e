//! Core data types and structures

pub mod addresses;
pub mod liquidity;
pub mod pools;
pub mod snapshot;
pub mod tokens;

pub use addresses::*;
pub use liquidity::*;
pub use pools::*;
pub use snapshot::*;
pub use tokens::*;
