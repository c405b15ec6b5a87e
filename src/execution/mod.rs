//! Signed on-chain operations

pub mod engine;

pub use engine::*;
