//! Error types shared across discovery, storage and execution

pub mod pool_error;

pub use pool_error::*;
