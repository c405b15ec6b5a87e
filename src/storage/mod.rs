//! Snapshot persistence and the aggregate pool store

pub mod snapshot;
pub mod source;
pub mod store;

pub use snapshot::*;
pub use source::*;
pub use store::*;
