//! Factory event scanning

pub mod events;
pub mod source;

pub use events::*;
pub use source::*;
