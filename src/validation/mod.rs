//! Input validation for pool creation

pub mod pool_form;

pub use pool_form::*;
