//! Pool metadata, token discovery and share reads

pub mod fallback;
pub mod info;
pub mod liquidity;
pub mod reserves;
pub mod tokens;

pub use fallback::*;
pub use info::*;
pub use liquidity::*;
pub use reserves::*;
pub use tokens::*;
