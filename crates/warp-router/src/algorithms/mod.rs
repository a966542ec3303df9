//! # Algorithms
//!
//! Pure arithmetic shared by routers and custody variants.

pub mod decimals;
pub mod fees;
pub mod shares;

pub use decimals::{convert_decimals, MAX_DECIMALS};
pub use fees::FeeCurve;
pub use shares::{convert_to_assets, convert_to_shares, mul_div, Rounding};
