//! # Decimal Scaling
//!
//! Routers on different domains may represent the same token with different
//! decimals. Amounts are scaled on the way out and on the way back in.

use primitive_types::U256;
use std::cmp::Ordering;

/// Largest decimals value whose power of ten fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// Rescale `amount` from `from_decimals` to `to_decimals`.
///
/// Scaling down truncates. Returns `None` if scaling up overflows.
#[must_use]
pub fn convert_decimals(amount: U256, from_decimals: u8, to_decimals: u8) -> Option<U256> {
    match from_decimals.cmp(&to_decimals) {
        Ordering::Greater => {
            let divisor = U256::from(10u64).checked_pow(U256::from(from_decimals - to_decimals));
            divisor.and_then(|d| amount.checked_div(d))
        }
        Ordering::Less => {
            let multiplier = U256::from(10u64).checked_pow(U256::from(to_decimals - from_decimals));
            multiplier.and_then(|m| amount.checked_mul(m))
        }
        Ordering::Equal => Some(amount),
    }
}
