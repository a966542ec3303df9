//! # Share Accounting
//!
//! Proportional conversion between assets and shares for vaults and LP pools.
//!
//! Products are computed in 512 bits so that `assets * supply` never overflows
//! before the division. With no shares outstanding the rate is 1:1.

use primitive_types::{U256, U512};

/// Rounding direction of a division.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero. Used when the pool pays out.
    Down,
    /// Away from zero. Used when the pool takes in.
    Up,
}

/// `x * y / denominator` without intermediate overflow.
///
/// Returns `None` for a zero denominator or a quotient above `U256::MAX`.
#[must_use]
pub fn mul_div(x: U256, y: U256, denominator: U256, rounding: Rounding) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let (quotient, remainder) = x.full_mul(y).div_mod(U512::from(denominator));
    let quotient = if rounding == Rounding::Up && !remainder.is_zero() {
        quotient + U512::one()
    } else {
        quotient
    };
    U256::try_from(quotient).ok()
}

/// Shares worth `assets` at the current rate.
#[must_use]
pub fn convert_to_shares(
    assets: U256,
    total_assets: U256,
    total_supply: U256,
    rounding: Rounding,
) -> Option<U256> {
    if total_supply.is_zero() {
        return Some(assets);
    }
    mul_div(assets, total_supply, total_assets, rounding)
}

/// Assets worth `shares` at the current rate.
#[must_use]
pub fn convert_to_assets(
    shares: U256,
    total_assets: U256,
    total_supply: U256,
    rounding: Rounding,
) -> Option<U256> {
    if total_supply.is_zero() {
        return Some(shares);
    }
    mul_div(shares, total_assets, total_supply, rounding)
}
