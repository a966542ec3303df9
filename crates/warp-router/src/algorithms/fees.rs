//! # Token Fee Curves
//!
//! Fees charged in the transferred token, parameterized by a cap `max_fee` and
//! the amount `half_amount` at which the fee reaches half the cap.
//!
//! | Curve | Formula |
//! |-------|---------|
//! | Linear | `min(max_fee, amount * max_fee / (2 * half_amount))` |
//! | Progressive | `max_fee * amount² / (half_amount² + amount²)` |
//! | Regressive | `max_fee * amount / (half_amount + amount)` |
//!
//! All curves round down and never exceed `max_fee`.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::shares::{mul_div, Rounding};

/// Fee as a function of the transferred amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeeCurve {
    /// No fee.
    Zero,
    /// Grows linearly until capped.
    #[serde(rename_all = "camelCase")]
    Linear {
        /// Cap
        max_fee: U256,
        /// Amount charged half the cap
        half_amount: U256,
    },
    /// Small transfers nearly free, large ones approach the cap.
    #[serde(rename_all = "camelCase")]
    Progressive {
        /// Cap
        max_fee: U256,
        /// Amount charged half the cap
        half_amount: U256,
    },
    /// Fee rate falls as the amount grows.
    #[serde(rename_all = "camelCase")]
    Regressive {
        /// Cap
        max_fee: U256,
        /// Amount charged half the cap
        half_amount: U256,
    },
}

impl Default for FeeCurve {
    fn default() -> Self {
        Self::Zero
    }
}

impl FeeCurve {
    /// Fee for `amount`.
    #[must_use]
    pub fn fee(&self, amount: U256) -> U256 {
        if amount.is_zero() {
            return U256::zero();
        }
        match *self {
            Self::Zero => U256::zero(),
            Self::Linear {
                max_fee,
                half_amount,
            } => mul_div(amount, max_fee, half_amount.saturating_mul(U256::from(2u8)), Rounding::Down)
                .map_or(max_fee, |fee| fee.min(max_fee)),
            Self::Progressive {
                max_fee,
                half_amount,
            } => {
                let (a, h) = narrow(amount, half_amount, 127);
                let a2 = a * a;
                mul_div(max_fee, a2, h * h + a2, Rounding::Down).unwrap_or_default()
            }
            Self::Regressive {
                max_fee,
                half_amount,
            } => {
                let (a, h) = narrow(amount, half_amount, 255);
                mul_div(max_fee, a, h + a, Rounding::Down).unwrap_or_default()
            }
        }
    }
}

/// Shift both operands right until each fits in `bits` bits, keeping their
/// ratio.
fn narrow(a: U256, b: U256, bits: usize) -> (U256, U256) {
    let shift = a.bits().max(b.bits()).saturating_sub(bits);
    (a >> shift, b >> shift)
}
