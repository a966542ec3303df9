//! # Domain Invariants
//!
//! Checks every router applies before moving value.

use primitive_types::U256;
use shared_types::{DomainId, H256};

use super::errors::RouterError;

/// Invariant: inbound messages are only honored from the router enrolled for
/// their origin.
pub fn invariant_trusted_sender(
    enrolled: Option<&H256>,
    origin: DomainId,
    sender: H256,
) -> Result<(), RouterError> {
    match enrolled {
        Some(router) if *router == sender => Ok(()),
        _ => Err(RouterError::UntrustedSender { origin, sender }),
    }
}

/// Invariant: attached native value covers what the operation consumes.
pub fn invariant_sufficient_value(required: U256, supplied: U256) -> Result<(), RouterError> {
    if supplied < required {
        return Err(RouterError::InsufficientValue { required, supplied });
    }
    Ok(())
}

/// Invariant: a release never exceeds what the router holds.
pub fn invariant_sufficient_custody(required: U256, available: U256) -> Result<(), RouterError> {
    if available < required {
        return Err(RouterError::InsufficientCustody {
            required,
            available,
        });
    }
    Ok(())
}

/// Invariant: vault shares held by the router redeem to at least the principal
/// users are owed.
pub fn invariant_vault_backing(asset_deposited: U256, redeemable: U256) -> bool {
    redeemable >= asset_deposited
}

/// Invariant: a fast fee leaves something for the recipient.
pub fn invariant_fast_fee_below_amount(amount: U256, fast_fee: U256) -> Result<(), RouterError> {
    if fast_fee >= amount {
        return Err(RouterError::FastFeeExceedsAmount { amount, fast_fee });
    }
    Ok(())
}
