//! Synthetic custody: the router mints on arrival and burns on departure.

use primitive_types::U256;
use shared_types::Address;

use super::Custody;
use crate::adapters::LedgerToken;
use crate::domain::{CustodyKind, RouterError};

/// Router-controlled synthetic token. Supply on this domain mirrors collateral
/// held elsewhere, so releases are never short.
#[derive(Clone, Debug)]
pub struct SyntheticCustody {
    token: LedgerToken,
}

impl SyntheticCustody {
    /// Custody minting and burning `token`.
    #[must_use]
    pub fn new(token: LedgerToken) -> Self {
        Self { token }
    }
}

impl Custody for SyntheticCustody {
    fn kind(&self) -> CustodyKind {
        CustodyKind::Synthetic
    }

    fn token(&self) -> LedgerToken {
        self.token.clone()
    }

    fn reserves(&self, _: Address) -> U256 {
        U256::MAX - self.token.total_supply()
    }

    fn lock(&mut self, _: Address, from: Address, amount: U256, attached: U256) -> Result<U256, RouterError> {
        self.token.burn(from, amount)?;
        Ok(attached)
    }

    fn release(&mut self, _: Address, to: Address, amount: U256) -> Result<(), RouterError> {
        Ok(self.token.mint(to, amount)?)
    }
}
