//! Native currency custody.

use primitive_types::U256;
use shared_types::Address;

use super::{Custody, MovableCustody};
use crate::adapters::{DomainLedger, LedgerToken};
use crate::domain::{invariant_sufficient_custody, invariant_sufficient_value, CustodyKind, RouterError};

/// The router's own native balance is the reserve.
#[derive(Clone, Debug)]
pub struct NativeCustody {
    native: LedgerToken,
}

impl NativeCustody {
    /// Custody over the native currency of `ledger`.
    #[must_use]
    pub fn new(ledger: &DomainLedger) -> Self {
        Self {
            native: ledger.native(),
        }
    }
}

impl Custody for NativeCustody {
    fn kind(&self) -> CustodyKind {
        CustodyKind::Native
    }

    fn token(&self) -> LedgerToken {
        self.native.clone()
    }

    fn reserves(&self, router: Address) -> U256 {
        self.native.balance_of(router)
    }

    fn lock(&mut self, _: Address, _: Address, amount: U256, attached: U256) -> Result<U256, RouterError> {
        // the attached value already sits in the router's balance
        invariant_sufficient_value(amount, attached)?;
        Ok(attached - amount)
    }

    fn release(&mut self, router: Address, to: Address, amount: U256) -> Result<(), RouterError> {
        invariant_sufficient_custody(amount, self.reserves(router))?;
        Ok(self.native.transfer(router, to, amount)?)
    }
}

impl MovableCustody for NativeCustody {
    fn fund_bridge(&mut self, _: Address, _: Address, _: U256) -> Result<(), RouterError> {
        // native bridges are paid through attached value
        Ok(())
    }
}
