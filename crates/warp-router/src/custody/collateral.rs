//! Custody of a pre-existing token held by the router.

use primitive_types::U256;
use shared_types::Address;
use tracing::debug;

use super::{Custody, MovableCustody};
use crate::adapters::LedgerToken;
use crate::domain::{invariant_sufficient_custody, CustodyKind, RouterError};

/// Token collateral. Senders approve the router, which pulls what it locks.
#[derive(Clone, Debug)]
pub struct CollateralCustody {
    token: LedgerToken,
}

impl CollateralCustody {
    /// Custody over `token`.
    #[must_use]
    pub fn new(token: LedgerToken) -> Self {
        Self { token }
    }
}

impl Custody for CollateralCustody {
    fn kind(&self) -> CustodyKind {
        CustodyKind::Collateral
    }

    fn token(&self) -> LedgerToken {
        self.token.clone()
    }

    fn reserves(&self, router: Address) -> U256 {
        self.token.balance_of(router)
    }

    fn lock(
        &mut self,
        router: Address,
        from: Address,
        amount: U256,
        attached: U256,
    ) -> Result<U256, RouterError> {
        self.token.transfer_from(router, from, router, amount)?;
        Ok(attached)
    }

    fn release(&mut self, router: Address, to: Address, amount: U256) -> Result<(), RouterError> {
        invariant_sufficient_custody(amount, self.reserves(router))?;
        Ok(self.token.transfer(router, to, amount)?)
    }
}

impl MovableCustody for CollateralCustody {
    fn fund_bridge(&mut self, router: Address, bridge: Address, amount: U256) -> Result<(), RouterError> {
        if self.token.allowance(router, bridge) >= amount {
            return Ok(());
        }
        debug!(bridge = ?bridge, %amount, "Approving bridge");
        Ok(self.token.approve(router, bridge, amount)?)
    }
}
