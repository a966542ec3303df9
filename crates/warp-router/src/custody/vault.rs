//! # Vault Custody
//!
//! Collateral parked in an ERC-4626 vault to earn yield.
//!
//! The router tracks `asset_deposited`: the asset units owed to users through
//! completed transfers. It moves only by exact transfer amounts, never by a
//! share-converted figure, so exchange-rate drift cannot leak principal.
//! Shares beyond what `asset_deposited` needs at the current rate are surplus
//! and go to the owner on [`VaultCustody::sweep`].

use std::sync::Arc;

use primitive_types::U256;
use shared_types::Address;
use tracing::debug;

use super::Custody;
use crate::adapters::LedgerToken;
use crate::domain::{invariant_sufficient_custody, invariant_vault_backing, CustodyKind, LedgerError, RouterError};
use crate::ports::Erc4626Vault;

/// Outcome of a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sweep {
    /// Shares redeemed.
    pub shares: U256,
    /// Assets paid to the receiver.
    pub assets: U256,
}

/// Token collateral deposited into a vault.
#[derive(Clone, Debug)]
pub struct VaultCustody {
    asset: LedgerToken,
    vault: Arc<dyn Erc4626Vault>,
    asset_deposited: U256,
}

impl VaultCustody {
    /// Custody of `asset` inside `vault`.
    #[must_use]
    pub fn new(asset: LedgerToken, vault: Arc<dyn Erc4626Vault>) -> Self {
        Self {
            asset,
            vault,
            asset_deposited: U256::zero(),
        }
    }

    /// Asset units owed to users.
    #[must_use]
    pub fn asset_deposited(&self) -> U256 {
        self.asset_deposited
    }

    /// Vault holding the collateral.
    #[must_use]
    pub fn vault(&self) -> &Arc<dyn Erc4626Vault> {
        &self.vault
    }

    /// Redeemable shares of `router` not needed to back `asset_deposited`.
    pub fn excess_shares(&self, router: Address) -> Result<U256, RouterError> {
        let needed = self.vault.preview_withdraw(self.asset_deposited)?;
        let surplus = self.vault.balance_of(router).saturating_sub(needed);
        Ok(surplus.min(self.vault.max_redeem(router)))
    }

    /// Redeem the surplus shares of `router` to `receiver`.
    pub fn sweep(&mut self, router: Address, receiver: Address) -> Result<Sweep, RouterError> {
        let shares = self.excess_shares(router)?;
        if shares.is_zero() {
            return Ok(Sweep::default());
        }
        let assets = self.vault.redeem(router, shares, receiver, router)?;
        debug_assert!(invariant_vault_backing(
            self.asset_deposited,
            self.vault.max_withdraw(router)
        ));
        Ok(Sweep { shares, assets })
    }
}

impl Custody for VaultCustody {
    fn kind(&self) -> CustodyKind {
        CustodyKind::Vault
    }

    fn token(&self) -> LedgerToken {
        self.asset.clone()
    }

    fn reserves(&self, router: Address) -> U256 {
        self.asset_deposited.min(self.vault.max_withdraw(router))
    }

    fn lock(
        &mut self,
        router: Address,
        from: Address,
        amount: U256,
        attached: U256,
    ) -> Result<U256, RouterError> {
        let deposited = self
            .asset_deposited
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.asset.transfer_from(router, from, router, amount)?;
        let shares = self.vault.deposit(router, amount, router)?;
        self.asset_deposited = deposited;
        debug!(%amount, %shares, asset_deposited = %deposited, "Deposited into vault");
        Ok(attached)
    }

    fn release(&mut self, router: Address, to: Address, amount: U256) -> Result<(), RouterError> {
        invariant_sufficient_custody(amount, self.reserves(router))?;
        let shares = self.vault.withdraw(router, amount, to, router)?;
        self.asset_deposited -= amount;
        debug!(%amount, %shares, asset_deposited = %self.asset_deposited, "Withdrew from vault");
        Ok(())
    }
}
