//! Entry points only some custody variants have: sweeping vault surplus and
//! the LP pool's deposit / withdraw / redeem / donate.

use primitive_types::U256;
use shared_types::Address;
use tracing::{info, instrument};
use warp_telemetry::{metric_inc, VAULT_SWEEPS};

use super::observe;
use super::token_router::TokenRouter;
use crate::custody::vault::Sweep;
use crate::custody::{Custody, LpCustody, VaultCustody};
use crate::domain::{Call, CustodyKind, DomainEvent, RouterError};

impl TokenRouter<VaultCustody> {
    /// Pay vault appreciation beyond what users are owed to the owner.
    #[instrument(skip(self), fields(router = ?self.address()))]
    pub fn sweep(&mut self, call: &Call) -> Result<Sweep, RouterError> {
        let ledger = self.ledger().clone();
        let result = ledger.transact(self, |router| {
            router.only_owner(call)?;
            let address = router.address();
            let swept = router.custody_mut().sweep(address, call.sender)?;
            if swept.shares.is_zero() {
                return Ok(swept);
            }
            router.emit(DomainEvent::ExcessSharesSwept {
                shares: swept.shares,
                assets: swept.assets,
            });
            metric_inc!(VAULT_SWEEPS, &[CustodyKind::Vault.as_str()]);
            info!(
                router = ?address,
                shares = %swept.shares,
                assets = %swept.assets,
                asset_deposited = %router.custody().asset_deposited(),
                "Swept excess vault shares"
            );
            Ok(swept)
        });
        observe("sweep", result)
    }
}

impl<C: Custody> TokenRouter<LpCustody<C>> {
    /// Deposit `assets` from the caller, minting pool shares to `receiver`.
    #[instrument(skip(self), fields(router = ?self.address()))]
    pub fn deposit(&mut self, call: &Call, assets: U256, receiver: Address) -> Result<U256, RouterError> {
        let ledger = self.ledger().clone();
        let result = ledger.transact(self, |router| {
            router.receive_value(call)?;
            let address = router.address();
            let (shares, remaining) =
                router
                    .custody_mut()
                    .deposit(address, call.sender, assets, receiver, call.value)?;
            router.refund(call.sender, remaining)?;
            router.emit(DomainEvent::Deposit {
                sender: call.sender,
                owner: receiver,
                assets,
                shares,
            });
            Ok(shares)
        });
        observe("deposit", result)
    }

    /// Withdraw exactly `assets` to `receiver`, burning shares of `owner`.
    #[instrument(skip(self), fields(router = ?self.address()))]
    pub fn withdraw(
        &mut self,
        call: &Call,
        assets: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError> {
        let ledger = self.ledger().clone();
        let result = ledger.transact(self, |router| {
            let address = router.address();
            let shares = router
                .custody_mut()
                .withdraw(address, call.sender, assets, receiver, owner)?;
            router.emit(DomainEvent::Withdraw {
                sender: call.sender,
                receiver,
                owner,
                assets,
                shares,
            });
            Ok(shares)
        });
        observe("withdraw", result)
    }

    /// Burn exactly `shares` of `owner`, paying their value to `receiver`.
    #[instrument(skip(self), fields(router = ?self.address()))]
    pub fn redeem(
        &mut self,
        call: &Call,
        shares: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError> {
        let ledger = self.ledger().clone();
        let result = ledger.transact(self, |router| {
            let address = router.address();
            let assets = router
                .custody_mut()
                .redeem(address, call.sender, shares, receiver, owner)?;
            router.emit(DomainEvent::Withdraw {
                sender: call.sender,
                receiver,
                owner,
                assets,
                shares,
            });
            Ok(assets)
        });
        observe("redeem", result)
    }

    /// Add `amount` to the pool without minting shares.
    #[instrument(skip(self), fields(router = ?self.address()))]
    pub fn donate(&mut self, call: &Call, amount: U256) -> Result<(), RouterError> {
        let ledger = self.ledger().clone();
        let result = ledger.transact(self, |router| {
            router.receive_value(call)?;
            let address = router.address();
            let remaining = router
                .custody_mut()
                .donate(address, call.sender, amount, call.value)?;
            router.refund(call.sender, remaining)?;
            router.emit(DomainEvent::Donation {
                sender: call.sender,
                amount,
            });
            info!(router = ?address, %amount, "Donation received");
            Ok(())
        });
        observe("donate", result)
    }
}
