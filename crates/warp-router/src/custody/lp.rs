//! # LP Custody
//!
//! Liquidity-provider shares on top of another custody variant.
//!
//! Providers deposit the custody token and receive shares. `lp_assets` is the
//! pool the shares claim; it moves only through deposits, withdrawals and
//! donations, never through user transfers. A donation raises `lp_assets`
//! without minting, so every existing share becomes worth more and later
//! deposits receive fewer shares per unit.
//!
//! Withdrawals round shares up; deposits and redemptions round down, so the
//! pool never pays out more than it holds.

use primitive_types::U256;
use shared_types::Address;
use tracing::debug;

use super::{Custody, MovableCustody};
use crate::adapters::{LedgerToken, TokenBook};
use crate::algorithms::{convert_to_assets, convert_to_shares, Rounding};
use crate::domain::{CustodyKind, LedgerError, RouterError};

/// Share pool wrapping `C`.
#[derive(Clone, Debug)]
pub struct LpCustody<C> {
    inner: C,
    lp_assets: U256,
    shares: TokenBook,
}

impl<C: Custody> LpCustody<C> {
    /// Empty pool over `inner`.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            lp_assets: U256::zero(),
            shares: TokenBook::default(),
        }
    }

    /// Wrapped custody.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Assets the shares claim.
    #[must_use]
    pub fn total_assets(&self) -> U256 {
        self.lp_assets
    }

    /// Shares outstanding.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.shares.total_supply()
    }

    /// Shares held by `owner`.
    #[must_use]
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.shares.balance_of(&owner)
    }

    /// Shares `assets` are worth, rounding down.
    pub fn convert_to_shares(&self, assets: U256) -> Result<U256, RouterError> {
        self.to_shares(assets, Rounding::Down)
    }

    /// Assets `shares` are worth, rounding down.
    pub fn convert_to_assets(&self, shares: U256) -> Result<U256, RouterError> {
        self.to_assets(shares, Rounding::Down)
    }

    /// Assets `owner` could withdraw now.
    #[must_use]
    pub fn max_withdraw(&self, owner: Address) -> U256 {
        self.convert_to_assets(self.balance_of(owner))
            .unwrap_or_default()
    }

    /// Lock `assets` from `from` and mint shares to `receiver`.
    ///
    /// Returns the shares minted and the unused attached value.
    pub fn deposit(
        &mut self,
        router: Address,
        from: Address,
        assets: U256,
        receiver: Address,
        attached: U256,
    ) -> Result<(U256, U256), RouterError> {
        let shares = self.convert_to_shares(assets)?;
        if shares.is_zero() {
            return Err(RouterError::ZeroShares(assets));
        }
        let pool = self
            .lp_assets
            .checked_add(assets)
            .ok_or(LedgerError::Overflow)?;
        let remaining = self.inner.lock(router, from, assets, attached)?;
        self.shares.mint(receiver, shares)?;
        self.lp_assets = pool;
        debug!(owner = ?receiver, %assets, %shares, "LP deposit");
        Ok((shares, remaining))
    }

    /// Burn the shares of `owner` worth exactly `assets` and release them to
    /// `receiver`. Returns the shares burned.
    pub fn withdraw(
        &mut self,
        router: Address,
        caller: Address,
        assets: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError> {
        Self::require_owner(caller, owner)?;
        let shares = self.to_shares(assets, Rounding::Up)?;
        self.exit(router, owner, shares, assets, receiver)?;
        Ok(shares)
    }

    /// Burn exactly `shares` of `owner`, releasing their value to `receiver`.
    /// Returns the assets released.
    pub fn redeem(
        &mut self,
        router: Address,
        caller: Address,
        shares: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError> {
        Self::require_owner(caller, owner)?;
        let assets = self.convert_to_assets(shares)?;
        self.exit(router, owner, shares, assets, receiver)?;
        Ok(assets)
    }

    /// Lock `amount` from `from` as a gift to current holders.
    ///
    /// Returns the unused attached value.
    pub fn donate(
        &mut self,
        router: Address,
        from: Address,
        amount: U256,
        attached: U256,
    ) -> Result<U256, RouterError> {
        if self.total_supply().is_zero() {
            return Err(RouterError::DonationWithoutShares);
        }
        let pool = self
            .lp_assets
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let remaining = self.inner.lock(router, from, amount, attached)?;
        self.lp_assets = pool;
        debug!(%amount, lp_assets = %pool, "LP donation");
        Ok(remaining)
    }

    fn exit(
        &mut self,
        router: Address,
        owner: Address,
        shares: U256,
        assets: U256,
        receiver: Address,
    ) -> Result<(), RouterError> {
        let available = self.balance_of(owner);
        if available < shares {
            return Err(RouterError::InsufficientShares {
                owner,
                required: shares,
                available,
            });
        }
        self.shares.burn(owner, shares)?;
        self.lp_assets = self.lp_assets.saturating_sub(assets);
        self.inner.release(router, receiver, assets)?;
        debug!(owner = ?owner, %assets, %shares, "LP withdraw");
        Ok(())
    }

    fn to_shares(&self, assets: U256, rounding: Rounding) -> Result<U256, RouterError> {
        convert_to_shares(assets, self.lp_assets, self.total_supply(), rounding)
            .ok_or(RouterError::ShareConversion)
    }

    fn to_assets(&self, shares: U256, rounding: Rounding) -> Result<U256, RouterError> {
        convert_to_assets(shares, self.lp_assets, self.total_supply(), rounding)
            .ok_or(RouterError::ShareConversion)
    }

    fn require_owner(caller: Address, owner: Address) -> Result<(), RouterError> {
        if caller != owner {
            return Err(RouterError::NotOwner { caller });
        }
        Ok(())
    }
}

impl<C: Custody> Custody for LpCustody<C> {
    fn kind(&self) -> CustodyKind {
        CustodyKind::Lp
    }

    fn token(&self) -> LedgerToken {
        self.inner.token()
    }

    fn reserves(&self, router: Address) -> U256 {
        self.inner.reserves(router)
    }

    fn lock(
        &mut self,
        router: Address,
        from: Address,
        amount: U256,
        attached: U256,
    ) -> Result<U256, RouterError> {
        self.inner.lock(router, from, amount, attached)
    }

    fn release(&mut self, router: Address, to: Address, amount: U256) -> Result<(), RouterError> {
        self.inner.release(router, to, amount)
    }

    fn holder_balance(&self, holder: Address) -> U256 {
        self.inner.holder_balance(holder)
    }

    fn holder_transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), RouterError> {
        self.inner.holder_transfer(from, to, amount)
    }
}

impl<C: MovableCustody> MovableCustody for LpCustody<C> {
    fn fund_bridge(&mut self, router: Address, bridge: Address, amount: U256) -> Result<(), RouterError> {
        self.inner.fund_bridge(router, bridge, amount)
    }
}
