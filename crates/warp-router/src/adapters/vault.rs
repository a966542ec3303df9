//! # Ledger Vault
//!
//! ERC-4626 style vault over a ledger token. Shares are tracked in a vault
//! book on the ledger; assets are the vault's own balance of the underlying
//! token, so anything sent to the vault address raises the share price.

use primitive_types::U256;
use shared_types::Address;
use tracing::debug;

use super::ledger::{DomainLedger, TokenBook, VaultBook};
use super::token::LedgerToken;
use crate::algorithms::{convert_to_assets, convert_to_shares, Rounding};
use crate::domain::{LedgerError, RouterError};
use crate::ports::Erc4626Vault;

/// Vault deployed on a [`DomainLedger`].
#[derive(Clone, Debug)]
pub struct LedgerVault {
    ledger: DomainLedger,
    address: Address,
    asset: Address,
}

impl LedgerVault {
    /// Deploy a vault at `address` over the token at `asset`.
    pub fn deploy(ledger: &DomainLedger, address: Address, asset: Address) -> Self {
        ledger.write(|state| {
            state.vaults.entry(address).or_insert_with(|| VaultBook {
                asset,
                shares: TokenBook::default(),
                redeem_limit: None,
            });
        });
        debug!(domain = ledger.domain(), vault = ?address, "Vault deployed");
        Self {
            ledger: ledger.clone(),
            address,
            asset,
        }
    }

    /// Underlying token.
    #[must_use]
    pub fn asset_token(&self) -> LedgerToken {
        self.ledger.token(self.asset)
    }

    /// Grow the vault's assets without minting shares.
    pub fn accrue_yield(&self, assets: U256) -> Result<(), RouterError> {
        Ok(self.asset_token().mint(self.address, assets)?)
    }

    /// Shrink the vault's assets without burning shares.
    pub fn realize_loss(&self, assets: U256) -> Result<(), RouterError> {
        Ok(self.asset_token().burn(self.address, assets)?)
    }

    /// Cap the shares a holder may redeem at once; `None` lifts the cap.
    pub fn limit_redemptions(&self, limit: Option<U256>) -> Result<(), RouterError> {
        Ok(self.ledger.write(|state| {
            let book = state
                .vaults
                .get_mut(&self.address)
                .ok_or(LedgerError::UnknownVault(self.address))?;
            book.redeem_limit = limit;
            Ok::<_, LedgerError>(())
        })?)
    }

    fn redeem_limit(&self) -> Option<U256> {
        self.ledger
            .read(|state| state.vaults.get(&self.address).and_then(|book| book.redeem_limit))
    }

    fn with_shares<R>(&self, f: impl FnOnce(&TokenBook) -> R) -> R {
        self.ledger.read(|state| match state.vaults.get(&self.address) {
            Some(book) => f(&book.shares),
            None => f(&TokenBook::default()),
        })
    }

    fn with_shares_mut(
        &self,
        f: impl FnOnce(&mut TokenBook) -> Result<(), LedgerError>,
    ) -> Result<(), LedgerError> {
        self.ledger.write(|state| {
            let book = state
                .vaults
                .get_mut(&self.address)
                .ok_or(LedgerError::UnknownVault(self.address))?;
            f(&mut book.shares)
        })
    }

    fn burn_shares(&self, owner: Address, shares: U256) -> Result<(), RouterError> {
        let available = self.balance_of(owner);
        if available < shares {
            return Err(RouterError::InsufficientShares {
                owner,
                required: shares,
                available,
            });
        }
        Ok(self.with_shares_mut(|book| book.burn(owner, shares))?)
    }

    fn require_owner(caller: Address, owner: Address) -> Result<(), RouterError> {
        if caller != owner {
            return Err(RouterError::NotOwner { caller });
        }
        Ok(())
    }
}

impl Erc4626Vault for LedgerVault {
    fn address(&self) -> Address {
        self.address
    }

    fn asset(&self) -> Address {
        self.asset
    }

    fn total_assets(&self) -> U256 {
        self.asset_token().balance_of(self.address)
    }

    fn total_supply(&self) -> U256 {
        self.with_shares(TokenBook::total_supply)
    }

    fn balance_of(&self, owner: Address) -> U256 {
        self.with_shares(|book| book.balance_of(&owner))
    }

    fn convert_to_shares(&self, assets: U256) -> Result<U256, RouterError> {
        convert_to_shares(assets, self.total_assets(), self.total_supply(), Rounding::Down)
            .ok_or(RouterError::ShareConversion)
    }

    fn convert_to_assets(&self, shares: U256) -> Result<U256, RouterError> {
        convert_to_assets(shares, self.total_assets(), self.total_supply(), Rounding::Down)
            .ok_or(RouterError::ShareConversion)
    }

    fn preview_withdraw(&self, assets: U256) -> Result<U256, RouterError> {
        convert_to_shares(assets, self.total_assets(), self.total_supply(), Rounding::Up)
            .ok_or(RouterError::ShareConversion)
    }

    fn max_withdraw(&self, owner: Address) -> U256 {
        self.convert_to_assets(self.balance_of(owner))
            .unwrap_or_default()
    }

    fn max_redeem(&self, owner: Address) -> U256 {
        let shares = self.balance_of(owner);
        self.redeem_limit().map_or(shares, |limit| shares.min(limit))
    }

    fn deposit(&self, caller: Address, assets: U256, receiver: Address) -> Result<U256, RouterError> {
        let shares = self.convert_to_shares(assets)?;
        if shares.is_zero() && !assets.is_zero() {
            return Err(RouterError::ZeroShares(assets));
        }
        self.asset_token().transfer(caller, self.address, assets)?;
        self.with_shares_mut(|book| book.mint(receiver, shares))?;
        debug!(vault = ?self.address, %assets, %shares, "Vault deposit");
        Ok(shares)
    }

    fn withdraw(
        &self,
        caller: Address,
        assets: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError> {
        Self::require_owner(caller, owner)?;
        let shares = self.preview_withdraw(assets)?;
        self.burn_shares(owner, shares)?;
        self.asset_token().transfer(self.address, receiver, assets)?;
        debug!(vault = ?self.address, %assets, %shares, "Vault withdraw");
        Ok(shares)
    }

    fn redeem(
        &self,
        caller: Address,
        shares: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError> {
        Self::require_owner(caller, owner)?;
        let redeemable = self.max_redeem(owner);
        if shares > redeemable {
            return Err(RouterError::InsufficientShares {
                owner,
                required: shares,
                available: redeemable,
            });
        }
        let assets = self.convert_to_assets(shares)?;
        self.burn_shares(owner, shares)?;
        self.asset_token().transfer(self.address, receiver, assets)?;
        debug!(vault = ?self.address, %assets, %shares, "Vault redeem");
        Ok(assets)
    }
}
