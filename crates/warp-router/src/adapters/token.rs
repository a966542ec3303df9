//! Fungible token view over a [`DomainLedger`].

use primitive_types::U256;
use shared_types::Address;

use super::ledger::DomainLedger;
use crate::domain::{Asset, LedgerError};

/// Handle to one asset on one domain. Cheap to clone.
#[derive(Clone, Debug)]
pub struct LedgerToken {
    ledger: DomainLedger,
    asset: Asset,
}

impl LedgerToken {
    pub(crate) fn new(ledger: DomainLedger, asset: Asset) -> Self {
        Self { ledger, asset }
    }

    /// Asset this handle points at.
    #[must_use]
    pub fn asset(&self) -> Asset {
        self.asset
    }

    /// Ledger the asset lives on.
    #[must_use]
    pub fn ledger(&self) -> &DomainLedger {
        &self.ledger
    }

    /// Balance of `account`; zero for undeployed tokens.
    #[must_use]
    pub fn balance_of(&self, account: Address) -> U256 {
        self.ledger.read(|state| {
            state
                .book(self.asset)
                .map(|book| book.balance_of(&account))
                .unwrap_or_default()
        })
    }

    /// Total supply; zero for undeployed tokens.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.ledger.read(|state| {
            state
                .book(self.asset)
                .map(|book| book.total_supply())
                .unwrap_or_default()
        })
    }

    /// Allowance of `spender` over `owner`.
    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.read(|state| {
            state
                .book(self.asset)
                .map(|book| book.allowance(&owner, &spender))
                .unwrap_or_default()
        })
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        self.ledger
            .write(|state| state.book_mut(self.asset)?.transfer(from, to, amount))
    }

    /// Move `amount` from `from` to `to` against `spender`'s allowance.
    pub fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.ledger.write(|state| {
            state
                .book_mut(self.asset)?
                .transfer_from(spender, from, to, amount)
        })
    }

    /// Set `spender`'s allowance over `owner`.
    pub fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<(), LedgerError> {
        self.ledger.write(|state| {
            state.book_mut(self.asset)?.approve(owner, spender, amount);
            Ok(())
        })
    }

    /// Create `amount` for `to`.
    pub fn mint(&self, to: Address, amount: U256) -> Result<(), LedgerError> {
        self.ledger
            .write(|state| state.book_mut(self.asset)?.mint(to, amount))
    }

    /// Destroy `amount` held by `from`.
    pub fn burn(&self, from: Address, amount: U256) -> Result<(), LedgerError> {
        self.ledger
            .write(|state| state.book_mut(self.asset)?.burn(from, amount))
    }
}
