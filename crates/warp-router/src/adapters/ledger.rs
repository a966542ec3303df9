//! # Domain Ledger
//!
//! In-memory state of one domain: native balances, token books, vault share
//! books, mailbox queues, bridge transfers and the event log.
//!
//! Every contract adapter on a domain is a view over the same `DomainLedger`.
//! Router operations run inside [`DomainLedger::transact`], which snapshots the
//! whole ledger and restores it if the operation fails, so a failed call leaves
//! no trace.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use primitive_types::U256;
use shared_types::{Address, DispatchedMessage, DomainId, MessageId};
use tracing::debug;

use super::token::LedgerToken;
use crate::domain::{Asset, BridgeTransfer, DomainEvent, LedgerError, LoggedEvent};

// =============================================================================
// TOKEN BOOK
// =============================================================================

/// Balances, allowances and supply of one fungible asset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenBook {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl TokenBook {
    /// Balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Amount `spender` may move on behalf of `owner`.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Create `amount` out of thin air for `to`.
    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    /// Destroy `amount` held by `from`.
    pub fn burn(&mut self, from: Address, amount: U256) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Set the allowance of `spender` over `owner`'s balance.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    ///
    /// An allowance of `U256::MAX` is never decreased.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(&from, &spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender,
                required: amount,
                available: allowance,
            });
        }
        self.transfer(from, to, amount)?;
        if allowance != U256::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(&account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account,
                required: amount,
                available,
            });
        }
        self.balances.insert(account, available - amount);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(&account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(account, balance);
        Ok(())
    }
}

// =============================================================================
// LEDGER STATE
// =============================================================================

/// Share book of a deployed vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct VaultBook {
    pub(crate) asset: Address,
    pub(crate) shares: TokenBook,
    /// Cap on shares any one holder may redeem.
    pub(crate) redeem_limit: Option<U256>,
}

/// Queue and replay-protection set of a mailbox.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MailboxBook {
    pub(crate) nonce: u32,
    pub(crate) outbox: Vec<DispatchedMessage>,
    pub(crate) delivered: HashSet<MessageId>,
}

/// Complete state of a domain. Cloning it is a checkpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub(crate) native: TokenBook,
    pub(crate) tokens: HashMap<Address, TokenBook>,
    pub(crate) vaults: HashMap<Address, VaultBook>,
    pub(crate) mailboxes: HashMap<Address, MailboxBook>,
    pub(crate) bridge_transfers: Vec<BridgeTransfer>,
    pub(crate) events: Vec<LoggedEvent>,
}

impl LedgerState {
    pub(crate) fn book(&self, asset: Asset) -> Option<&TokenBook> {
        match asset {
            Asset::Native => Some(&self.native),
            Asset::Token(address) => self.tokens.get(&address),
        }
    }

    pub(crate) fn book_mut(&mut self, asset: Asset) -> Result<&mut TokenBook, LedgerError> {
        match asset {
            Asset::Native => Ok(&mut self.native),
            Asset::Token(address) => self
                .tokens
                .get_mut(&address)
                .ok_or(LedgerError::UnknownToken(address)),
        }
    }
}

// =============================================================================
// DOMAIN LEDGER
// =============================================================================

/// Shared handle to the state of one domain.
#[derive(Clone, Debug)]
pub struct DomainLedger {
    domain: DomainId,
    state: Arc<RwLock<LedgerState>>,
}

impl DomainLedger {
    /// Empty ledger for `domain`.
    #[must_use]
    pub fn new(domain: DomainId) -> Self {
        Self {
            domain,
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// Domain this ledger belongs to.
    #[must_use]
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Native currency of the domain.
    #[must_use]
    pub fn native(&self) -> LedgerToken {
        LedgerToken::new(self.clone(), Asset::Native)
    }

    /// Deploy a token at `address`. Deploying twice keeps the existing book.
    pub fn deploy_token(&self, address: Address) -> LedgerToken {
        self.write(|state| {
            state.tokens.entry(address).or_insert_with(|| {
                debug!(domain = self.domain, token = ?address, "Token deployed");
                TokenBook::default()
            });
        });
        self.token(address)
    }

    /// View of the token at `address`; operations fail if it was never deployed.
    #[must_use]
    pub fn token(&self, address: Address) -> LedgerToken {
        LedgerToken::new(self.clone(), Asset::Token(address))
    }

    /// View of any asset.
    #[must_use]
    pub fn asset(&self, asset: Asset) -> LedgerToken {
        LedgerToken::new(self.clone(), asset)
    }

    /// Copy of the current state.
    #[must_use]
    pub fn checkpoint(&self) -> LedgerState {
        self.state.read().clone()
    }

    /// Replace the current state with `checkpoint`.
    pub fn restore(&self, checkpoint: LedgerState) {
        *self.state.write() = checkpoint;
    }

    /// Run `f` against `subject`; on error, roll back both `subject` and the
    /// ledger to their state before the call.
    pub fn transact<S, T, E>(
        &self,
        subject: &mut S,
        f: impl FnOnce(&mut S) -> Result<T, E>,
    ) -> Result<T, E>
    where
        S: Clone,
    {
        let saved = subject.clone();
        let checkpoint = self.checkpoint();
        match f(subject) {
            Ok(value) => Ok(value),
            Err(e) => {
                *subject = saved;
                self.restore(checkpoint);
                debug!(domain = self.domain, "Ledger reverted");
                Err(e)
            }
        }
    }

    /// Append an event to the log.
    pub fn emit(&self, emitter: Address, event: DomainEvent) {
        self.write(|state| state.events.push(LoggedEvent { emitter, event }));
    }

    /// Full event log.
    #[must_use]
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.read(|state| state.events.clone())
    }

    /// Events emitted by `emitter`, oldest first.
    #[must_use]
    pub fn events_of(&self, emitter: Address) -> Vec<DomainEvent> {
        self.read(|state| {
            state
                .events
                .iter()
                .filter(|logged| logged.emitter == emitter)
                .map(|logged| logged.event.clone())
                .collect()
        })
    }

    /// Transfers accepted by bridges on this domain.
    #[must_use]
    pub fn bridge_transfers(&self) -> Vec<BridgeTransfer> {
        self.read(|state| state.bridge_transfers.clone())
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut LedgerState) -> R) -> R {
        f(&mut self.state.write())
    }
}
