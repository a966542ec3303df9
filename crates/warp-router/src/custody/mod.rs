//! # Custody
//!
//! How a router backs what it sends and receives. A router is generic over one
//! [`Custody`] chosen at construction; its message handling never looks past
//! the two operations every variant provides:
//!
//! - `lock`: take `amount` from the sender before a transfer is dispatched.
//! - `release`: hand `amount` to a recipient when a transfer arrives.
//!
//! | Variant | lock | release |
//! |---------|------|---------|
//! | [`NativeCustody`] | keep attached value | send native balance |
//! | [`CollateralCustody`] | pull token through allowance | send token balance |
//! | [`SyntheticCustody`] | burn | mint |
//! | [`VaultCustody`] | pull token, deposit into vault | withdraw exact assets |
//! | [`LpCustody`] | as the wrapped variant | as the wrapped variant |
//!
//! Native value attached to a call has already been moved into the router's
//! balance when `lock` runs. `lock` returns how much of it is left for the
//! dispatch fee.

pub mod collateral;
pub mod lp;
pub mod native;
pub mod synthetic;
pub mod vault;

use std::fmt;

use primitive_types::U256;
use shared_types::Address;

use crate::adapters::LedgerToken;
use crate::domain::{CustodyKind, RouterError};

pub use collateral::CollateralCustody;
pub use lp::LpCustody;
pub use native::NativeCustody;
pub use synthetic::SyntheticCustody;
pub use vault::VaultCustody;

/// Backing of a router's transfers.
pub trait Custody: Clone + Send + Sync + fmt::Debug {
    /// Metric and config label.
    fn kind(&self) -> CustodyKind;

    /// Token users hold on this domain.
    fn token(&self) -> LedgerToken;

    /// Amount `router` can release right now.
    fn reserves(&self, router: Address) -> U256;

    /// Take `amount` from `from` into custody of `router`.
    ///
    /// `attached` is the native value the caller sent along; the return value
    /// is what remains of it.
    fn lock(
        &mut self,
        router: Address,
        from: Address,
        amount: U256,
        attached: U256,
    ) -> Result<U256, RouterError>;

    /// Hand `amount` out of custody of `router` to `to`.
    fn release(&mut self, router: Address, to: Address, amount: U256) -> Result<(), RouterError>;

    /// User-facing balance of `holder`.
    fn holder_balance(&self, holder: Address) -> U256 {
        self.token().balance_of(holder)
    }

    /// Move user-facing tokens between holders without touching custody.
    fn holder_transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), RouterError> {
        Ok(self.token().transfer(from, to, amount)?)
    }
}

/// Custody whose reserves a rebalancer may move to another domain.
pub trait MovableCustody: Custody {
    /// Let `bridge` pull `amount` of the custody token from `router`.
    ///
    /// Only raises the allowance when the current one is short, so repeated
    /// rebalances through an already approved bridge leave it untouched.
    fn fund_bridge(&mut self, router: Address, bridge: Address, amount: U256) -> Result<(), RouterError>;
}
