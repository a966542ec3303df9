//! # Movable Collateral Router
//!
//! A token router whose idle collateral can be moved to the same route's
//! router on another domain through an allow-listed bridge.
//!
//! ## Rebalance checks, in order
//!
//! 1. The caller is a rebalancer.
//! 2. The bridge is allowed for the destination.
//! 3. A recipient resolves: the explicit one for the domain, else the enrolled router.
//! 4. Reserves cover the amount, then the bridge's quoted fees.
//!
//! Only then is the bridge approved (if its allowance is short) and called.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use primitive_types::U256;
use shared_types::{Address, DomainId, H256};
use tracing::{info, instrument};
use warp_telemetry::{metric_inc, REBALANCES};

use super::observe;
use super::token_router::TokenRouter;
use crate::custody::MovableCustody;
use crate::domain::{Asset, Call, DomainEvent, LedgerError, RouterError, Shortfall};
use crate::ports::{InterchainSecurityModule, MessageRecipient, ValueTransferBridge};

/// What a bridge quote asks of the router.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct BridgeCost {
    native: U256,
    token: U256,
}

impl BridgeCost {
    fn from_quotes(
        bridge: &dyn ValueTransferBridge,
        domain: DomainId,
        recipient: H256,
        amount: U256,
        asset: Asset,
    ) -> Result<Self, RouterError> {
        let mut cost = Self::default();
        for quote in bridge.quote_transfer_remote(domain, recipient, amount) {
            if quote.asset == Asset::Native {
                cost.native = cost
                    .native
                    .checked_add(quote.amount)
                    .ok_or(LedgerError::Overflow)?;
            } else if quote.asset == asset {
                cost.token = cost
                    .token
                    .checked_add(quote.amount)
                    .ok_or(LedgerError::Overflow)?;
            }
        }
        Ok(cost)
    }
}

fn shortfall(shortfall: Shortfall, required: U256, available: U256) -> RouterError {
    RouterError::InsufficientRebalanceBalance {
        shortfall,
        required,
        available,
    }
}

/// Token router with rebalancing.
#[derive(Clone, Debug)]
pub struct MovableCollateralRouter<C> {
    router: TokenRouter<C>,
    rebalancers: BTreeSet<Address>,
    bridges: BTreeMap<DomainId, Vec<Arc<dyn ValueTransferBridge>>>,
    recipients: BTreeMap<DomainId, H256>,
}

impl<C: MovableCustody> MovableCollateralRouter<C> {
    /// Add rebalancing to `router`.
    #[must_use]
    pub fn new(router: TokenRouter<C>) -> Self {
        Self {
            router,
            rebalancers: BTreeSet::new(),
            bridges: BTreeMap::new(),
            recipients: BTreeMap::new(),
        }
    }

    /// Allow-listed rebalancers.
    #[must_use]
    pub fn rebalancers(&self) -> Vec<Address> {
        self.rebalancers.iter().copied().collect()
    }

    /// Bridges allowed for `domain`.
    #[must_use]
    pub fn allowed_bridges(&self, domain: DomainId) -> Vec<Address> {
        self.bridges
            .get(&domain)
            .map(|list| list.iter().map(|b| b.address()).collect())
            .unwrap_or_default()
    }

    /// Recipient a rebalance to `domain` pays: the explicit one, else the
    /// enrolled router.
    #[must_use]
    pub fn recipient(&self, domain: DomainId) -> Option<H256> {
        self.recipients
            .get(&domain)
            .copied()
            .or_else(|| self.router.router(domain))
    }

    /// Allow `rebalancer` to move collateral.
    pub fn add_rebalancer(&mut self, call: &Call, rebalancer: Address) -> Result<(), RouterError> {
        self.router.only_owner(call)?;
        if self.rebalancers.insert(rebalancer) {
            info!(router = ?self.router.address(), rebalancer = ?rebalancer, "Rebalancer added");
        }
        Ok(())
    }

    /// Revoke `rebalancer`.
    pub fn remove_rebalancer(&mut self, call: &Call, rebalancer: Address) -> Result<(), RouterError> {
        self.router.only_owner(call)?;
        if self.rebalancers.remove(&rebalancer) {
            info!(router = ?self.router.address(), rebalancer = ?rebalancer, "Rebalancer removed");
        }
        Ok(())
    }

    /// Allow `bridge` for rebalances to `domain`. Adding it twice is a no-op.
    pub fn add_bridge(
        &mut self,
        call: &Call,
        domain: DomainId,
        bridge: Arc<dyn ValueTransferBridge>,
    ) -> Result<(), RouterError> {
        self.router.only_owner(call)?;
        let list = self.bridges.entry(domain).or_default();
        if list.iter().all(|b| b.address() != bridge.address()) {
            info!(router = ?self.router.address(), domain, bridge = ?bridge.address(), "Bridge added");
            list.push(bridge);
        }
        Ok(())
    }

    /// Disallow `bridge` for `domain`.
    pub fn remove_bridge(&mut self, call: &Call, domain: DomainId, bridge: Address) -> Result<(), RouterError> {
        self.router.only_owner(call)?;
        if let Some(list) = self.bridges.get_mut(&domain) {
            list.retain(|b| b.address() != bridge);
            if list.is_empty() {
                self.bridges.remove(&domain);
            }
        }
        Ok(())
    }

    /// Set the rebalance recipient for `domain`; `None` falls back to the
    /// enrolled router.
    pub fn set_recipient(&mut self, call: &Call, domain: DomainId, recipient: Option<H256>) -> Result<(), RouterError> {
        self.router.only_owner(call)?;
        match recipient {
            Some(r) if r.is_zero() => return Err(RouterError::ZeroAddress),
            Some(r) => {
                self.recipients.insert(domain, r);
            }
            None => {
                self.recipients.remove(&domain);
            }
        }
        Ok(())
    }

    /// Give `bridge` unlimited allowance over the router's `token`.
    pub fn approve_token_for_bridge(&mut self, call: &Call, token: Address, bridge: Address) -> Result<(), RouterError> {
        self.router.only_owner(call)?;
        let address = self.router.address();
        self.router
            .ledger()
            .token(token)
            .approve(address, bridge, U256::MAX)?;
        info!(router = ?address, token = ?token, bridge = ?bridge, "Bridge approved");
        Ok(())
    }

    /// Move `amount` of collateral to `domain` through `bridge`, returning the
    /// bridge's transfer id.
    #[instrument(skip(self), fields(router = ?self.router.address()))]
    pub fn rebalance(
        &mut self,
        call: &Call,
        domain: DomainId,
        amount: U256,
        bridge: Address,
    ) -> Result<H256, RouterError> {
        let ledger = self.router.ledger().clone();
        let result = ledger.transact(self, |movable| movable.move_collateral(call, domain, amount, bridge));
        observe("rebalance", result)
    }

    fn move_collateral(
        &mut self,
        call: &Call,
        domain: DomainId,
        amount: U256,
        bridge_address: Address,
    ) -> Result<H256, RouterError> {
        if !self.rebalancers.contains(&call.sender) {
            return Err(RouterError::OnlyRebalancer {
                caller: call.sender,
            });
        }
        let bridge = self
            .bridges
            .get(&domain)
            .and_then(|list| list.iter().find(|b| b.address() == bridge_address))
            .cloned()
            .ok_or(RouterError::BadBridge {
                domain,
                bridge: bridge_address,
            })?;
        let recipient = self
            .recipient(domain)
            .ok_or(RouterError::RecipientNotSet(domain))?;

        let router = self.router.address();
        let asset = self.router.token().asset();
        let cost = BridgeCost::from_quotes(bridge.as_ref(), domain, recipient, amount, asset)?;
        let reserves = self.router.reserves();
        if reserves < amount {
            return Err(shortfall(Shortfall::Amount, amount, reserves));
        }

        let refund = if asset == Asset::Native {
            // reserves and attached value both pay the bridge
            let available = reserves
                .checked_add(call.value)
                .ok_or(LedgerError::Overflow)?;
            if available < cost.native {
                return Err(shortfall(Shortfall::Fee, cost.native, available));
            }
            call.value.saturating_sub(cost.native.saturating_sub(amount))
        } else {
            if reserves < cost.token {
                return Err(shortfall(Shortfall::Fee, cost.token, reserves));
            }
            if call.value < cost.native {
                return Err(shortfall(Shortfall::Fee, cost.native, call.value));
            }
            call.value - cost.native
        };

        self.router.receive_value(call)?;
        self.router.refund(call.sender, refund)?;
        if asset != Asset::Native {
            self.router
                .custody_mut()
                .fund_bridge(router, bridge.address(), cost.token)?;
        }
        let transfer_id = bridge.transfer_remote(router, cost.native, domain, recipient, amount)?;

        self.router.emit(DomainEvent::CollateralMoved {
            domain,
            recipient,
            amount,
            rebalancer: call.sender,
        });
        metric_inc!(REBALANCES, &[self.router.custody().kind().as_str()]);
        info!(
            router = ?router,
            domain,
            recipient = ?recipient,
            %amount,
            native_fee = %cost.native,
            transfer_id = ?transfer_id,
            "Collateral moved"
        );
        Ok(transfer_id)
    }
}

impl<C> Deref for MovableCollateralRouter<C> {
    type Target = TokenRouter<C>;

    fn deref(&self) -> &Self::Target {
        &self.router
    }
}

impl<C> DerefMut for MovableCollateralRouter<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.router
    }
}

impl<C: MovableCustody> MessageRecipient for MovableCollateralRouter<C> {
    fn address(&self) -> Address {
        self.router.address()
    }

    fn interchain_security_module(&self) -> Option<Arc<dyn InterchainSecurityModule>> {
        self.router.interchain_security_module()
    }

    fn handle(&mut self, call: &Call, origin: DomainId, sender: H256, body: &[u8]) -> Result<(), RouterError> {
        self.router.handle(call, origin, sender, body)
    }
}
