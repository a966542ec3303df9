//! # Token Router
//!
//! One router per domain and token. Routers on different domains trust each
//! other through enrollment: an inbound message is honored only if its sender
//! is the router enrolled for its origin.
//!
//! ## Outbound
//!
//! ```text
//! receive attached value → lock amount + token fee → pay token fee
//!   → scale to remote decimals → encode → dispatch (remaining value pays the hook)
//! ```
//!
//! ## Inbound
//!
//! ```text
//! caller is mailbox → sender is enrolled → decode → scale to local decimals → release
//! ```
//!
//! A release that finds custody short reverts, the mailbox leaves the message
//! pending, and it can be delivered again once custody is topped up.

use std::collections::BTreeMap;
use std::sync::Arc;

use primitive_types::U256;
use shared_types::{Address, DomainId, MessageId, TransferMessage, H256};
use tracing::{info, instrument};
use warp_telemetry::{metric_inc, TRANSFERS_RECEIVED, TRANSFERS_SENT};

use super::fast::is_intent_metadata;
use super::observe;
use crate::adapters::{DomainLedger, LedgerToken};
use crate::algorithms::convert_decimals;
use crate::custody::Custody;
use crate::domain::{
    invariant_trusted_sender, Asset, Call, DomainEvent, GasRouterConfig, LedgerError, Quote,
    RemoteRouterConfig, RouterError, TokenFee, TransferRequest,
};
use crate::ports::{
    DispatchParams, HookMetadata, InterchainSecurityModule, Mailbox, MessageRecipient,
    PostDispatchHook,
};

/// Decimals assumed on both sides unless configured otherwise.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Router over custody `C`.
#[derive(Clone, Debug)]
pub struct TokenRouter<C> {
    address: Address,
    owner: Option<Address>,
    ledger: DomainLedger,
    mailbox: Arc<dyn Mailbox>,
    hook: Option<Arc<dyn PostDispatchHook>>,
    ism: Option<Arc<dyn InterchainSecurityModule>>,
    routers: BTreeMap<DomainId, H256>,
    destination_gas: BTreeMap<DomainId, u64>,
    decimals: u8,
    remote_decimals: u8,
    token_fee: Option<TokenFee>,
    custody: C,
}

impl<C: Custody> TokenRouter<C> {
    /// Router at `address` owned by `owner`, with no remote routers enrolled.
    pub fn new(
        ledger: &DomainLedger,
        address: Address,
        mailbox: Arc<dyn Mailbox>,
        custody: C,
        owner: Address,
    ) -> Self {
        Self {
            address,
            owner: Some(owner),
            ledger: ledger.clone(),
            mailbox,
            hook: None,
            ism: None,
            routers: BTreeMap::new(),
            destination_gas: BTreeMap::new(),
            decimals: DEFAULT_DECIMALS,
            remote_decimals: DEFAULT_DECIMALS,
            token_fee: None,
            custody,
        }
    }

    /// Set local and remote decimals.
    #[must_use]
    pub fn with_decimals(mut self, decimals: u8, remote_decimals: u8) -> Self {
        self.decimals = decimals;
        self.remote_decimals = remote_decimals;
        self
    }

    /// Decimals set from a deployment config, before any transfer.
    pub(crate) fn configure_decimals(&mut self, decimals: u8, remote_decimals: u8) {
        self.decimals = decimals;
        self.remote_decimals = remote_decimals;
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Router contract.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner; `None` once renounced.
    #[must_use]
    pub fn owner(&self) -> Option<Address> {
        self.owner
    }

    /// Domain the router lives on.
    #[must_use]
    pub fn local_domain(&self) -> DomainId {
        self.mailbox.local_domain()
    }

    /// Ledger of the local domain.
    #[must_use]
    pub fn ledger(&self) -> &DomainLedger {
        &self.ledger
    }

    /// Local transport.
    #[must_use]
    pub fn mailbox(&self) -> &Arc<dyn Mailbox> {
        &self.mailbox
    }

    /// Custody backing the router.
    #[must_use]
    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub(crate) fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    /// Token users hold on this domain.
    #[must_use]
    pub fn token(&self) -> LedgerToken {
        self.custody.token()
    }

    /// User-facing balance of `holder`.
    #[must_use]
    pub fn balance_of(&self, holder: Address) -> U256 {
        self.custody.holder_balance(holder)
    }

    /// Amount the router can release right now.
    #[must_use]
    pub fn reserves(&self) -> U256 {
        self.custody.reserves(self.address)
    }

    /// Router enrolled for `domain`.
    #[must_use]
    pub fn router(&self, domain: DomainId) -> Option<H256> {
        self.routers.get(&domain).copied()
    }

    /// Domains with an enrolled router, ascending.
    #[must_use]
    pub fn domains(&self) -> Vec<DomainId> {
        self.routers.keys().copied().collect()
    }

    /// Gas budgeted for handling on `domain`, if configured.
    #[must_use]
    pub fn destination_gas(&self, domain: DomainId) -> Option<u64> {
        self.destination_gas.get(&domain).copied()
    }

    /// Local decimals.
    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Decimals of the wire amount.
    #[must_use]
    pub fn remote_decimals(&self) -> u8 {
        self.remote_decimals
    }

    /// Token fee charged on outbound transfers, if any.
    #[must_use]
    pub fn token_fee(&self) -> Option<TokenFee> {
        self.token_fee
    }

    /// Hook override, if any.
    #[must_use]
    pub fn hook(&self) -> Option<Arc<dyn PostDispatchHook>> {
        self.hook.clone()
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    pub(crate) fn only_owner(&self, call: &Call) -> Result<(), RouterError> {
        if self.owner != Some(call.sender) {
            return Err(RouterError::NotOwner {
                caller: call.sender,
            });
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`; `None` renounces it.
    pub fn transfer_ownership(&mut self, call: &Call, new_owner: Option<Address>) -> Result<(), RouterError> {
        self.only_owner(call)?;
        let previous = self.owner;
        self.owner = new_owner;
        self.emit(DomainEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        info!(router = ?self.address, ?previous, new = ?new_owner, "Ownership transferred");
        Ok(())
    }

    /// Trust `router` as the sender for `domain`, replacing any previous one.
    pub fn enroll_remote_router(&mut self, call: &Call, domain: DomainId, router: H256) -> Result<(), RouterError> {
        self.enroll_remote_routers(
            call,
            vec![RemoteRouterConfig {
                domain,
                router: Some(router),
            }],
        )
    }

    /// Apply a batch of enrollments; a `None` router unenrolls its domain.
    pub fn enroll_remote_routers(
        &mut self,
        call: &Call,
        configs: Vec<RemoteRouterConfig>,
    ) -> Result<(), RouterError> {
        self.only_owner(call)?;
        if configs.iter().any(|c| c.router == Some(H256::zero())) {
            return Err(RouterError::ZeroAddress);
        }
        for config in configs {
            match config.router {
                Some(router) => {
                    self.routers.insert(config.domain, router);
                }
                None => {
                    self.routers.remove(&config.domain);
                }
            }
            self.emit(DomainEvent::RemoteRouterEnrolled {
                domain: config.domain,
                router: config.router,
            });
            info!(
                router = ?self.address,
                domain = config.domain,
                remote = ?config.router,
                "Remote router enrolled"
            );
        }
        Ok(())
    }

    /// Stop trusting any router on `domain`.
    pub fn unenroll_remote_router(&mut self, call: &Call, domain: DomainId) -> Result<(), RouterError> {
        self.enroll_remote_routers(call, vec![RemoteRouterConfig { domain, router: None }])
    }

    /// Set or clear destination gas per domain.
    pub fn set_destination_gas(
        &mut self,
        call: &Call,
        configs: Vec<GasRouterConfig>,
    ) -> Result<(), RouterError> {
        self.only_owner(call)?;
        for config in configs {
            match config.gas {
                Some(gas) => self.destination_gas.insert(config.domain, gas),
                None => self.destination_gas.remove(&config.domain),
            };
        }
        Ok(())
    }

    /// Replace the mailbox default hook for this router's dispatches.
    pub fn set_hook(&mut self, call: &Call, hook: Option<Arc<dyn PostDispatchHook>>) -> Result<(), RouterError> {
        self.only_owner(call)?;
        self.hook = hook;
        Ok(())
    }

    /// Replace the mailbox default security module for inbound messages.
    pub fn set_interchain_security_module(
        &mut self,
        call: &Call,
        ism: Option<Arc<dyn InterchainSecurityModule>>,
    ) -> Result<(), RouterError> {
        self.only_owner(call)?;
        self.ism = ism;
        Ok(())
    }

    /// Charge `fee` on outbound transfers; `None` removes it.
    pub fn set_token_fee(&mut self, call: &Call, fee: Option<TokenFee>) -> Result<(), RouterError> {
        self.only_owner(call)?;
        self.token_fee = fee;
        Ok(())
    }

    // =========================================================================
    // QUOTES
    // =========================================================================

    /// Native value the hook charges to dispatch a transfer to `destination`.
    pub fn quote_gas_payment(&self, destination: DomainId) -> Result<U256, RouterError> {
        let remote = self.remote_router(destination)?;
        let params = DispatchParams {
            destination,
            recipient: remote,
            body: TransferMessage::new(H256::zero(), U256::zero(), Vec::new()).encode(),
            value: U256::zero(),
            metadata: self.hook_metadata(destination, self.address),
            hook: self.hook.clone(),
        };
        self.mailbox.quote_dispatch(self.address, &params)
    }

    /// Everything a sender must provide to transfer `amount`: native value for
    /// the dispatch, and `amount` plus the token fee in the router's token.
    pub fn quote_transfer_remote(
        &self,
        destination: DomainId,
        _recipient: H256,
        amount: U256,
    ) -> Result<Vec<Quote>, RouterError> {
        let gas = self.quote_gas_payment(destination)?;
        let total = amount
            .checked_add(self.fee_for(amount))
            .ok_or(LedgerError::Overflow)?;
        Ok(vec![
            Quote::new(Asset::Native, gas),
            Quote::new(self.token().asset(), total),
        ])
    }

    // =========================================================================
    // OUTBOUND
    // =========================================================================

    /// Send `amount` to `recipient` on `destination`.
    #[instrument(skip(self), fields(router = ?self.address))]
    pub fn transfer_remote(
        &mut self,
        call: &Call,
        destination: DomainId,
        recipient: H256,
        amount: U256,
    ) -> Result<MessageId, RouterError> {
        self.transfer_remote_with_hook(call, TransferRequest::new(destination, recipient, amount), None)
    }

    /// Send a transfer with metadata, optionally through `hook` instead of the
    /// router's configured hook.
    ///
    /// Metadata shaped like a fast intent is refused; only a fast router
    /// writes that tag.
    #[instrument(skip(self, hook), fields(router = ?self.address))]
    pub fn transfer_remote_with_hook(
        &mut self,
        call: &Call,
        request: TransferRequest,
        hook: Option<Arc<dyn PostDispatchHook>>,
    ) -> Result<MessageId, RouterError> {
        let ledger = self.ledger.clone();
        let result = ledger.transact(self, |router| {
            if is_intent_metadata(&request.metadata) {
                return Err(RouterError::ReservedMetadata);
            }
            router.dispatch_transfer(call, &request, hook)
        });
        observe("transfer_remote", result)
    }

    /// Outbound transfer without its own revert scope.
    pub(crate) fn dispatch_transfer(
        &mut self,
        call: &Call,
        request: &TransferRequest,
        hook: Option<Arc<dyn PostDispatchHook>>,
    ) -> Result<MessageId, RouterError> {
        let remote = self.remote_router(request.destination)?;
        self.receive_value(call)?;

        let fee = self.fee_for(request.amount);
        let charge = request
            .amount
            .checked_add(fee)
            .ok_or(LedgerError::Overflow)?;
        let remaining = self
            .custody
            .lock(self.address, call.sender, charge, call.value)?;
        if let Some(token_fee) = self.token_fee {
            if !fee.is_zero() {
                self.custody
                    .release(self.address, token_fee.beneficiary, fee)?;
            }
        }

        let wire_amount = self.to_remote(request.amount)?;
        let body = TransferMessage::new(request.recipient, wire_amount, request.metadata.clone()).encode();
        let id = self.mailbox.dispatch(
            self.address,
            DispatchParams {
                destination: request.destination,
                recipient: remote,
                body,
                value: remaining,
                metadata: self.hook_metadata(request.destination, call.sender),
                hook: hook.or_else(|| self.hook.clone()),
            },
        )?;

        self.emit(DomainEvent::SentTransferRemote {
            destination: request.destination,
            recipient: request.recipient,
            amount: request.amount,
        });
        metric_inc!(TRANSFERS_SENT, &[self.custody.kind().as_str()]);
        info!(
            router = ?self.address,
            destination = request.destination,
            recipient = ?request.recipient,
            amount = %request.amount,
            %fee,
            message_id = ?id,
            "Sent transfer remote"
        );
        Ok(id)
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Reject callers other than the mailbox and senders other than the
    /// enrolled router for `origin`.
    pub(crate) fn authorize_inbound(&self, call: &Call, origin: DomainId, sender: H256) -> Result<(), RouterError> {
        if call.sender != self.mailbox.address() {
            return Err(RouterError::NotMailbox {
                caller: call.sender,
            });
        }
        invariant_trusted_sender(self.routers.get(&origin), origin, sender)
    }

    /// Decode a payload, returning the message and its amount in local decimals.
    pub(crate) fn decode_inbound(&self, body: &[u8]) -> Result<(TransferMessage, U256), RouterError> {
        let message = TransferMessage::decode(body)?;
        let amount = self.to_local(message.amount())?;
        Ok((message, amount))
    }

    /// Release `amount` to `recipient` and record the arrival.
    pub(crate) fn credit(&mut self, origin: DomainId, recipient: H256, amount: U256) -> Result<(), RouterError> {
        self.custody.release(self.address, recipient, amount)?;
        self.emit(DomainEvent::ReceivedTransferRemote {
            origin,
            recipient,
            amount,
        });
        metric_inc!(TRANSFERS_RECEIVED, &[self.custody.kind().as_str()]);
        info!(
            router = ?self.address,
            origin,
            recipient = ?recipient,
            %amount,
            "Received transfer remote"
        );
        Ok(())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Move the call's attached value into the router.
    pub(crate) fn receive_value(&self, call: &Call) -> Result<(), RouterError> {
        if call.value.is_zero() {
            return Ok(());
        }
        Ok(self
            .ledger
            .native()
            .transfer(call.sender, self.address, call.value)?)
    }

    /// Return unused attached value.
    pub(crate) fn refund(&self, to: Address, amount: U256) -> Result<(), RouterError> {
        if amount.is_zero() {
            return Ok(());
        }
        Ok(self.ledger.native().transfer(self.address, to, amount)?)
    }

    pub(crate) fn emit(&self, event: DomainEvent) {
        self.ledger.emit(self.address, event);
    }

    fn remote_router(&self, domain: DomainId) -> Result<H256, RouterError> {
        self.router(domain)
            .ok_or(RouterError::UnenrolledDomain(domain))
    }

    fn fee_for(&self, amount: U256) -> U256 {
        self.token_fee
            .map(|fee| fee.fee(amount))
            .unwrap_or_default()
    }

    fn hook_metadata(&self, destination: DomainId, refund_address: Address) -> HookMetadata {
        HookMetadata {
            gas_limit: self.destination_gas(destination),
            refund_address,
        }
    }

    fn to_remote(&self, amount: U256) -> Result<U256, RouterError> {
        convert_decimals(amount, self.decimals, self.remote_decimals).ok_or(
            RouterError::DecimalConversion {
                amount,
                from: self.decimals,
                to: self.remote_decimals,
            },
        )
    }

    fn to_local(&self, amount: U256) -> Result<U256, RouterError> {
        convert_decimals(amount, self.remote_decimals, self.decimals).ok_or(
            RouterError::DecimalConversion {
                amount,
                from: self.remote_decimals,
                to: self.decimals,
            },
        )
    }
}

impl<C: Custody> MessageRecipient for TokenRouter<C> {
    fn address(&self) -> Address {
        self.address
    }

    fn interchain_security_module(&self) -> Option<Arc<dyn InterchainSecurityModule>> {
        self.ism.clone()
    }

    #[instrument(skip(self, call, body), fields(router = ?self.address))]
    fn handle(&mut self, call: &Call, origin: DomainId, sender: H256, body: &[u8]) -> Result<(), RouterError> {
        let ledger = self.ledger.clone();
        let result = ledger.transact(self, |router| {
            router.authorize_inbound(call, origin, sender)?;
            let (message, amount) = router.decode_inbound(body)?;
            router.credit(origin, message.recipient(), amount)
        });
        observe("handle", result)
    }
}
