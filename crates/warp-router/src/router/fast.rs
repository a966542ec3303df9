//! # Fast Token Router
//!
//! Lets a filler pay a transfer's recipient before the slow message arrives.
//!
//! The origin router tags a fast transfer's metadata with
//! `FAST_INTENT_TAG ‖ nonce`. Senders cannot write that tag themselves, and
//! any other metadata is carried as an opaque memo on a plain transfer.
//!
//! On the destination, an intent is keyed by
//! `keccak256(origin ‖ nonce ‖ recipient ‖ amount)` and moves through
//!
//! ```text
//! (unseen) ──fill──▶ Filled ──message──▶ Settled   (filler repaid the full amount)
//! (unseen) ──message──────────────────▶ Settled   (recipient paid directly)
//! ```
//!
//! A filler pays `amount - fast_fee` out of their own balance and is repaid
//! `amount` when the message lands, so the fee is the filler's reward. A fill
//! after settlement fails, as does a second fill. A message whose intent is
//! already settled still carries its own value and pays the recipient.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use primitive_types::U256;
use shared_types::{keccak256, u256_to_be_bytes, Address, DomainId, MessageId, TransferMessage, H256};
use tracing::{debug, info, instrument};
use warp_telemetry::{metric_inc, FAST_FILLS};

use super::observe;
use super::token_router::TokenRouter;
use crate::custody::Custody;
use crate::domain::{
    invariant_fast_fee_below_amount, Call, DomainEvent, FillRecord, FillState, LedgerError,
    RouterError, TransferRequest,
};
use crate::ports::{InterchainSecurityModule, MessageRecipient};

/// First byte of fast-intent metadata.
pub const FAST_INTENT_TAG: u8 = 0xfa;

/// Byte length of fast-intent metadata: tag and 32-byte nonce.
pub const FAST_METADATA_LEN: usize = 33;

/// Token router with fast fills.
#[derive(Clone, Debug)]
pub struct FastTokenRouter<C> {
    router: TokenRouter<C>,
    fast_fee: U256,
    next_nonce: U256,
    intents: HashMap<H256, FillRecord>,
}

impl<C: Custody> FastTokenRouter<C> {
    /// Add fast fills to `router`, charging `fast_fee` per fill.
    #[must_use]
    pub fn new(router: TokenRouter<C>, fast_fee: U256) -> Self {
        Self {
            router,
            fast_fee,
            next_nonce: U256::zero(),
            intents: HashMap::new(),
        }
    }

    /// Key of the intent for `amount` to `recipient` from `origin` with `nonce`.
    #[must_use]
    pub fn fill_key(origin: DomainId, nonce: U256, recipient: H256, amount: U256) -> H256 {
        let mut preimage = Vec::with_capacity(4 + 32 * 3);
        preimage.extend_from_slice(&origin.to_be_bytes());
        preimage.extend_from_slice(&u256_to_be_bytes(nonce));
        preimage.extend_from_slice(recipient.as_bytes());
        preimage.extend_from_slice(&u256_to_be_bytes(amount));
        keccak256(&preimage)
    }

    /// Fee a filler keeps per fill.
    #[must_use]
    pub fn fast_fee(&self) -> U256 {
        self.fast_fee
    }

    /// Nonce the next fast transfer will carry.
    #[must_use]
    pub fn next_nonce(&self) -> U256 {
        self.next_nonce
    }

    /// State of the intent under `key`.
    #[must_use]
    pub fn fill_record(&self, key: &H256) -> Option<FillRecord> {
        self.intents.get(key).cloned()
    }

    /// Change the fee fillers keep.
    pub fn set_fast_fee(&mut self, call: &Call, fast_fee: U256) -> Result<(), RouterError> {
        self.router.only_owner(call)?;
        info!(router = ?self.router.address(), %fast_fee, "Fast fee updated");
        self.fast_fee = fast_fee;
        Ok(())
    }

    /// Send a transfer that fillers on `destination` may front.
    ///
    /// Returns the message id and the nonce fillers need.
    #[instrument(skip(self), fields(router = ?self.router.address()))]
    pub fn fast_transfer_remote(
        &mut self,
        call: &Call,
        destination: DomainId,
        recipient: H256,
        amount: U256,
    ) -> Result<(MessageId, U256), RouterError> {
        let ledger = self.router.ledger().clone();
        let result = ledger.transact(self, |fast| {
            let nonce = fast.next_nonce;
            fast.next_nonce = nonce.checked_add(U256::one()).ok_or(LedgerError::Overflow)?;
            let request = TransferRequest::new(destination, recipient, amount)
                .with_metadata(intent_metadata(nonce));
            let id = fast.router.dispatch_transfer(call, &request, None)?;
            Ok((id, nonce))
        });
        observe("fast_transfer_remote", result)
    }

    /// Pay `amount - fast_fee` to `recipient` from the caller's balance, on
    /// the promise of `amount` once the message from `origin` lands.
    ///
    /// `amount` is in this router's decimals. Returns the fill key.
    #[instrument(skip(self), fields(router = ?self.router.address()))]
    pub fn fill_fast_transfer(
        &mut self,
        call: &Call,
        recipient: H256,
        amount: U256,
        origin: DomainId,
        nonce: U256,
    ) -> Result<H256, RouterError> {
        let ledger = self.router.ledger().clone();
        let result = ledger.transact(self, |fast| {
            invariant_fast_fee_below_amount(amount, fast.fast_fee)?;
            let key = Self::fill_key(origin, nonce, recipient, amount);
            match fast.intents.get(&key).map(|record| record.state) {
                Some(FillState::Filled) => return Err(RouterError::AlreadyFilled(key)),
                Some(FillState::Settled) => return Err(RouterError::IntentAlreadySettled(key)),
                None => {}
            }

            let net_amount = amount - fast.fast_fee;
            fast.router
                .custody_mut()
                .holder_transfer(call.sender, recipient, net_amount)?;
            fast.intents.insert(
                key,
                FillRecord {
                    filler: Some(call.sender),
                    recipient,
                    amount,
                    state: FillState::Filled,
                },
            );
            fast.router.emit(DomainEvent::FastTransferFilled {
                key,
                filler: call.sender,
                net_amount,
            });
            metric_inc!(FAST_FILLS, &[fast.router.custody().kind().as_str()]);
            info!(
                key = ?key,
                filler = ?call.sender,
                origin,
                %nonce,
                %net_amount,
                "Fast transfer filled"
            );
            Ok(key)
        });
        observe("fill_fast_transfer", result)
    }

    /// Send the caller's balance (typically fill repayments) back to
    /// `destination` as an ordinary transfer.
    #[instrument(skip(self), fields(router = ?self.router.address()))]
    pub fn transfer_remote_settle(
        &mut self,
        call: &Call,
        destination: DomainId,
        recipient: H256,
        amount: U256,
    ) -> Result<MessageId, RouterError> {
        let ledger = self.router.ledger().clone();
        let result = ledger.transact(self, |fast| {
            if fast.router.balance_of(call.sender).is_zero() {
                return Err(RouterError::NothingToSettle {
                    account: call.sender,
                });
            }
            let request = TransferRequest::new(destination, recipient, amount);
            fast.router.dispatch_transfer(call, &request, None)
        });
        observe("transfer_remote_settle", result)
    }

    /// Decide who an arriving intent pays and mark it settled.
    fn settle_intent(&mut self, origin: DomainId, nonce: U256, recipient: H256, amount: U256) -> Address {
        let key = Self::fill_key(origin, nonce, recipient, amount);
        match self.intents.get_mut(&key) {
            Some(record) => match (record.state, record.filler) {
                (FillState::Filled, Some(filler)) => {
                    record.state = FillState::Settled;
                    info!(key = ?key, filler = ?filler, %amount, "Repaying filler");
                    filler
                }
                _ => {
                    debug!(key = ?key, %amount, "Intent already settled, paying recipient");
                    recipient
                }
            },
            None => {
                self.intents.insert(
                    key,
                    FillRecord {
                        filler: None,
                        recipient,
                        amount,
                        state: FillState::Settled,
                    },
                );
                recipient
            }
        }
    }
}

/// Metadata marking a fast transfer with `nonce`.
#[must_use]
pub fn intent_metadata(nonce: U256) -> Vec<u8> {
    let mut metadata = Vec::with_capacity(FAST_METADATA_LEN);
    metadata.push(FAST_INTENT_TAG);
    metadata.extend_from_slice(&u256_to_be_bytes(nonce));
    metadata
}

pub(crate) fn is_intent_metadata(metadata: &[u8]) -> bool {
    metadata.len() == FAST_METADATA_LEN && metadata[0] == FAST_INTENT_TAG
}

/// Nonce of a fast intent; `None` for a plain transfer.
fn intent_nonce(metadata: &[u8]) -> Option<U256> {
    is_intent_metadata(metadata).then(|| U256::from_big_endian(&metadata[1..]))
}

impl<C> Deref for FastTokenRouter<C> {
    type Target = TokenRouter<C>;

    fn deref(&self) -> &Self::Target {
        &self.router
    }
}

impl<C> DerefMut for FastTokenRouter<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.router
    }
}

impl<C: Custody> MessageRecipient for FastTokenRouter<C> {
    fn address(&self) -> Address {
        self.router.address()
    }

    fn interchain_security_module(&self) -> Option<Arc<dyn InterchainSecurityModule>> {
        self.router.interchain_security_module()
    }

    #[instrument(skip(self, call, body), fields(router = ?self.router.address()))]
    fn handle(&mut self, call: &Call, origin: DomainId, sender: H256, body: &[u8]) -> Result<(), RouterError> {
        let ledger = self.router.ledger().clone();
        let result = ledger.transact(self, |fast| {
            fast.router.authorize_inbound(call, origin, sender)?;
            let (message, amount): (TransferMessage, U256) = fast.router.decode_inbound(body)?;
            let to = match intent_nonce(message.metadata()) {
                None => message.recipient(),
                Some(nonce) => fast.settle_intent(origin, nonce, message.recipient(), amount),
            };
            fast.router.credit(origin, to, amount)
        });
        observe("handle", result)
    }
}
