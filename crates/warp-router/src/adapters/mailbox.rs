//! # Ledger Mailbox
//!
//! Message transport endpoint of one domain.
//!
//! Outbound, the mailbox assigns a nonce, charges the post-dispatch hook and
//! queues the message in its outbox. Inbound, it checks the destination and the
//! recipient's security module, invokes the recipient with itself as caller,
//! and only then marks the message delivered. A failed delivery therefore
//! leaves the message pending, and a succeeded one can never be replayed.

use std::sync::Arc;

use primitive_types::U256;
use shared_types::{Address, DispatchedMessage, DomainId, MessageId};
use tracing::{debug, info};

use super::ledger::{DomainLedger, MailboxBook};
use crate::domain::{Call, DomainEvent, LedgerError, RouterError};
use crate::ports::{
    DispatchParams, InterchainSecurityModule, Mailbox, MessageRecipient, PostDispatchHook,
};

/// Mailbox deployed on a [`DomainLedger`].
#[derive(Clone, Debug)]
pub struct LedgerMailbox {
    ledger: DomainLedger,
    address: Address,
    default_hook: Arc<dyn PostDispatchHook>,
    default_ism: Arc<dyn InterchainSecurityModule>,
}

impl LedgerMailbox {
    /// Deploy a mailbox at `address`.
    pub fn new(
        ledger: &DomainLedger,
        address: Address,
        default_hook: Arc<dyn PostDispatchHook>,
        default_ism: Arc<dyn InterchainSecurityModule>,
    ) -> Self {
        ledger.write(|state| {
            state.mailboxes.entry(address).or_default();
        });
        Self {
            ledger: ledger.clone(),
            address,
            default_hook,
            default_ism,
        }
    }

    /// Ledger of the served domain.
    #[must_use]
    pub fn ledger(&self) -> &DomainLedger {
        &self.ledger
    }

    /// Hook used when the sender supplies none.
    #[must_use]
    pub fn default_hook(&self) -> Arc<dyn PostDispatchHook> {
        self.default_hook.clone()
    }

    /// Nonce the next dispatch will receive.
    #[must_use]
    pub fn nonce(&self) -> u32 {
        self.with_book(|book| book.nonce)
    }

    /// Every message dispatched so far, in nonce order.
    #[must_use]
    pub fn outbox(&self) -> Vec<DispatchedMessage> {
        self.with_book(|book| book.outbox.clone())
    }

    /// Whether `id` was processed here.
    #[must_use]
    pub fn delivered(&self, id: &MessageId) -> bool {
        self.with_book(|book| book.delivered.contains(id))
    }

    /// Deliver `message` to `recipient`.
    pub fn process(
        &self,
        relayer: Address,
        metadata: &[u8],
        message: &DispatchedMessage,
        recipient: &mut dyn MessageRecipient,
    ) -> Result<MessageId, RouterError> {
        let domain = self.ledger.domain();
        if message.destination != domain {
            return Err(RouterError::WrongDestination {
                expected: domain,
                got: message.destination,
            });
        }
        if message.recipient != recipient.address() {
            return Err(RouterError::WrongRecipient {
                expected: recipient.address(),
                got: message.recipient,
            });
        }
        let id = message.id();
        if self.delivered(&id) {
            return Err(RouterError::AlreadyDelivered(id));
        }
        let ism = recipient
            .interchain_security_module()
            .unwrap_or_else(|| self.default_ism.clone());
        if !ism.verify(relayer, metadata, message) {
            return Err(RouterError::IsmRejected(id));
        }

        let call = Call::new(self.address);
        self.ledger.transact(&mut (), |_| {
            recipient.handle(&call, message.origin, message.sender, &message.body)?;
            self.ledger.write(|state| {
                state
                    .mailboxes
                    .entry(self.address)
                    .or_default()
                    .delivered
                    .insert(id);
            });
            self.ledger.emit(
                self.address,
                DomainEvent::Process {
                    id,
                    origin: message.origin,
                },
            );
            info!(domain, origin = message.origin, message_id = ?id, "Message processed");
            Ok(id)
        })
    }

    fn with_book<R>(&self, f: impl FnOnce(&MailboxBook) -> R) -> R {
        self.ledger.read(|state| match state.mailboxes.get(&self.address) {
            Some(book) => f(book),
            None => f(&MailboxBook::default()),
        })
    }

    fn build_message(&self, sender: Address, params: &DispatchParams, nonce: u32) -> DispatchedMessage {
        DispatchedMessage {
            version: DispatchedMessage::CURRENT_VERSION,
            nonce,
            origin: self.ledger.domain(),
            sender,
            destination: params.destination,
            recipient: params.recipient,
            body: params.body.clone(),
        }
    }

    fn hook_for(&self, params: &DispatchParams) -> Arc<dyn PostDispatchHook> {
        params
            .hook
            .clone()
            .unwrap_or_else(|| self.default_hook.clone())
    }
}

impl Mailbox for LedgerMailbox {
    fn address(&self) -> Address {
        self.address
    }

    fn local_domain(&self) -> DomainId {
        self.ledger.domain()
    }

    fn quote_dispatch(&self, sender: Address, params: &DispatchParams) -> Result<U256, RouterError> {
        let message = self.build_message(sender, params, self.nonce());
        self.hook_for(params).quote_dispatch(&params.metadata, &message)
    }

    fn dispatch(&self, sender: Address, params: DispatchParams) -> Result<MessageId, RouterError> {
        self.ledger.transact(&mut (), |_| {
            let nonce = self.nonce();
            let next = nonce.checked_add(1).ok_or(LedgerError::Overflow)?;
            let message = self.build_message(sender, &params, nonce);
            let id = message.id();

            self.hook_for(&params)
                .post_dispatch(&params.metadata, &message, sender, params.value)?;

            self.ledger.write(|state| {
                let book = state.mailboxes.entry(self.address).or_default();
                book.nonce = next;
                book.outbox.push(message);
            });
            self.ledger.emit(
                self.address,
                DomainEvent::Dispatch {
                    id,
                    destination: params.destination,
                    recipient: params.recipient,
                },
            );
            debug!(
                origin = self.ledger.domain(),
                destination = params.destination,
                nonce,
                message_id = ?id,
                "Message dispatched"
            );
            Ok(id)
        })
    }
}
