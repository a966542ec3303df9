//! # Relayer
//!
//! Carries messages from an origin mailbox's outbox to a destination mailbox.
//! Delivery order is up to the caller; failed deliveries stay pending and can
//! be retried.

use shared_types::{Address, DispatchedMessage, MessageId};
use tracing::warn;
use warp_telemetry::{log_event, metric_inc, MESSAGES_PROCESSED};

use super::mailbox::LedgerMailbox;
use crate::domain::RouterError;
use crate::ports::MessageRecipient;

/// Outcome of a relay pass.
#[derive(Debug, Default)]
pub struct RelayReport {
    /// Messages processed in this pass.
    pub delivered: Vec<MessageId>,
    /// Messages that reverted, with the reason.
    pub failed: Vec<(MessageId, RouterError)>,
}

/// Off-chain agent delivering messages.
#[derive(Clone, Debug)]
pub struct Relayer {
    address: Address,
    metadata: Vec<u8>,
}

impl Relayer {
    /// Relayer submitting from `address` with empty security metadata.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            metadata: Vec::new(),
        }
    }

    /// Attach security metadata to every delivery.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Submitting account.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Messages in `origin`'s outbox for `recipient` on `destination` that
    /// have not been processed yet.
    #[must_use]
    pub fn pending(
        origin: &LedgerMailbox,
        destination: &LedgerMailbox,
        recipient: Address,
    ) -> Vec<DispatchedMessage> {
        let domain = destination.ledger().domain();
        origin
            .outbox()
            .into_iter()
            .filter(|m| m.destination == domain && m.recipient == recipient)
            .filter(|m| !destination.delivered(&m.id()))
            .collect()
    }

    /// Deliver one message.
    pub fn deliver(
        &self,
        destination: &LedgerMailbox,
        message: &DispatchedMessage,
        recipient: &mut dyn MessageRecipient,
    ) -> Result<MessageId, RouterError> {
        match destination.process(self.address, &self.metadata, message, recipient) {
            Ok(id) => {
                metric_inc!(MESSAGES_PROCESSED, &["delivered"]);
                Ok(id)
            }
            Err(e) => {
                metric_inc!(MESSAGES_PROCESSED, &["failed"]);
                warn!(
                    origin = message.origin,
                    nonce = message.nonce,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Delivery failed"
                );
                Err(e)
            }
        }
    }

    /// Deliver every pending message from `origin` to `recipient`, oldest first.
    pub fn relay_pending(
        &self,
        origin: &LedgerMailbox,
        destination: &LedgerMailbox,
        recipient: &mut dyn MessageRecipient,
    ) -> RelayReport {
        let mut report = RelayReport::default();
        for message in Self::pending(origin, destination, recipient.address()) {
            match self.deliver(destination, &message, recipient) {
                Ok(id) => report.delivered.push(id),
                Err(e) => report.failed.push((message.id(), e)),
            }
        }
        log_event!(
            info,
            destination.ledger().domain(),
            "Relay pass complete",
            delivered = report.delivered.len(),
            failed = report.failed.len()
        );
        report
    }
}
