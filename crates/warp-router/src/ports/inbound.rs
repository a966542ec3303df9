//! # Inbound Ports
//!
//! The surface the transport calls on delivery.

use std::sync::Arc;

use shared_types::{Address, DomainId, H256};

use super::outbound::InterchainSecurityModule;
use crate::domain::{Call, RouterError};

/// A contract that receives messages from the transport.
pub trait MessageRecipient {
    /// Recipient contract.
    fn address(&self) -> Address;

    /// Security module overriding the mailbox default, if any.
    fn interchain_security_module(&self) -> Option<Arc<dyn InterchainSecurityModule>>;

    /// Handle a verified message. `call.sender` is the delivering mailbox.
    fn handle(
        &mut self,
        call: &Call,
        origin: DomainId,
        sender: H256,
        body: &[u8],
    ) -> Result<(), RouterError>;
}
