//! # Transfer Message
//!
//! The payload a router hands to the transport, and the only contract between the
//! routers of two domains.
//!
//! ## Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 32 | recipient identifier |
//! | 32 | 32 | amount, big-endian `U256` |
//! | 64 | n | metadata, opaque, possibly empty |

use crate::entities::{u256_to_be_bytes, H256, U256};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};

/// Immutable cross-domain transfer payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferMessage {
    recipient: H256,
    amount: U256,
    metadata: Vec<u8>,
}

impl TransferMessage {
    /// Byte length of the fixed recipient + amount prefix.
    pub const HEADER_LEN: usize = 64;

    /// Create a new transfer message.
    #[must_use]
    pub fn new(recipient: H256, amount: U256, metadata: Vec<u8>) -> Self {
        Self {
            recipient,
            amount,
            metadata,
        }
    }

    /// Recipient identifier on the destination domain.
    #[must_use]
    pub fn recipient(&self) -> H256 {
        self.recipient
    }

    /// Amount, expressed in the destination's decimals.
    #[must_use]
    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Opaque metadata carried alongside the transfer.
    #[must_use]
    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    /// Encode to the wire layout.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::HEADER_LEN + self.metadata.len());
        out.extend_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(&u256_to_be_bytes(self.amount));
        out.extend_from_slice(&self.metadata);
        out
    }

    /// Decode from the wire layout.
    ///
    /// Everything past the 64-byte prefix is metadata, so any input of at least
    /// 64 bytes decodes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(CodecError::TooShort {
                len: bytes.len(),
                min: Self::HEADER_LEN,
            });
        }
        Ok(Self {
            recipient: H256::from_slice(&bytes[..32]),
            amount: U256::from_big_endian(&bytes[32..64]),
            metadata: bytes[64..].to_vec(),
        })
    }
}
