//! # `DispatchedMessage` Envelope
//!
//! The transport-level wrapper around a router payload. The transport owns this
//! format; routers only ever see `origin`, `sender` and `body`.
//!
//! ## Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | version |
//! | 1 | 4 | nonce |
//! | 5 | 4 | origin domain |
//! | 9 | 32 | sender |
//! | 41 | 4 | destination domain |
//! | 45 | 32 | recipient |
//! | 77 | n | body |
//!
//! Integers are big-endian. The message id is the keccak-256 of the encoding.

use crate::entities::{keccak256, DomainId, MessageId, H256};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};

/// A message accepted by the transport of its origin domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedMessage {
    /// Envelope format version.
    pub version: u8,
    /// Per-origin sequence number assigned at dispatch.
    pub nonce: u32,
    /// Domain the message was dispatched from.
    pub origin: DomainId,
    /// Identifier of the dispatching contract on the origin.
    pub sender: H256,
    /// Domain the message is addressed to.
    pub destination: DomainId,
    /// Identifier of the receiving contract on the destination.
    pub recipient: H256,
    /// Router payload.
    pub body: Vec<u8>,
}

impl DispatchedMessage {
    /// Current envelope version.
    pub const CURRENT_VERSION: u8 = 3;

    /// Byte length of the fixed header.
    pub const HEADER_LEN: usize = 77;

    /// Encode to the wire layout.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::HEADER_LEN + self.body.len());
        out.push(self.version);
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.origin.to_be_bytes());
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(&self.destination.to_be_bytes());
        out.extend_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }

    /// Decode from the wire layout, rejecting unknown versions.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(CodecError::TooShort {
                len: bytes.len(),
                min: Self::HEADER_LEN,
            });
        }
        let version = bytes[0];
        if version != Self::CURRENT_VERSION {
            return Err(CodecError::UnsupportedVersion {
                received: version,
                supported: Self::CURRENT_VERSION,
            });
        }
        Ok(Self {
            version,
            nonce: read_u32(&bytes[1..5]),
            origin: read_u32(&bytes[5..9]),
            sender: H256::from_slice(&bytes[9..41]),
            destination: read_u32(&bytes[41..45]),
            recipient: H256::from_slice(&bytes[45..77]),
            body: bytes[77..].to_vec(),
        })
    }

    /// Unique identifier of this message.
    #[must_use]
    pub fn id(&self) -> MessageId {
        keccak256(&self.encode())
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::address_from_low_u64;

    fn sample() -> DispatchedMessage {
        DispatchedMessage {
            version: DispatchedMessage::CURRENT_VERSION,
            nonce: 5,
            origin: 1000,
            sender: address_from_low_u64(1),
            destination: 2000,
            recipient: address_from_low_u64(2),
            body: vec![9, 9, 9],
        }
    }

    #[test]
    fn test_envelope_round_trip() {
        let msg = sample();
        assert_eq!(DispatchedMessage::decode(&msg.encode()).unwrap(), msg);
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample().encode();
        assert_eq!(bytes.len(), DispatchedMessage::HEADER_LEN + 3);
        assert_eq!(bytes[0], 3);
        assert_eq!(&bytes[1..5], &5u32.to_be_bytes());
        assert_eq!(&bytes[41..45], &2000u32.to_be_bytes());
    }

    #[test]
    fn test_id_changes_with_nonce() {
        let a = sample();
        let mut b = sample();
        b.nonce += 1;
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), sample().id());
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut bytes = sample().encode();
        bytes[0] = 1;
        assert!(matches!(
            DispatchedMessage::decode(&bytes),
            Err(CodecError::UnsupportedVersion { received: 1, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_header() {
        assert!(matches!(
            DispatchedMessage::decode(&[3u8; 20]),
            Err(CodecError::TooShort { len: 20, .. })
        ));
    }
}
