//! # Core Identifiers
//!
//! Domains, addresses and amounts as seen by every router.
//!
//! Addresses are 32-byte identifiers on every domain so that a local account and a
//! remote router share one encoding. Amounts are unsigned 256-bit integers.

use sha3::{Digest, Keccak256};

// Re-export the fixed-width primitives so downstream crates agree on one version.
pub use primitive_types::{H256, U256, U512};

/// Opaque identifier of an execution environment (chain).
pub type DomainId = u32;

/// 32-byte account or contract identifier.
pub type Address = H256;

/// Identifier the transport assigns to a dispatched message.
pub type MessageId = H256;

/// Builds an address whose low eight bytes hold `n`.
///
/// Used for fixtures and for human-readable configuration.
#[must_use]
pub fn address_from_low_u64(n: u64) -> Address {
    H256::from_low_u64_be(n)
}

/// Keccak-256 digest of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_slice(&hasher.finalize())
}

/// Big-endian 32-byte encoding of a `U256`.
#[must_use]
pub fn u256_to_be_bytes(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Short hex rendering (`0xabcd…ef01`) used in log lines.
#[must_use]
pub fn short_hex(id: &H256) -> String {
    let bytes = id.as_bytes();
    format!(
        "0x{}..{}",
        hex::encode(&bytes[..4]),
        hex::encode(&bytes[28..])
    )
}
