//! # Error Types
//!
//! Decoding failures for the cross-domain wire formats.

use thiserror::Error;

/// Errors raised while decoding bytes received from another domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload shorter than the fixed-width prefix of the format.
    #[error("Payload too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    /// Envelope version this build does not understand.
    #[error("Unsupported message version: received {received}, supported {supported}")]
    UnsupportedVersion { received: u8, supported: u8 },
}
