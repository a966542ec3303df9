//! Interchain security modules.

use std::collections::HashSet;

use shared_types::{Address, DispatchedMessage};

use crate::ports::InterchainSecurityModule;

/// Accepts or rejects every message. Used where verification is out of scope.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticIsm {
    accept: bool,
}

impl StaticIsm {
    /// Accept everything.
    #[must_use]
    pub fn accept_all() -> Self {
        Self { accept: true }
    }

    /// Reject everything.
    #[must_use]
    pub fn reject_all() -> Self {
        Self { accept: false }
    }
}

impl InterchainSecurityModule for StaticIsm {
    fn verify(&self, _: Address, _: &[u8], _: &DispatchedMessage) -> bool {
        self.accept
    }
}

/// Accepts messages delivered by a fixed set of relayers.
#[derive(Clone, Debug, Default)]
pub struct TrustedRelayerIsm {
    relayers: HashSet<Address>,
}

impl TrustedRelayerIsm {
    /// Trust `relayers`.
    #[must_use]
    pub fn new(relayers: impl IntoIterator<Item = Address>) -> Self {
        Self {
            relayers: relayers.into_iter().collect(),
        }
    }
}

impl InterchainSecurityModule for TrustedRelayerIsm {
    fn verify(&self, relayer: Address, _: &[u8], _: &DispatchedMessage) -> bool {
        self.relayers.contains(&relayer)
    }
}
