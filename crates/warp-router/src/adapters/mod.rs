//! # Adapters
//!
//! In-memory implementations of every port, all backed by a per-domain
//! [`DomainLedger`] so that a router call and everything it touches commit or
//! revert together.

pub mod bridge;
pub mod hooks;
pub mod ism;
pub mod ledger;
pub mod mailbox;
pub mod relayer;
pub mod token;
pub mod vault;

pub use bridge::{BridgeFeeModel, LedgerBridge};
pub use hooks::{
    AggregationHook, InterchainGasPaymaster, NoopHook, ProtocolFeeHook, RemoteGasData,
    DEFAULT_GAS_LIMIT, NATIVE_DECIMALS, TOKEN_EXCHANGE_RATE_SCALE,
};
pub use ism::{StaticIsm, TrustedRelayerIsm};
pub use ledger::{DomainLedger, LedgerState, TokenBook};
pub use mailbox::LedgerMailbox;
pub use relayer::{RelayReport, Relayer};
pub use token::LedgerToken;
pub use vault::LedgerVault;
