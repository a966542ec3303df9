//! # Warp Router
//!
//! Token routers that move value between domains over an authenticated
//! message-passing layer.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A router on each domain holds custody of the token it represents. Sending
//! locks (or burns) on the origin and dispatches a [`shared_types::TransferMessage`];
//! handling the message on the destination releases (or mints) the same value,
//! rescaled between local and wire decimals.
//!
//! ## Safety Properties
//!
//! | Property | Enforced by |
//! |----------|-------------|
//! | Only enrolled routers are trusted | [`domain::invariant_trusted_sender`] |
//! | Failed calls leave no trace | [`adapters::DomainLedger::transact`] |
//! | Vault users never lose to yield sweeps | [`custody::VaultCustody::sweep`] |
//! | A fast transfer pays out once | [`router::FastTokenRouter`] fill records |
//!
//! ## Module Structure
//!
//! ```text
//! warp-router/
//! ├── domain/          # Call, events, RouterError, invariants
//! ├── algorithms/      # share math, decimal scaling, fee curves
//! ├── ports/           # Mailbox, hooks, ISM, vault, bridge traits
//! ├── adapters/        # in-memory ledger, mailbox, hooks, relayer
//! ├── custody/         # native, collateral, synthetic, vault, LP
//! ├── router/          # TokenRouter, MovableCollateralRouter, FastTokenRouter
//! └── config.rs        # WarpRouteConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod custody;
pub mod domain;
pub mod ports;
pub mod router;

// Re-exports
pub use adapters::{
    DomainLedger, LedgerBridge, LedgerMailbox, LedgerToken, LedgerVault, Relayer, RelayReport,
};
pub use config::{ConfigError, TokenType, WarpRouteConfig};
pub use custody::{
    CollateralCustody, Custody, LpCustody, MovableCustody, NativeCustody, SyntheticCustody,
    VaultCustody,
};
pub use domain::{Call, CustodyKind, DomainEvent, ErrorCategory, RouterError, TransferRequest};
pub use ports::{Mailbox, MessageRecipient, PostDispatchHook, ValueTransferBridge};
pub use router::{FastTokenRouter, MovableCollateralRouter, TokenRouter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
