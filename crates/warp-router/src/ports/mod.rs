//! # Ports
//!
//! Trait seams between routers and the environment they run in.

pub mod inbound;
pub mod outbound;

pub use inbound::MessageRecipient;
pub use outbound::{
    DispatchParams, Erc4626Vault, HookMetadata, InterchainSecurityModule, Mailbox,
    PostDispatchHook, ValueTransferBridge,
};
