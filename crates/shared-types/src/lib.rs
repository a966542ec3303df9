//! # Shared Types Crate
//!
//! Identifier types and wire formats shared by every warp-route crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the byte layout of a transfer payload and of the
//!   transport envelope is defined once, here.
//! - **Exact Round-Trip**: `decode(encode(m)) == m` for every value, including empty
//!   metadata and the maximum 256-bit amount.
//! - **Opaque Domains**: a domain is a bare `u32` with equality semantics only.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod message;

pub use entities::*;
pub use envelope::DispatchedMessage;
pub use errors::*;
pub use message::TransferMessage;
