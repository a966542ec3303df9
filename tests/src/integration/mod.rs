//! # Integration Tests
//!
//! Routers on two domains, each with its own ledger and mailbox, joined by a
//! relayer that delivers in whatever order a test asks for.

pub mod flows;
pub mod harness;
pub mod settlement;
