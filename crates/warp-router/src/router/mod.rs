//! # Routers
//!
//! | Router | Adds |
//! |--------|------|
//! | [`TokenRouter`] | enrollment, outbound transfers, inbound handling |
//! | [`MovableCollateralRouter`] | rebalancer-driven moves of idle collateral through bridges |
//! | [`FastTokenRouter`] | filler-fronted payouts reconciled by the slow message |
//!
//! Every state-changing operation runs inside [`crate::adapters::DomainLedger::transact`]:
//! it either completes or leaves the router and its ledger exactly as they were.

pub mod fast;
pub mod liquidity;
pub mod movable;
pub mod token_router;

pub use fast::FastTokenRouter;
pub use movable::MovableCollateralRouter;
pub use token_router::TokenRouter;

use tracing::warn;
use warp_telemetry::{metric_inc, ROUTER_ERRORS};

use crate::domain::RouterError;

/// Count and log a failed operation, passing the result through.
pub(crate) fn observe<T>(operation: &'static str, result: Result<T, RouterError>) -> Result<T, RouterError> {
    if let Err(e) = &result {
        let category = e.category();
        metric_inc!(ROUTER_ERRORS, &[operation, category.as_str()]);
        warn!(
            operation,
            category = category.as_str(),
            retryable = e.is_retryable(),
            error = %e,
            "Router operation reverted"
        );
    }
    result
}
