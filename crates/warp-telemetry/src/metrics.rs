//! Prometheus metrics for warp routers.
//!
//! All metrics follow the naming convention: `warp_<area>_<metric>_<unit>`.
//! Counters are labelled by custody kind (`native`, `collateral`, `synthetic`,
//! `vault`, `lp`) so a single registry serves every router in the process.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // TRANSFER METRICS
    // =========================================================================

    /// Outbound transfers dispatched
    pub static ref TRANSFERS_SENT: CounterVec = CounterVec::new(
        Opts::new("warp_router_transfers_sent_total", "Outbound transfers dispatched"),
        &["custody"]
    ).expect("metric creation failed");

    /// Inbound transfers credited
    pub static ref TRANSFERS_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("warp_router_transfers_received_total", "Inbound transfers credited"),
        &["custody"]
    ).expect("metric creation failed");

    /// Router operations that reverted, by error category
    pub static ref ROUTER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("warp_router_errors_total", "Reverted router operations"),
        &["operation", "category"]
    ).expect("metric creation failed");

    // =========================================================================
    // LIQUIDITY METRICS
    // =========================================================================

    /// Collateral moved to other domains by rebalancers
    pub static ref REBALANCES: CounterVec = CounterVec::new(
        Opts::new("warp_collateral_rebalances_total", "Collateral rebalance operations"),
        &["custody"]
    ).expect("metric creation failed");

    /// Fast transfers fronted by fillers
    pub static ref FAST_FILLS: CounterVec = CounterVec::new(
        Opts::new("warp_fast_fills_total", "Fast transfers fronted by fillers"),
        &["custody"]
    ).expect("metric creation failed");

    /// Vault surplus sweeps
    pub static ref VAULT_SWEEPS: CounterVec = CounterVec::new(
        Opts::new("warp_vault_sweeps_total", "Vault surplus sweeps"),
        &["custody"]
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSPORT METRICS
    // =========================================================================

    /// Messages delivered by relayers, by outcome
    pub static ref MESSAGES_PROCESSED: CounterVec = CounterVec::new(
        Opts::new("warp_transport_messages_processed_total", "Messages processed by the transport"),
        &["outcome"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this twice returns an error for the duplicate registration.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TRANSFERS_SENT.clone()),
        Box::new(TRANSFERS_RECEIVED.clone()),
        Box::new(ROUTER_ERRORS.clone()),
        Box::new(REBALANCES.clone()),
        Box::new(FAST_FILLS.clone()),
        Box::new(VAULT_SWEEPS.clone()),
        Box::new(MESSAGES_PROCESSED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
