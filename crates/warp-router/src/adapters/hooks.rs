//! # Post-Dispatch Hooks
//!
//! Native-value payments attached to a dispatch.
//!
//! | Hook | Charge |
//! |------|--------|
//! | `InterchainGasPaymaster` | destination gas priced through a per-domain oracle |
//! | `ProtocolFeeHook` | flat fee |
//! | `AggregationHook` | sum of its children |
//! | `NoopHook` | nothing |
//!
//! Every hook takes its charge from the payer and refunds the rest of the
//! attached value to the refund address.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, DispatchedMessage, DomainId};
use tracing::debug;

use super::ledger::DomainLedger;
use crate::algorithms::{convert_decimals, mul_div, Rounding};
use crate::domain::{invariant_sufficient_value, LedgerError, RouterError};
use crate::ports::{HookMetadata, PostDispatchHook};

/// Scale of `RemoteGasData::token_exchange_rate`.
pub const TOKEN_EXCHANGE_RATE_SCALE: u128 = 10_000_000_000;

/// Gas budgeted for handling when the router sets no destination gas.
pub const DEFAULT_GAS_LIMIT: u64 = 50_000;

/// Decimals of every domain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Pricing of a destination domain's gas in local native currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteGasData {
    /// Remote native per local native, scaled by `TOKEN_EXCHANGE_RATE_SCALE`.
    pub token_exchange_rate: u128,
    /// Remote gas price in remote native base units.
    pub gas_price: u128,
    /// Decimals of the remote native currency.
    pub token_decimals: u8,
}

fn settle(
    ledger: &DomainLedger,
    beneficiary: Address,
    charge: U256,
    metadata: &HookMetadata,
    payer: Address,
    value: U256,
) -> Result<(), RouterError> {
    invariant_sufficient_value(charge, value)?;
    let native = ledger.native();
    native.transfer(payer, beneficiary, charge)?;
    let refund = value - charge;
    if !refund.is_zero() {
        native.transfer(payer, metadata.refund_address, refund)?;
    }
    Ok(())
}

// =============================================================================
// INTERCHAIN GAS PAYMASTER
// =============================================================================

/// Charges for destination gas at oracle prices.
#[derive(Clone, Debug)]
pub struct InterchainGasPaymaster {
    ledger: DomainLedger,
    address: Address,
    beneficiary: Address,
    oracles: Arc<RwLock<HashMap<DomainId, RemoteGasData>>>,
    overheads: Arc<RwLock<HashMap<DomainId, u64>>>,
}

impl InterchainGasPaymaster {
    /// New paymaster crediting payments to `beneficiary`.
    #[must_use]
    pub fn new(ledger: &DomainLedger, address: Address, beneficiary: Address) -> Self {
        Self {
            ledger: ledger.clone(),
            address,
            beneficiary,
            oracles: Arc::new(RwLock::new(HashMap::new())),
            overheads: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the oracle data for `domain`.
    pub fn set_remote_gas_data(&self, domain: DomainId, data: RemoteGasData) {
        self.oracles.write().insert(domain, data);
    }

    /// Gas added to every quote for `domain`.
    pub fn set_gas_overhead(&self, domain: DomainId, gas: u64) {
        self.overheads.write().insert(domain, gas);
    }

    /// Native value to pay for `gas_amount` on `destination`.
    pub fn quote_gas_payment(&self, destination: DomainId, gas_amount: u64) -> Result<U256, RouterError> {
        let data = self
            .oracles
            .read()
            .get(&destination)
            .copied()
            .ok_or(RouterError::NoGasOracle(destination))?;
        let overhead = self.overheads.read().get(&destination).copied().unwrap_or(0);
        let total_gas = U256::from(gas_amount) + U256::from(overhead);

        let destination_cost = total_gas * U256::from(data.gas_price);
        let origin_cost = mul_div(
            destination_cost,
            U256::from(data.token_exchange_rate),
            U256::from(TOKEN_EXCHANGE_RATE_SCALE),
            Rounding::Down,
        )
        .ok_or(LedgerError::Overflow)?;

        convert_decimals(origin_cost, data.token_decimals, NATIVE_DECIMALS).ok_or(
            RouterError::DecimalConversion {
                amount: origin_cost,
                from: data.token_decimals,
                to: NATIVE_DECIMALS,
            },
        )
    }
}

impl PostDispatchHook for InterchainGasPaymaster {
    fn address(&self) -> Address {
        self.address
    }

    fn quote_dispatch(
        &self,
        metadata: &HookMetadata,
        message: &DispatchedMessage,
    ) -> Result<U256, RouterError> {
        self.quote_gas_payment(
            message.destination,
            metadata.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT),
        )
    }

    fn post_dispatch(
        &self,
        metadata: &HookMetadata,
        message: &DispatchedMessage,
        payer: Address,
        value: U256,
    ) -> Result<(), RouterError> {
        let payment = self.quote_dispatch(metadata, message)?;
        settle(&self.ledger, self.beneficiary, payment, metadata, payer, value)?;
        debug!(
            destination = message.destination,
            %payment,
            "Gas payment"
        );
        Ok(())
    }
}

// =============================================================================
// PROTOCOL FEE
// =============================================================================

/// Flat fee per dispatch.
#[derive(Clone, Debug)]
pub struct ProtocolFeeHook {
    ledger: DomainLedger,
    address: Address,
    fee: U256,
    beneficiary: Address,
}

impl ProtocolFeeHook {
    /// New hook charging `fee` to `beneficiary`.
    #[must_use]
    pub fn new(ledger: &DomainLedger, address: Address, fee: U256, beneficiary: Address) -> Self {
        Self {
            ledger: ledger.clone(),
            address,
            fee,
            beneficiary,
        }
    }
}

impl PostDispatchHook for ProtocolFeeHook {
    fn address(&self) -> Address {
        self.address
    }

    fn quote_dispatch(&self, _: &HookMetadata, _: &DispatchedMessage) -> Result<U256, RouterError> {
        Ok(self.fee)
    }

    fn post_dispatch(
        &self,
        metadata: &HookMetadata,
        _: &DispatchedMessage,
        payer: Address,
        value: U256,
    ) -> Result<(), RouterError> {
        settle(&self.ledger, self.beneficiary, self.fee, metadata, payer, value)
    }
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// Runs several hooks, each paid exactly its quote.
#[derive(Clone, Debug)]
pub struct AggregationHook {
    ledger: DomainLedger,
    address: Address,
    hooks: Vec<Arc<dyn PostDispatchHook>>,
}

impl AggregationHook {
    /// Aggregate `hooks` in order.
    #[must_use]
    pub fn new(ledger: &DomainLedger, address: Address, hooks: Vec<Arc<dyn PostDispatchHook>>) -> Self {
        Self {
            ledger: ledger.clone(),
            address,
            hooks,
        }
    }
}

impl PostDispatchHook for AggregationHook {
    fn address(&self) -> Address {
        self.address
    }

    fn quote_dispatch(
        &self,
        metadata: &HookMetadata,
        message: &DispatchedMessage,
    ) -> Result<U256, RouterError> {
        self.hooks.iter().try_fold(U256::zero(), |total, hook| {
            total
                .checked_add(hook.quote_dispatch(metadata, message)?)
                .ok_or(RouterError::Ledger(LedgerError::Overflow))
        })
    }

    fn post_dispatch(
        &self,
        metadata: &HookMetadata,
        message: &DispatchedMessage,
        payer: Address,
        value: U256,
    ) -> Result<(), RouterError> {
        let total = self.quote_dispatch(metadata, message)?;
        invariant_sufficient_value(total, value)?;
        for hook in &self.hooks {
            let quote = hook.quote_dispatch(metadata, message)?;
            hook.post_dispatch(metadata, message, payer, quote)?;
        }
        let refund = value - total;
        if !refund.is_zero() {
            self.ledger
                .native()
                .transfer(payer, metadata.refund_address, refund)?;
        }
        Ok(())
    }
}

// =============================================================================
// NOOP
// =============================================================================

/// Charges nothing and refunds everything.
#[derive(Clone, Debug)]
pub struct NoopHook {
    ledger: DomainLedger,
    address: Address,
}

impl NoopHook {
    /// New no-op hook.
    #[must_use]
    pub fn new(ledger: &DomainLedger, address: Address) -> Self {
        Self {
            ledger: ledger.clone(),
            address,
        }
    }
}

impl PostDispatchHook for NoopHook {
    fn address(&self) -> Address {
        self.address
    }

    fn quote_dispatch(&self, _: &HookMetadata, _: &DispatchedMessage) -> Result<U256, RouterError> {
        Ok(U256::zero())
    }

    fn post_dispatch(
        &self,
        metadata: &HookMetadata,
        _: &DispatchedMessage,
        payer: Address,
        value: U256,
    ) -> Result<(), RouterError> {
        settle(&self.ledger, self.address, U256::zero(), metadata, payer, value)
    }
}
