//! # Ledger Bridge
//!
//! A value-transfer bridge for one asset with a flat token fee and a flat
//! native fee. The fee model decides whether the token fee is charged on top
//! of the amount or taken out of what arrives.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{keccak256, Address, DomainId, H256};
use tracing::info;

use super::ledger::DomainLedger;
use super::token::LedgerToken;
use crate::domain::{
    invariant_sufficient_value, Asset, BridgeTransfer, DomainEvent, LedgerError, Quote, RouterError,
};
use crate::ports::ValueTransferBridge;

/// Where the bridge's token fee comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BridgeFeeModel {
    /// Sender pays `amount + fee`; the recipient receives `amount`.
    Additive,
    /// Sender pays `amount`; the recipient receives `amount - fee`.
    Subtractive,
}

/// Bridge deployed on a [`DomainLedger`].
#[derive(Clone, Debug)]
pub struct LedgerBridge {
    ledger: DomainLedger,
    address: Address,
    asset: Asset,
    token_fee: U256,
    native_fee: U256,
    model: BridgeFeeModel,
}

impl LedgerBridge {
    /// Fee-free bridge for `asset`.
    #[must_use]
    pub fn new(ledger: &DomainLedger, address: Address, asset: Asset) -> Self {
        Self {
            ledger: ledger.clone(),
            address,
            asset,
            token_fee: U256::zero(),
            native_fee: U256::zero(),
            model: BridgeFeeModel::Additive,
        }
    }

    /// Charge `fee` in the bridged asset under `model`.
    #[must_use]
    pub fn with_token_fee(mut self, fee: U256, model: BridgeFeeModel) -> Self {
        self.token_fee = fee;
        self.model = model;
        self
    }

    /// Charge `fee` in native currency.
    #[must_use]
    pub fn with_native_fee(mut self, fee: U256) -> Self {
        self.native_fee = fee;
        self
    }

    /// Credit a transfer on the destination by minting to its recipient.
    pub fn deliver_on(destination: &LedgerToken, transfer: &BridgeTransfer) -> Result<(), RouterError> {
        Ok(destination.mint(transfer.recipient, transfer.delivered)?)
    }

    fn token_required(&self, amount: U256) -> Result<U256, RouterError> {
        match self.model {
            BridgeFeeModel::Additive => amount
                .checked_add(self.token_fee)
                .ok_or(RouterError::Ledger(LedgerError::Overflow)),
            BridgeFeeModel::Subtractive => Ok(amount),
        }
    }

    fn delivered(&self, amount: U256) -> Result<U256, RouterError> {
        match self.model {
            BridgeFeeModel::Additive => Ok(amount),
            BridgeFeeModel::Subtractive => {
                if amount <= self.token_fee {
                    return Err(RouterError::InsufficientValue {
                        required: self.token_fee + U256::one(),
                        supplied: amount,
                    });
                }
                Ok(amount - self.token_fee)
            }
        }
    }
}

impl ValueTransferBridge for LedgerBridge {
    fn address(&self) -> Address {
        self.address
    }

    fn quote_transfer_remote(&self, _: DomainId, _: H256, amount: U256) -> Vec<Quote> {
        let token = self.token_required(amount).unwrap_or(U256::MAX);
        vec![
            Quote::new(Asset::Native, self.native_fee),
            Quote::new(self.asset, token),
        ]
    }

    fn transfer_remote(
        &self,
        caller: Address,
        value: U256,
        destination: DomainId,
        recipient: H256,
        amount: U256,
    ) -> Result<H256, RouterError> {
        let token_required = self.token_required(amount)?;
        let delivered = self.delivered(amount)?;
        let native = self.ledger.native();

        match self.asset {
            Asset::Native => {
                let required = self
                    .native_fee
                    .checked_add(token_required)
                    .ok_or(LedgerError::Overflow)?;
                invariant_sufficient_value(required, value)?;
                native.transfer(caller, self.address, required)?;
            }
            Asset::Token(_) => {
                invariant_sufficient_value(self.native_fee, value)?;
                native.transfer(caller, self.address, self.native_fee)?;
                self.ledger.asset(self.asset).transfer_from(
                    self.address,
                    caller,
                    self.address,
                    token_required,
                )?;
            }
        }

        let transfer_id = self.ledger.write(|state| {
            let nonce = state.bridge_transfers.len() as u64;
            let mut preimage = self.address.as_bytes().to_vec();
            preimage.extend_from_slice(&nonce.to_be_bytes());
            let transfer_id = keccak256(&preimage);
            state.bridge_transfers.push(BridgeTransfer {
                transfer_id,
                bridge: self.address,
                sender: caller,
                destination,
                recipient,
                amount,
                delivered,
                native_fee: self.native_fee,
            });
            transfer_id
        });
        self.ledger.emit(
            self.address,
            DomainEvent::BridgeTransferInitiated {
                transfer_id,
                destination,
                delivered,
            },
        );
        info!(
            bridge = ?self.address,
            destination,
            %amount,
            %delivered,
            "Bridge transfer initiated"
        );
        Ok(transfer_id)
    }
}
