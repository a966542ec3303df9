//! # Domain Entities
//!
//! Records with identity or history: emitted events, fast-transfer intents and
//! bridge transfers.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, DomainId, MessageId, H256};

use super::value_objects::FillState;
use crate::algorithms::FeeCurve;

/// Observable state change, appended to the emitting domain's event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// Transport accepted a message.
    Dispatch {
        /// Message id
        id: MessageId,
        /// Destination domain
        destination: DomainId,
        /// Recipient on the destination
        recipient: H256,
    },
    /// Transport delivered a message.
    Process {
        /// Message id
        id: MessageId,
        /// Origin domain
        origin: DomainId,
    },
    /// Outbound transfer dispatched.
    SentTransferRemote {
        /// Destination domain
        destination: DomainId,
        /// Recipient on the destination
        recipient: H256,
        /// Amount in local decimals
        amount: U256,
    },
    /// Inbound transfer credited.
    ReceivedTransferRemote {
        /// Origin domain
        origin: DomainId,
        /// Local recipient
        recipient: H256,
        /// Amount in local decimals
        amount: U256,
    },
    /// Remote router enrolled or replaced.
    RemoteRouterEnrolled {
        /// Remote domain
        domain: DomainId,
        /// Router identifier, `None` when unenrolled
        router: Option<H256>,
    },
    /// Ownership changed.
    OwnershipTransferred {
        /// Previous owner
        previous: Option<Address>,
        /// New owner
        new: Option<Address>,
    },
    /// Collateral moved to another domain through a bridge.
    CollateralMoved {
        /// Destination domain
        domain: DomainId,
        /// Recipient on the destination
        recipient: H256,
        /// Amount requested
        amount: U256,
        /// Rebalancer that triggered the move
        rebalancer: Address,
    },
    /// A bridge accepted a value transfer.
    BridgeTransferInitiated {
        /// Transfer id
        transfer_id: H256,
        /// Destination domain
        destination: DomainId,
        /// Amount delivered on the destination
        delivered: U256,
    },
    /// Vault surplus swept to the owner.
    ExcessSharesSwept {
        /// Shares redeemed
        shares: U256,
        /// Assets paid out
        assets: U256,
    },
    /// A filler fronted a fast transfer.
    FastTransferFilled {
        /// Fill key
        key: H256,
        /// Filler
        filler: Address,
        /// Amount paid to the recipient
        net_amount: U256,
    },
    /// LP deposit.
    Deposit {
        /// Depositor
        sender: Address,
        /// Share receiver
        owner: Address,
        /// Assets in
        assets: U256,
        /// Shares minted
        shares: U256,
    },
    /// LP withdrawal.
    Withdraw {
        /// Caller
        sender: Address,
        /// Asset receiver
        receiver: Address,
        /// Share owner
        owner: Address,
        /// Assets out
        assets: U256,
        /// Shares burned
        shares: U256,
    },
    /// LP donation.
    Donation {
        /// Donor
        sender: Address,
        /// Assets added without minting shares
        amount: U256,
    },
}

/// An event together with the account that emitted it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Emitting contract
    pub emitter: Address,
    /// Event payload
    pub event: DomainEvent,
}

/// A fast-transfer intent seen on the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRecord {
    /// Account that fronted the funds, if any.
    pub filler: Option<Address>,
    /// Final recipient.
    pub recipient: H256,
    /// Full amount carried by the slow message.
    pub amount: U256,
    /// Current state.
    pub state: FillState,
}

/// A value transfer accepted by a bridge adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransfer {
    /// Transfer id
    pub transfer_id: H256,
    /// Bridge contract
    pub bridge: Address,
    /// Account that funded the transfer
    pub sender: Address,
    /// Destination domain
    pub destination: DomainId,
    /// Recipient on the destination
    pub recipient: H256,
    /// Amount requested by the sender
    pub amount: U256,
    /// Amount that arrives on the destination
    pub delivered: U256,
    /// Native fee collected
    pub native_fee: U256,
}

/// Fee charged in the transferred token on top of the amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFee {
    /// Fee as a function of amount.
    pub curve: FeeCurve,
    /// Account credited with the fee.
    pub beneficiary: Address,
}

impl TokenFee {
    /// Fee for `amount`.
    #[must_use]
    pub fn fee(&self, amount: U256) -> U256 {
        self.curve.fee(amount)
    }
}
