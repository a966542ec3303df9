//! # Value Objects
//!
//! Small immutable types passed between routers, custody and adapters.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, DomainId, H256};

/// Execution context of an external call: who calls and how much native value
/// they attach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call {
    /// Calling account.
    pub sender: Address,
    /// Native value attached to the call.
    pub value: U256,
}

impl Call {
    /// A call with no attached value.
    #[must_use]
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            value: U256::zero(),
        }
    }

    /// Attach native value.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// An asset held on a domain: the native currency or a token contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Asset {
    /// Native currency of the domain.
    Native,
    /// Token contract at the given address.
    Token(Address),
}

/// A single line of a fee quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Asset the amount is denominated in.
    pub asset: Asset,
    /// Amount of `asset`.
    pub amount: U256,
}

impl Quote {
    /// Construct a quote line.
    #[must_use]
    pub fn new(asset: Asset, amount: U256) -> Self {
        Self { asset, amount }
    }
}

/// Remote router enrollment change. `None` unenrolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRouterConfig {
    /// Remote domain.
    pub domain: DomainId,
    /// Router identifier on that domain.
    pub router: Option<H256>,
}

/// Destination gas change. `None` clears the override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasRouterConfig {
    /// Remote domain.
    pub domain: DomainId,
    /// Gas limit for handling on that domain.
    pub gas: Option<u64>,
}

/// How a router backs the tokens it sends and receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustodyKind {
    /// Native currency held by the router.
    Native,
    /// Pre-existing token held by the router.
    Collateral,
    /// Router-owned token minted and burned.
    Synthetic,
    /// Token deposited into a yield vault.
    Vault,
    /// Custody with liquidity-provider shares on top.
    Lp,
}

impl CustodyKind {
    /// Metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Collateral => "collateral",
            Self::Synthetic => "synthetic",
            Self::Vault => "vault",
            Self::Lp => "lp",
        }
    }
}

/// Which part of a rebalance could not be funded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortfall {
    /// The collateral amount to move.
    Amount,
    /// The bridge fee on top of it.
    Fee,
}

/// Lifecycle of a fast-transfer intent on the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillState {
    /// A filler fronted the funds; the slow message repays the filler.
    Filled,
    /// The slow message arrived first and paid the recipient.
    Settled,
}

/// Arguments of an outbound transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// Destination domain.
    pub destination: DomainId,
    /// Recipient on the destination.
    pub recipient: H256,
    /// Amount in local decimals.
    pub amount: U256,
    /// Opaque metadata appended to the payload.
    pub metadata: Vec<u8>,
}

impl TransferRequest {
    /// A plain transfer with empty metadata.
    #[must_use]
    pub fn new(destination: DomainId, recipient: H256, amount: U256) -> Self {
        Self {
            destination,
            recipient,
            amount,
            metadata: Vec::new(),
        }
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = metadata;
        self
    }
}
