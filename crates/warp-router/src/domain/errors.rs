//! # Domain Errors
//!
//! Every router operation either completes or reverts with one of these errors,
//! leaving no partial effect behind.

use primitive_types::U256;
use shared_types::{Address, CodecError, DomainId, MessageId, H256};
use thiserror::Error;

use super::value_objects::Shortfall;

/// Broad classification of a failure, used for metrics and retry decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller is not allowed to perform the operation.
    Authorization,
    /// Balance, allowance, value or custody too low.
    InsufficientResource,
    /// Router or transport not set up for the request.
    Configuration,
    /// The operation was already performed.
    DoubleProcessing,
    /// Malformed input or impossible arithmetic.
    Invalid,
}

impl ErrorCategory {
    /// Metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::InsufficientResource => "insufficient_resource",
            Self::Configuration => "configuration",
            Self::DoubleProcessing => "double_processing",
            Self::Invalid => "invalid",
        }
    }
}

/// Errors raised by the in-memory ledger backing a domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Account balance too low.
    #[error("Insufficient balance for {account:?}: required {required}, available {available}")]
    InsufficientBalance {
        /// Debited account
        account: Address,
        /// Amount requested
        required: U256,
        /// Amount held
        available: U256,
    },

    /// Spender allowance too low.
    #[error("Insufficient allowance for {spender:?} on {owner:?}: required {required}, available {available}")]
    InsufficientAllowance {
        /// Token owner
        owner: Address,
        /// Approved spender
        spender: Address,
        /// Amount requested
        required: U256,
        /// Amount approved
        available: U256,
    },

    /// Token not deployed on this domain.
    #[error("Unknown token: {0:?}")]
    UnknownToken(Address),

    /// Vault not deployed on this domain.
    #[error("Unknown vault: {0:?}")]
    UnknownVault(Address),

    /// A balance or supply would exceed 2^256 - 1.
    #[error("Arithmetic overflow")]
    Overflow,
}

/// Router error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    // =========================================================================
    // AUTHORIZATION
    // =========================================================================
    /// Caller is not the owner.
    #[error("Caller {caller:?} is not the owner")]
    NotOwner {
        /// Caller
        caller: Address,
    },

    /// Inbound handler invoked by something other than the local transport.
    #[error("Caller {caller:?} is not the mailbox")]
    NotMailbox {
        /// Caller
        caller: Address,
    },

    /// Inbound message sender is not the router enrolled for its origin.
    #[error("Untrusted sender {sender:?} from domain {origin}")]
    UntrustedSender {
        /// Origin domain
        origin: DomainId,
        /// Claimed sender
        sender: H256,
    },

    /// Caller is not an authorized rebalancer.
    #[error("Caller {caller:?} is not a rebalancer")]
    OnlyRebalancer {
        /// Caller
        caller: Address,
    },

    /// The security module rejected the message.
    #[error("Security module rejected message {0:?}")]
    IsmRejected(MessageId),

    // =========================================================================
    // CONFIGURATION
    // =========================================================================
    /// No remote router enrolled for the destination.
    #[error("No router enrolled for domain {0}")]
    UnenrolledDomain(DomainId),

    /// Bridge not allowed for the domain.
    #[error("Bridge {bridge:?} not allowed for domain {domain}")]
    BadBridge {
        /// Destination domain
        domain: DomainId,
        /// Rejected bridge
        bridge: Address,
    },

    /// Neither a rebalance recipient nor a remote router is set.
    #[error("No rebalance recipient for domain {0}")]
    RecipientNotSet(DomainId),

    /// Gas paymaster has no price data for the destination.
    #[error("No gas oracle for domain {0}")]
    NoGasOracle(DomainId),

    /// Message is addressed to another domain.
    #[error("Message for domain {got} delivered to domain {expected}")]
    WrongDestination {
        /// Local domain
        expected: DomainId,
        /// Message destination
        got: DomainId,
    },

    /// Message is addressed to another recipient.
    #[error("Message for {got:?} delivered to {expected:?}")]
    WrongRecipient {
        /// Recipient handed to the transport
        expected: H256,
        /// Message recipient
        got: H256,
    },

    // =========================================================================
    // INSUFFICIENT RESOURCE
    // =========================================================================
    /// Attached native value does not cover the required payment.
    #[error("Insufficient value: required {required}, supplied {supplied}")]
    InsufficientValue {
        /// Required value
        required: U256,
        /// Attached value
        supplied: U256,
    },

    /// Router does not hold enough of the backing asset to release.
    #[error("Insufficient custody: required {required}, available {available}")]
    InsufficientCustody {
        /// Amount to release
        required: U256,
        /// Amount held
        available: U256,
    },

    /// Rebalance cannot be funded.
    #[error("Insufficient balance for rebalance ({shortfall:?}): required {required}, available {available}")]
    InsufficientRebalanceBalance {
        /// Which part is short
        shortfall: Shortfall,
        /// Required amount
        required: U256,
        /// Available amount
        available: U256,
    },

    /// LP holder lacks shares.
    #[error("Insufficient shares for {owner:?}: required {required}, available {available}")]
    InsufficientShares {
        /// Share owner
        owner: Address,
        /// Shares required
        required: U256,
        /// Shares held
        available: U256,
    },

    /// Settlement requested with an empty balance.
    #[error("Nothing to settle for {account:?}")]
    NothingToSettle {
        /// Caller
        account: Address,
    },

    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // =========================================================================
    // DOUBLE PROCESSING
    // =========================================================================
    /// Fast intent already fronted.
    #[error("Fast transfer {0:?} already filled")]
    AlreadyFilled(H256),

    /// Fast intent already paid out by its slow-path message.
    #[error("Fast transfer {0:?} already settled")]
    IntentAlreadySettled(H256),

    /// Message already processed.
    #[error("Message {0:?} already delivered")]
    AlreadyDelivered(MessageId),

    // =========================================================================
    // INVALID
    // =========================================================================
    /// Payload could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Fast fee would consume the whole transfer.
    #[error("Fast fee {fast_fee} not below amount {amount}")]
    FastFeeExceedsAmount {
        /// Transfer amount
        amount: U256,
        /// Configured fee
        fast_fee: U256,
    },

    /// Amount cannot be represented after decimal scaling.
    #[error("Cannot convert {amount} from {from} to {to} decimals")]
    DecimalConversion {
        /// Amount
        amount: U256,
        /// Source decimals
        from: u8,
        /// Target decimals
        to: u8,
    },

    /// Share conversion overflowed or divided by zero.
    #[error("Share conversion failed")]
    ShareConversion,

    /// Deposit would mint zero shares.
    #[error("Deposit of {0} mints zero shares")]
    ZeroShares(U256),

    /// Donation with no shares outstanding.
    #[error("Cannot donate with no shares outstanding")]
    DonationWithoutShares,

    /// Address argument must not be zero.
    #[error("Zero address")]
    ZeroAddress,

    /// Caller-supplied metadata carries the fast-intent tag.
    #[error("Transfer metadata uses the reserved fast-intent tag")]
    ReservedMetadata,
}

impl RouterError {
    /// Classify the error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOwner { .. }
            | Self::NotMailbox { .. }
            | Self::UntrustedSender { .. }
            | Self::OnlyRebalancer { .. }
            | Self::IsmRejected(_) => ErrorCategory::Authorization,

            Self::UnenrolledDomain(_)
            | Self::BadBridge { .. }
            | Self::RecipientNotSet(_)
            | Self::NoGasOracle(_)
            | Self::WrongDestination { .. }
            | Self::WrongRecipient { .. } => ErrorCategory::Configuration,

            Self::InsufficientValue { .. }
            | Self::InsufficientCustody { .. }
            | Self::InsufficientRebalanceBalance { .. }
            | Self::InsufficientShares { .. }
            | Self::NothingToSettle { .. } => ErrorCategory::InsufficientResource,

            Self::Ledger(e) => match e {
                LedgerError::InsufficientBalance { .. }
                | LedgerError::InsufficientAllowance { .. } => ErrorCategory::InsufficientResource,
                LedgerError::UnknownToken(_) | LedgerError::UnknownVault(_) => {
                    ErrorCategory::Configuration
                }
                LedgerError::Overflow => ErrorCategory::Invalid,
            },

            Self::AlreadyFilled(_) | Self::IntentAlreadySettled(_) | Self::AlreadyDelivered(_) => {
                ErrorCategory::DoubleProcessing
            }

            Self::Codec(_)
            | Self::FastFeeExceedsAmount { .. }
            | Self::DecimalConversion { .. }
            | Self::ShareConversion
            | Self::ZeroShares(_)
            | Self::DonationWithoutShares
            | Self::ZeroAddress
            | Self::ReservedMetadata => ErrorCategory::Invalid,
        }
    }

    /// Whether the same call may succeed once the missing resource (custody,
    /// attached value, balance) is replenished.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::InsufficientResource
    }
}
