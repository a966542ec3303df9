//! # Outbound Ports
//!
//! Collaborators a router calls into: the local transport, its hooks and
//! security modules, yield vaults and value-transfer bridges.

use std::fmt;
use std::sync::Arc;

use primitive_types::U256;
use shared_types::{Address, DispatchedMessage, DomainId, MessageId, H256};

use crate::domain::{Quote, RouterError};

/// Parameters a post-dispatch hook sees besides the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookMetadata {
    /// Gas the destination should budget for handling, if set.
    pub gas_limit: Option<u64>,
    /// Account refunded with unspent value.
    pub refund_address: Address,
}

/// Post-dispatch hook (gas payment, protocol fee).
pub trait PostDispatchHook: Send + Sync + fmt::Debug {
    /// Hook contract.
    fn address(&self) -> Address;

    /// Native value the hook will charge for `message`.
    fn quote_dispatch(
        &self,
        metadata: &HookMetadata,
        message: &DispatchedMessage,
    ) -> Result<U256, RouterError>;

    /// Charge for `message`, taking `value` from `payer` and refunding the rest.
    fn post_dispatch(
        &self,
        metadata: &HookMetadata,
        message: &DispatchedMessage,
        payer: Address,
        value: U256,
    ) -> Result<(), RouterError>;
}

/// Inbound message verification.
pub trait InterchainSecurityModule: Send + Sync + fmt::Debug {
    /// Whether `message` relayed by `relayer` with `metadata` may be processed.
    fn verify(&self, relayer: Address, metadata: &[u8], message: &DispatchedMessage) -> bool;
}

/// Arguments of a dispatch.
#[derive(Clone, Debug)]
pub struct DispatchParams {
    /// Destination domain
    pub destination: DomainId,
    /// Recipient contract on the destination
    pub recipient: H256,
    /// Router payload
    pub body: Vec<u8>,
    /// Native value paid to the hook
    pub value: U256,
    /// Hook parameters
    pub metadata: HookMetadata,
    /// Hook replacing the mailbox default
    pub hook: Option<Arc<dyn PostDispatchHook>>,
}

/// Local message transport.
pub trait Mailbox: Send + Sync + fmt::Debug {
    /// Mailbox contract; the only caller allowed into inbound handlers.
    fn address(&self) -> Address;

    /// Domain this mailbox serves.
    fn local_domain(&self) -> DomainId;

    /// Native value required to dispatch with `params`.
    fn quote_dispatch(&self, sender: Address, params: &DispatchParams) -> Result<U256, RouterError>;

    /// Accept a message for delivery, paying the hook from `sender`.
    fn dispatch(&self, sender: Address, params: DispatchParams) -> Result<MessageId, RouterError>;
}

/// Tokenized yield vault (ERC-4626 semantics).
pub trait Erc4626Vault: Send + Sync + fmt::Debug {
    /// Vault contract.
    fn address(&self) -> Address;

    /// Underlying asset token.
    fn asset(&self) -> Address;

    /// Assets under management.
    fn total_assets(&self) -> U256;

    /// Shares outstanding.
    fn total_supply(&self) -> U256;

    /// Shares held by `owner`.
    fn balance_of(&self, owner: Address) -> U256;

    /// Shares for `assets`, rounding down.
    fn convert_to_shares(&self, assets: U256) -> Result<U256, RouterError>;

    /// Assets for `shares`, rounding down.
    fn convert_to_assets(&self, shares: U256) -> Result<U256, RouterError>;

    /// Shares burned to withdraw exactly `assets`, rounding up.
    fn preview_withdraw(&self, assets: U256) -> Result<U256, RouterError>;

    /// Assets `owner` can withdraw.
    fn max_withdraw(&self, owner: Address) -> U256;

    /// Shares `owner` can redeem.
    fn max_redeem(&self, owner: Address) -> U256;

    /// Deposit `assets` from `caller`, minting shares to `receiver`.
    fn deposit(&self, caller: Address, assets: U256, receiver: Address) -> Result<U256, RouterError>;

    /// Withdraw exactly `assets` to `receiver`, burning shares of `owner`.
    fn withdraw(
        &self,
        caller: Address,
        assets: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError>;

    /// Burn exactly `shares` of `owner`, paying assets to `receiver`.
    fn redeem(
        &self,
        caller: Address,
        shares: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<U256, RouterError>;
}

/// Third-party bridge able to move collateral to another domain.
pub trait ValueTransferBridge: Send + Sync + fmt::Debug {
    /// Bridge contract.
    fn address(&self) -> Address;

    /// Everything the caller must provide to move `amount`.
    ///
    /// Native entries are paid as attached value; token entries are pulled
    /// through an allowance.
    fn quote_transfer_remote(&self, destination: DomainId, recipient: H256, amount: U256)
        -> Vec<Quote>;

    /// Move `amount` to `recipient` on `destination`, returning a transfer id.
    fn transfer_remote(
        &self,
        caller: Address,
        value: U256,
        destination: DomainId,
        recipient: H256,
        amount: U256,
    ) -> Result<H256, RouterError>;
}
