//! Two-domain deployment helpers.

use std::sync::Arc;

use primitive_types::U256;
use shared_types::{address_from_low_u64, Address, DomainId};
use warp_router::adapters::{NoopHook, ProtocolFeeHook, TrustedRelayerIsm};
use warp_router::{
    Call, Custody, DomainLedger, LedgerMailbox, MessageRecipient, RelayReport, Relayer,
    TokenRouter,
};

pub const ORIGIN: DomainId = 1;
pub const DESTINATION: DomainId = 2;

/// Address every router is deployed at on its own domain.
pub const ROUTER: u64 = 100;
pub const MAILBOX: u64 = 200;
pub const HOOK: u64 = 201;
pub const RELAYER: u64 = 300;
pub const FEE_BENEFICIARY: u64 = 400;
pub const OWNER: u64 = 9;

pub fn u(n: u64) -> U256 {
    U256::from(n)
}

pub fn account(n: u64) -> Address {
    address_from_low_u64(n)
}

pub fn owner() -> Call {
    Call::new(account(OWNER))
}

pub fn relayer() -> Relayer {
    Relayer::new(account(RELAYER))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warp_router=debug")
        .with_test_writer()
        .try_init();
}

/// Ledger and mailbox of one domain.
pub struct Domain {
    pub ledger: DomainLedger,
    pub mailbox: LedgerMailbox,
}

impl Domain {
    /// Domain whose mailbox charges nothing on dispatch.
    pub fn new(id: DomainId) -> Self {
        let ledger = DomainLedger::new(id);
        let hook = Arc::new(NoopHook::new(&ledger, account(HOOK)));
        Self::with_hook(ledger, hook)
    }

    /// Domain whose mailbox charges a flat native `fee` per dispatch.
    pub fn with_protocol_fee(id: DomainId, fee: U256) -> Self {
        let ledger = DomainLedger::new(id);
        let hook = Arc::new(ProtocolFeeHook::new(
            &ledger,
            account(HOOK),
            fee,
            account(FEE_BENEFICIARY),
        ));
        Self::with_hook(ledger, hook)
    }

    fn with_hook(ledger: DomainLedger, hook: Arc<dyn warp_router::PostDispatchHook>) -> Self {
        let ism = Arc::new(TrustedRelayerIsm::new([account(RELAYER)]));
        let mailbox = LedgerMailbox::new(&ledger, account(MAILBOX), hook, ism);
        Self { ledger, mailbox }
    }

    pub fn id(&self) -> DomainId {
        self.ledger.domain()
    }

    /// Router owned by `OWNER` at the standard address.
    pub fn deploy<C: Custody>(&self, custody: C) -> TokenRouter<C> {
        self.deploy_at(ROUTER, custody)
    }

    pub fn deploy_at<C: Custody>(&self, address: u64, custody: C) -> TokenRouter<C> {
        TokenRouter::new(
            &self.ledger,
            account(address),
            Arc::new(self.mailbox.clone()),
            custody,
            account(OWNER),
        )
    }
}

/// Enroll `a` and `b` as each other's remote router.
pub fn connect<A: Custody, B: Custody>(a: &mut TokenRouter<A>, b: &mut TokenRouter<B>) {
    a.enroll_remote_router(&owner(), b.local_domain(), b.address())
        .unwrap();
    b.enroll_remote_router(&owner(), a.local_domain(), a.address())
        .unwrap();
}

/// Deliver everything pending from `origin` to `recipient` on `destination`.
pub fn relay(origin: &Domain, destination: &Domain, recipient: &mut dyn MessageRecipient) -> RelayReport {
    relayer().relay_pending(&origin.mailbox, &destination.mailbox, recipient)
}
