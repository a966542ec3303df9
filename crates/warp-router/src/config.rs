//! # Warp Route Configuration
//!
//! Deployment description of one router, read from JSON.
//!
//! ```json
//! {
//!   "localDomain": 1,
//!   "tokenType": { "type": "collateral", "token": "0x…" },
//!   "owner": "0x…",
//!   "routers": { "2": "0x…" },
//!   "decimals": 6,
//!   "remoteDecimals": 18,
//!   "destinationGas": { "2": 68000 },
//!   "rebalancers": ["0x…"],
//!   "allowedBridges": { "2": ["0x…"] }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, DomainId, H256};
use thiserror::Error;
use tracing::info;

use crate::algorithms::MAX_DECIMALS;
use crate::custody::{Custody, MovableCustody};
use crate::domain::{Call, CustodyKind, GasRouterConfig, RemoteRouterConfig, RouterError};
use crate::ports::ValueTransferBridge;
use crate::router::token_router::DEFAULT_DECIMALS;
use crate::router::{FastTokenRouter, MovableCollateralRouter, TokenRouter};

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("Invalid config JSON: {0}")]
    Parse(String),

    /// Router id is zero.
    #[error("Zero router for domain {0}")]
    ZeroRouter(DomainId),

    /// A router is enrolled for the local domain.
    #[error("Router enrolled for local domain {0}")]
    LocalDomainEnrolled(DomainId),

    /// Decimals beyond what a `U256` can scale.
    #[error("Decimals {0} exceed the maximum of 77")]
    DecimalsTooLarge(u8),

    /// Destination gas of zero.
    #[error("Zero destination gas for domain {0}")]
    ZeroGas(DomainId),

    /// Per-domain setting for a domain with no router.
    #[error("{field} set for unenrolled domain {domain}")]
    UnenrolledDomain {
        /// Offending setting
        field: &'static str,
        /// Domain
        domain: DomainId,
    },

    /// Bridge listed twice for a domain.
    #[error("Bridge {bridge:?} listed twice for domain {domain}")]
    DuplicateBridge {
        /// Domain
        domain: DomainId,
        /// Bridge
        bridge: Address,
    },

    /// Rebalance recipient is zero.
    #[error("Zero rebalance recipient for domain {0}")]
    ZeroRecipient(DomainId),

    /// Router built with a different custody than configured.
    #[error("Config describes {expected:?} custody, router has {got:?}")]
    CustodyMismatch {
        /// Configured
        expected: CustodyKind,
        /// Actual
        got: CustodyKind,
    },

    /// Bridge address that no deployed bridge answers to.
    #[error("Unknown bridge {0:?}")]
    UnknownBridge(Address),

    /// Applying the config reverted.
    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Backing of the configured router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TokenType {
    /// Native currency.
    Native,
    /// Router-minted token.
    Synthetic,
    /// Existing token.
    Collateral {
        /// Token contract
        token: Address,
    },
    /// Existing token deposited into a vault.
    Vault {
        /// Token contract
        token: Address,
        /// Vault contract
        vault: Address,
    },
    /// LP pool over native (no token) or token collateral.
    Lp {
        /// Token contract; native when absent
        #[serde(default)]
        token: Option<Address>,
    },
}

impl TokenType {
    /// Custody the token type maps to.
    #[must_use]
    pub fn kind(&self) -> CustodyKind {
        match self {
            Self::Native => CustodyKind::Native,
            Self::Synthetic => CustodyKind::Synthetic,
            Self::Collateral { .. } => CustodyKind::Collateral,
            Self::Vault { .. } => CustodyKind::Vault,
            Self::Lp { .. } => CustodyKind::Lp,
        }
    }
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

/// Deployment of one router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpRouteConfig {
    /// Domain the router is deployed on.
    pub local_domain: DomainId,
    /// Backing.
    pub token_type: TokenType,
    /// Local decimals.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Wire decimals.
    #[serde(default = "default_decimals")]
    pub remote_decimals: u8,
    /// Owner.
    pub owner: Address,
    /// Enrolled routers per domain.
    #[serde(default)]
    pub routers: BTreeMap<DomainId, H256>,
    /// Destination gas per domain.
    #[serde(default)]
    pub destination_gas: BTreeMap<DomainId, u64>,
    /// Fee fillers keep, for fast routers.
    #[serde(default)]
    pub fast_fee: Option<U256>,
    /// Rebalancers, for movable routers.
    #[serde(default)]
    pub rebalancers: Vec<Address>,
    /// Bridges per domain, for movable routers.
    #[serde(default)]
    pub allowed_bridges: BTreeMap<DomainId, Vec<Address>>,
    /// Rebalance recipients per domain, for movable routers.
    #[serde(default)]
    pub recipients: BTreeMap<DomainId, H256>,
}

impl WarpRouteConfig {
    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for decimals in [self.decimals, self.remote_decimals] {
            if decimals > MAX_DECIMALS {
                return Err(ConfigError::DecimalsTooLarge(decimals));
            }
        }

        for (domain, router) in &self.routers {
            if *domain == self.local_domain {
                return Err(ConfigError::LocalDomainEnrolled(*domain));
            }
            if router.is_zero() {
                return Err(ConfigError::ZeroRouter(*domain));
            }
        }

        for (domain, gas) in &self.destination_gas {
            self.require_enrolled("destinationGas", *domain)?;
            if *gas == 0 {
                return Err(ConfigError::ZeroGas(*domain));
            }
        }

        for (domain, bridges) in &self.allowed_bridges {
            self.require_enrolled("allowedBridges", *domain)?;
            let mut seen = BTreeSet::new();
            for bridge in bridges {
                if !seen.insert(*bridge) {
                    return Err(ConfigError::DuplicateBridge {
                        domain: *domain,
                        bridge: *bridge,
                    });
                }
            }
        }

        for (domain, recipient) in &self.recipients {
            self.require_enrolled("recipients", *domain)?;
            if recipient.is_zero() {
                return Err(ConfigError::ZeroRecipient(*domain));
            }
        }
        Ok(())
    }

    /// Set decimals, enroll routers and destination gas on a freshly built
    /// `router`. Nothing is applied if any step fails.
    ///
    /// `call` must come from the router's owner.
    pub fn apply<C: Custody>(&self, router: &mut TokenRouter<C>, call: &Call) -> Result<(), ConfigError> {
        let ledger = router.ledger().clone();
        ledger.transact(router, |router| self.apply_base(router, call))
    }

    /// Apply [`Self::apply`] plus the fast fee, when one is configured.
    pub fn apply_fast<C: Custody>(&self, fast: &mut FastTokenRouter<C>, call: &Call) -> Result<(), ConfigError> {
        let ledger = fast.ledger().clone();
        ledger.transact(fast, |fast| {
            self.apply_base(&mut **fast, call)?;
            if let Some(fast_fee) = self.fast_fee {
                fast.set_fast_fee(call, fast_fee)?;
            }
            Ok(())
        })
    }

    /// Apply [`Self::apply`] plus rebalancers, bridges and recipients.
    ///
    /// `resolve` maps a configured bridge address to a deployed bridge. Every
    /// bridge is resolved before anything is changed.
    pub fn apply_rebalancing<C, F>(
        &self,
        movable: &mut MovableCollateralRouter<C>,
        call: &Call,
        resolve: F,
    ) -> Result<(), ConfigError>
    where
        C: MovableCustody,
        F: Fn(Address) -> Option<Arc<dyn ValueTransferBridge>>,
    {
        let mut bridges = Vec::new();
        for (domain, addresses) in &self.allowed_bridges {
            for address in addresses {
                let bridge = resolve(*address).ok_or(ConfigError::UnknownBridge(*address))?;
                bridges.push((*domain, bridge));
            }
        }

        let ledger = movable.ledger().clone();
        ledger.transact(movable, |movable| {
            self.apply_base(&mut **movable, call)?;
            for rebalancer in &self.rebalancers {
                movable.add_rebalancer(call, *rebalancer)?;
            }
            for (domain, bridge) in bridges {
                movable.add_bridge(call, domain, bridge)?;
            }
            for (domain, recipient) in &self.recipients {
                movable.set_recipient(call, *domain, Some(*recipient))?;
            }
            Ok(())
        })
    }

    fn apply_base<C: Custody>(&self, router: &mut TokenRouter<C>, call: &Call) -> Result<(), ConfigError> {
        let got = router.custody().kind();
        if got != self.token_type.kind() {
            return Err(ConfigError::CustodyMismatch {
                expected: self.token_type.kind(),
                got,
            });
        }
        router.only_owner(call)?;
        router.configure_decimals(self.decimals, self.remote_decimals);
        router.enroll_remote_routers(
            call,
            self.routers
                .iter()
                .map(|(domain, router)| RemoteRouterConfig {
                    domain: *domain,
                    router: Some(*router),
                })
                .collect(),
        )?;
        router.set_destination_gas(
            call,
            self.destination_gas
                .iter()
                .map(|(domain, gas)| GasRouterConfig {
                    domain: *domain,
                    gas: Some(*gas),
                })
                .collect(),
        )?;
        info!(
            router = ?router.address(),
            domain = self.local_domain,
            routers = self.routers.len(),
            decimals = self.decimals,
            remote_decimals = self.remote_decimals,
            "Warp route config applied"
        );
        Ok(())
    }

    fn require_enrolled(&self, field: &'static str, domain: DomainId) -> Result<(), ConfigError> {
        if !self.routers.contains_key(&domain) {
            return Err(ConfigError::UnenrolledDomain { field, domain });
        }
        Ok(())
    }
}
