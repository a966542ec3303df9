//! # Transfer Flows
//!
//! Value leaving one domain and arriving on another:
//!
//! 1. **Lock/mint round trip**: collateral escrowed on the origin always equals
//!    the synthetic supply on the destination once messages are delivered.
//! 2. **Native with a dispatch fee**: attached value covers amount plus fee.
//! 3. **Retry**: a message that finds no custody stays pending and succeeds
//!    once liquidity arrives.
//! 4. **Ordering and replay**: any delivery order works; no message lands twice.
//! 5. **Authentication**: unenrolled routers and untrusted relayers are refused.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use primitive_types::U256;
    use shared_types::DomainId;
    use warp_router::adapters::TrustedRelayerIsm;
    use warp_router::domain::{Asset, Quote};
    use warp_router::{
        Call, CollateralCustody, ConfigError, DomainEvent, NativeCustody, RouterError,
        SyntheticCustody, WarpRouteConfig, Relayer,
    };

    use crate::integration::harness::{
        account, connect, init_tracing, owner, relay, u, Domain, DESTINATION, FEE_BENEFICIARY,
        ORIGIN, ROUTER,
    };

    fn wei(n: u64) -> U256 {
        U256::from(n)
    }

    // =============================================================================
    // LOCK / MINT
    // =============================================================================

    #[test]
    fn test_collateral_round_trip_conserves_supply() {
        init_tracing();
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut collateral = origin.deploy(CollateralCustody::new(token.clone()));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut collateral, &mut synthetic);

        let (alice, bob) = (account(1), account(2));
        token.mint(alice, u(1_000)).unwrap();
        token.approve(alice, collateral.address(), U256::MAX).unwrap();

        collateral
            .transfer_remote(&Call::new(alice), DESTINATION, bob, u(400))
            .unwrap();
        assert_eq!(token.balance_of(collateral.address()), u(400));
        assert!(wrapped.total_supply().is_zero(), "nothing minted before delivery");

        let report = relay(&origin, &destination, &mut synthetic);
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(wrapped.balance_of(bob), u(400));
        assert!(destination
            .ledger
            .events_of(synthetic.address())
            .contains(&DomainEvent::ReceivedTransferRemote {
                origin: ORIGIN,
                recipient: bob,
                amount: u(400),
            }));

        synthetic
            .transfer_remote(&Call::new(bob), ORIGIN, alice, u(150))
            .unwrap();
        let report = relay(&destination, &origin, &mut collateral);
        assert_eq!(report.delivered.len(), 1);

        assert_eq!(token.balance_of(alice), u(750));
        assert_eq!(wrapped.balance_of(bob), u(250));
        assert_eq!(token.balance_of(collateral.address()), wrapped.total_supply());
    }

    #[test]
    fn test_native_transfer_pays_dispatch_fee() {
        let fee = wei(5_000_000_000_000_000);
        let amount = wei(1_000_000_000_000_000_000);
        let origin = Domain::with_protocol_fee(ORIGIN, fee);
        let destination = Domain::new(DESTINATION);
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut native = origin.deploy(NativeCustody::new(&origin.ledger));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut native, &mut synthetic);

        let (alice, bob) = (account(1), account(2));
        let gas_token = origin.ledger.native();
        gas_token.mint(alice, amount * 2).unwrap();

        let quote = native.quote_transfer_remote(DESTINATION, bob, amount).unwrap();
        assert_eq!(
            quote,
            vec![Quote::new(Asset::Native, fee), Quote::new(Asset::Native, amount)]
        );
        let value = quote.iter().fold(U256::zero(), |total, line| total + line.amount);
        assert_eq!(value, wei(1_005_000_000_000_000_000));

        // one wei short of the fee reverts everything
        let result = native.transfer_remote(
            &Call::new(alice).with_value(value - U256::one()),
            DESTINATION,
            bob,
            amount,
        );
        assert!(matches!(result, Err(RouterError::InsufficientValue { .. })));
        assert_eq!(gas_token.balance_of(alice), amount * 2);
        assert_eq!(origin.mailbox.nonce(), 0);

        native
            .transfer_remote(&Call::new(alice).with_value(value), DESTINATION, bob, amount)
            .unwrap();
        assert_eq!(gas_token.balance_of(alice), amount * 2 - value);
        assert_eq!(native.reserves(), amount);
        assert_eq!(gas_token.balance_of(account(FEE_BENEFICIARY)), fee);

        relay(&origin, &destination, &mut synthetic);
        assert_eq!(wrapped.balance_of(bob), amount);
    }

    #[test]
    fn test_decimal_scaling_between_domains() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut collateral = origin
            .deploy(CollateralCustody::new(token.clone()))
            .with_decimals(6, 18);
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut collateral, &mut synthetic);

        let (alice, bob) = (account(1), account(2));
        token.mint(alice, u(1_500_000)).unwrap();
        token.approve(alice, collateral.address(), U256::MAX).unwrap();
        collateral
            .transfer_remote(&Call::new(alice), DESTINATION, bob, u(1_500_000))
            .unwrap();
        relay(&origin, &destination, &mut synthetic);
        assert_eq!(wrapped.balance_of(bob), wei(1_500_000_000_000_000_000));

        synthetic
            .transfer_remote(&Call::new(bob), ORIGIN, alice, wei(500_000_000_000_000_000))
            .unwrap();
        relay(&destination, &origin, &mut collateral);
        assert_eq!(token.balance_of(alice), u(500_000));
    }

    // =============================================================================
    // RETRY
    // =============================================================================

    #[test]
    fn test_delivery_retries_after_liquidity_arrives() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let wrapped = origin.ledger.deploy_token(account(60));
        let token = destination.ledger.deploy_token(account(50));
        let mut synthetic = origin.deploy(SyntheticCustody::new(wrapped.clone()));
        let mut collateral = destination.deploy(CollateralCustody::new(token.clone()));
        connect(&mut synthetic, &mut collateral);

        let (alice, bob) = (account(1), account(2));
        wrapped.mint(alice, u(100)).unwrap();
        synthetic
            .transfer_remote(&Call::new(alice), DESTINATION, bob, u(100))
            .unwrap();

        let report = relay(&origin, &destination, &mut collateral);
        assert!(report.delivered.is_empty());
        let (_, error) = &report.failed[0];
        assert_eq!(
            error,
            &RouterError::InsufficientCustody {
                required: u(100),
                available: U256::zero()
            }
        );
        assert!(error.is_retryable());
        assert_eq!(
            Relayer::pending(&origin.mailbox, &destination.mailbox, collateral.address()).len(),
            1
        );

        token.mint(collateral.address(), u(100)).unwrap();
        let report = relay(&origin, &destination, &mut collateral);
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(token.balance_of(bob), u(100));

        let report = relay(&origin, &destination, &mut collateral);
        assert!(report.delivered.is_empty() && report.failed.is_empty());
    }

    // =============================================================================
    // ORDERING AND REPLAY
    // =============================================================================

    #[test]
    fn test_out_of_order_delivery_and_replay() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut collateral = origin.deploy(CollateralCustody::new(token.clone()));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut collateral, &mut synthetic);

        let alice = account(1);
        token.mint(alice, u(100)).unwrap();
        token.approve(alice, collateral.address(), U256::MAX).unwrap();
        let recipients = [account(2), account(3), account(4)];
        for (i, recipient) in recipients.iter().enumerate() {
            collateral
                .transfer_remote(&Call::new(alice), DESTINATION, *recipient, u(10 * (i as u64 + 1)))
                .unwrap();
        }

        let relayer = crate::integration::harness::relayer();
        let pending = Relayer::pending(&origin.mailbox, &destination.mailbox, synthetic.address());
        assert_eq!(pending.len(), 3);
        for message in pending.iter().rev() {
            relayer
                .deliver(&destination.mailbox, message, &mut synthetic)
                .unwrap();
        }
        assert_eq!(wrapped.balance_of(recipients[0]), u(10));
        assert_eq!(wrapped.balance_of(recipients[2]), u(30));

        assert_eq!(
            relayer.deliver(&destination.mailbox, &pending[0], &mut synthetic),
            Err(RouterError::AlreadyDelivered(pending[0].id()))
        );
        assert_eq!(wrapped.total_supply(), u(60));
        assert_eq!(token.balance_of(collateral.address()), u(60));
    }

    // =============================================================================
    // AUTHENTICATION
    // =============================================================================

    #[test]
    fn test_unenrolled_router_cannot_mint() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));

        // A router the destination never enrolled, pointed at the real one.
        let junk = origin.ledger.deploy_token(account(66));
        let mut rogue = origin.deploy_at(666, SyntheticCustody::new(junk.clone()));
        rogue
            .enroll_remote_router(&owner(), DESTINATION, synthetic.address())
            .unwrap();
        let mallory = account(13);
        junk.mint(mallory, u(1_000)).unwrap();
        rogue
            .transfer_remote(&Call::new(mallory), DESTINATION, mallory, u(1_000))
            .unwrap();

        let report = relay(&origin, &destination, &mut synthetic);
        let (_, error) = &report.failed[0];
        assert_eq!(
            error,
            &RouterError::UntrustedSender {
                origin: ORIGIN,
                sender: account(666)
            }
        );
        assert!(!error.is_retryable());
        assert!(wrapped.total_supply().is_zero());
    }

    #[test]
    fn test_untrusted_relayer_rejected() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut collateral = origin.deploy(CollateralCustody::new(token.clone()));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut collateral, &mut synthetic);

        let alice = account(1);
        token.mint(alice, u(5)).unwrap();
        token.approve(alice, collateral.address(), U256::MAX).unwrap();
        let id = collateral
            .transfer_remote(&Call::new(alice), DESTINATION, alice, u(5))
            .unwrap();

        let report =
            Relayer::new(account(301)).relay_pending(&origin.mailbox, &destination.mailbox, &mut synthetic);
        assert_eq!(report.failed[0].1, RouterError::IsmRejected(id));
        assert!(wrapped.total_supply().is_zero());

        assert_eq!(relay(&origin, &destination, &mut synthetic).delivered, vec![id]);
    }

    #[test]
    fn test_router_security_module_overrides_default() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut collateral = origin.deploy(CollateralCustody::new(token.clone()));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut collateral, &mut synthetic);
        synthetic
            .set_interchain_security_module(&owner(), Some(Arc::new(TrustedRelayerIsm::new([account(301)]))))
            .unwrap();

        let alice = account(1);
        token.mint(alice, u(5)).unwrap();
        token.approve(alice, collateral.address(), U256::MAX).unwrap();
        let id = collateral
            .transfer_remote(&Call::new(alice), DESTINATION, alice, u(5))
            .unwrap();

        // the mailbox default trusts the standard relayer, the router does not
        let report = relay(&origin, &destination, &mut synthetic);
        assert_eq!(report.failed[0].1, RouterError::IsmRejected(id));
        assert!(wrapped.total_supply().is_zero());

        let report =
            Relayer::new(account(301)).relay_pending(&origin.mailbox, &destination.mailbox, &mut synthetic);
        assert_eq!(report.delivered, vec![id]);
        assert_eq!(wrapped.balance_of(alice), u(5));
    }

    // =============================================================================
    // CONFIGURATION AND TELEMETRY
    // =============================================================================

    fn route_config(local: DomainId, remote: DomainId, token_type: &str) -> String {
        format!(
            r#"{{
                "localDomain": {local},
                "tokenType": {token_type},
                "owner": "{owner:?}",
                "routers": {{ "{remote}": "{router:?}" }},
                "destinationGas": {{ "{remote}": 68000 }}
            }}"#,
            owner = account(crate::integration::harness::OWNER),
            router = account(ROUTER),
        )
    }

    #[test]
    fn test_config_driven_deployment() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let wrapped = destination.ledger.deploy_token(account(60));

        let mut collateral_config = WarpRouteConfig::from_json(&route_config(
            ORIGIN,
            DESTINATION,
            &format!(r#"{{ "type": "collateral", "token": "{:?}" }}"#, account(50)),
        ))
        .unwrap();
        collateral_config.decimals = 6;
        let synthetic_config =
            WarpRouteConfig::from_json(&route_config(DESTINATION, ORIGIN, r#"{ "type": "synthetic" }"#))
                .unwrap();

        let mut collateral = origin.deploy(CollateralCustody::new(token.clone()));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        collateral_config.apply(&mut collateral, &owner()).unwrap();
        synthetic_config.apply(&mut synthetic, &owner()).unwrap();
        assert_eq!(collateral.destination_gas(DESTINATION), Some(68_000));
        assert_eq!((collateral.decimals(), collateral.remote_decimals()), (6, 18));

        // applying a config to the wrong custody is refused
        let mut mismatched = destination.deploy_at(101, SyntheticCustody::new(wrapped.clone()));
        assert!(matches!(
            collateral_config.apply(&mut mismatched, &owner()),
            Err(ConfigError::CustodyMismatch { .. })
        ));

        let alice = account(1);
        token.mint(alice, u(42)).unwrap();
        token.approve(alice, collateral.address(), U256::MAX).unwrap();
        collateral
            .transfer_remote(&Call::new(alice), DESTINATION, alice, u(42))
            .unwrap();
        relay(&origin, &destination, &mut synthetic);
        assert_eq!(wrapped.balance_of(alice), u(42_000_000_000_000));
    }

    #[test]
    fn test_metrics_exported_after_transfers() {
        let _ = warp_telemetry::register_metrics();
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut collateral = origin.deploy(CollateralCustody::new(token.clone()));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped));
        connect(&mut collateral, &mut synthetic);

        let alice = account(1);
        // no allowance: reverts and is counted
        assert!(collateral
            .transfer_remote(&Call::new(alice), DESTINATION, alice, u(1))
            .is_err());
        token.mint(alice, u(1)).unwrap();
        token.approve(alice, collateral.address(), U256::MAX).unwrap();
        collateral
            .transfer_remote(&Call::new(alice), DESTINATION, alice, u(1))
            .unwrap();
        relay(&origin, &destination, &mut synthetic);

        let text = warp_telemetry::encode_metrics().unwrap();
        assert!(text.contains("warp_router_transfers_sent_total"));
        assert!(text.contains("warp_router_transfers_received_total"));
        assert!(text.contains("warp_router_errors_total"));
        assert!(text.contains("warp_transport_messages_processed_total"));
    }
}
