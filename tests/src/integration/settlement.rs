//! # Settlement Flows
//!
//! Custody that earns, pools or moves between domains, and transfers that
//! fillers front before the message lands.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use primitive_types::U256;
    use warp_router::adapters::BridgeFeeModel;
    use warp_router::domain::{FillState, Shortfall};
    use warp_router::{
        Call, CollateralCustody, FastTokenRouter, LedgerBridge, LedgerVault, LpCustody,
        MovableCollateralRouter, RouterError, SyntheticCustody, TransferRequest, VaultCustody,
    };

    use crate::integration::harness::{
        account, connect, owner, relay, u, Domain, DESTINATION, OWNER, ORIGIN,
    };

    // =============================================================================
    // VAULT
    // =============================================================================

    #[test]
    fn test_vault_yield_swept_without_touching_user_funds() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let vault = LedgerVault::deploy(&origin.ledger, account(55), account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut router = origin.deploy(VaultCustody::new(token.clone(), Arc::new(vault.clone())));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut router, &mut synthetic);

        let (alice, bob) = (account(1), account(2));
        for holder in [alice, bob] {
            token.mint(holder, u(100)).unwrap();
            token.approve(holder, router.address(), U256::MAX).unwrap();
            router
                .transfer_remote(&Call::new(holder), DESTINATION, holder, u(100))
                .unwrap();
        }
        relay(&origin, &destination, &mut synthetic);
        assert_eq!(router.custody().asset_deposited(), u(200));

        // 200 shares now worth 300; users stay owed 200
        vault.accrue_yield(u(100)).unwrap();
        let swept = router.sweep(&owner()).unwrap();
        assert_eq!(swept.shares, u(66));
        assert_eq!(swept.assets, u(99));
        assert_eq!(token.balance_of(account(OWNER)), u(99));
        assert_eq!(router.reserves(), u(200));

        for holder in [alice, bob] {
            synthetic
                .transfer_remote(&Call::new(holder), ORIGIN, holder, u(100))
                .unwrap();
        }
        let report = relay(&destination, &origin, &mut router);
        assert_eq!(report.delivered.len(), 2);
        assert_eq!(token.balance_of(alice), u(100));
        assert_eq!(token.balance_of(bob), u(100));
        assert!(router.custody().asset_deposited().is_zero());
    }

    #[test]
    fn test_vault_loss_blocks_release_until_recovered() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let vault = LedgerVault::deploy(&origin.ledger, account(55), account(50));
        let wrapped = destination.ledger.deploy_token(account(60));
        let mut router = origin.deploy(VaultCustody::new(token.clone(), Arc::new(vault.clone())));
        let mut synthetic = destination.deploy(SyntheticCustody::new(wrapped.clone()));
        connect(&mut router, &mut synthetic);

        let alice = account(1);
        token.mint(alice, u(100)).unwrap();
        token.approve(alice, router.address(), U256::MAX).unwrap();
        router
            .transfer_remote(&Call::new(alice), DESTINATION, alice, u(100))
            .unwrap();
        relay(&origin, &destination, &mut synthetic);

        vault.realize_loss(u(10)).unwrap();
        assert_eq!(router.sweep(&owner()).unwrap().shares, U256::zero());
        synthetic
            .transfer_remote(&Call::new(alice), ORIGIN, alice, u(100))
            .unwrap();
        let report = relay(&destination, &origin, &mut router);
        assert!(matches!(
            report.failed[0].1,
            RouterError::InsufficientCustody { .. }
        ));

        vault.accrue_yield(u(10)).unwrap();
        let report = relay(&destination, &origin, &mut router);
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(token.balance_of(alice), u(100));
    }

    // =============================================================================
    // LP POOL
    // =============================================================================

    #[test]
    fn test_donation_shared_pro_rata_and_pool_serves_transfers() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let wrapped = origin.ledger.deploy_token(account(60));
        let token = destination.ledger.deploy_token(account(50));
        let mut synthetic = origin.deploy(SyntheticCustody::new(wrapped.clone()));
        let mut pool = destination.deploy(LpCustody::new(CollateralCustody::new(token.clone())));
        connect(&mut synthetic, &mut pool);

        let (big, small, donor) = (account(21), account(22), account(23));
        for (holder, amount) in [(big, 300), (small, 100), (donor, 40)] {
            token.mint(holder, u(amount)).unwrap();
            token.approve(holder, pool.address(), U256::MAX).unwrap();
        }
        assert_eq!(pool.deposit(&Call::new(big), u(300), big).unwrap(), u(300));
        assert_eq!(pool.deposit(&Call::new(small), u(100), small).unwrap(), u(100));
        pool.donate(&Call::new(donor), u(40)).unwrap();

        assert_eq!(pool.custody().max_withdraw(big), u(330));
        assert_eq!(pool.custody().max_withdraw(small), u(110));

        let (alice, bob) = (account(1), account(2));
        wrapped.mint(alice, u(200)).unwrap();
        synthetic
            .transfer_remote(&Call::new(alice), DESTINATION, bob, u(200))
            .unwrap();
        relay(&origin, &destination, &mut pool);
        assert_eq!(token.balance_of(bob), u(200));
        assert_eq!(pool.reserves(), u(240));

        pool.withdraw(&Call::new(small), u(110), small, small).unwrap();
        assert_eq!(token.balance_of(small), u(110));
        assert!(pool.custody().balance_of(small).is_zero());
    }

    // =============================================================================
    // REBALANCING
    // =============================================================================

    #[test]
    fn test_rebalance_moves_collateral_to_starved_domain() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let token = origin.ledger.deploy_token(account(50));
        let remote_token = destination.ledger.deploy_token(account(50));
        let mut source = MovableCollateralRouter::new(origin.deploy(CollateralCustody::new(token.clone())));
        let mut starved = destination.deploy(CollateralCustody::new(remote_token.clone()));
        connect(&mut *source, &mut starved);

        let (alice, carol, bob, dave) = (account(1), account(3), account(2), account(4));
        for (holder, recipient, amount) in [(alice, bob, 300), (carol, dave, 100)] {
            token.mint(holder, u(amount)).unwrap();
            token.approve(holder, source.address(), U256::MAX).unwrap();
            source
                .transfer_remote(&Call::new(holder), DESTINATION, recipient, u(amount))
                .unwrap();
        }
        let report = relay(&origin, &destination, &mut starved);
        assert_eq!(report.failed.len(), 2);

        let bridge = LedgerBridge::new(&origin.ledger, account(90), token.asset())
            .with_token_fee(u(2), BridgeFeeModel::Additive)
            .with_native_fee(u(1));
        let rebalancer = account(8);
        source.add_rebalancer(&owner(), rebalancer).unwrap();
        source
            .add_bridge(&owner(), DESTINATION, Arc::new(bridge))
            .unwrap();

        assert_eq!(
            source.rebalance(&Call::new(alice), DESTINATION, u(300), account(90)),
            Err(RouterError::OnlyRebalancer { caller: alice })
        );
        assert!(matches!(
            source.rebalance(&Call::new(rebalancer), DESTINATION, u(300), account(91)),
            Err(RouterError::BadBridge { .. })
        ));
        assert!(matches!(
            source.rebalance(&Call::new(rebalancer), DESTINATION, u(300), account(90)),
            Err(RouterError::InsufficientRebalanceBalance {
                shortfall: Shortfall::Fee,
                ..
            })
        ));

        origin.ledger.native().mint(rebalancer, u(5)).unwrap();
        source
            .rebalance(&Call::new(rebalancer).with_value(u(5)), DESTINATION, u(300), account(90))
            .unwrap();
        assert_eq!(origin.ledger.native().balance_of(rebalancer), u(4));
        assert_eq!(token.balance_of(source.address()), u(98));

        let transfer = origin.ledger.bridge_transfers()[0].clone();
        assert_eq!(transfer.recipient, starved.address());
        LedgerBridge::deliver_on(&remote_token, &transfer).unwrap();

        // oldest first: bob is paid, dave waits for more liquidity
        let report = relay(&origin, &destination, &mut starved);
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(remote_token.balance_of(bob), u(300));
        assert!(remote_token.balance_of(dave).is_zero());
    }

    // =============================================================================
    // FAST TRANSFERS
    // =============================================================================

    fn fast_pair(
        origin: &Domain,
        destination: &Domain,
        fast_fee: U256,
    ) -> (
        FastTokenRouter<SyntheticCustody>,
        FastTokenRouter<CollateralCustody>,
    ) {
        let wrapped = origin.ledger.deploy_token(account(60));
        let token = destination.ledger.deploy_token(account(50));
        let mut source = FastTokenRouter::new(origin.deploy(SyntheticCustody::new(wrapped)), fast_fee);
        let mut sink = FastTokenRouter::new(destination.deploy(CollateralCustody::new(token)), fast_fee);
        connect(&mut *source, &mut *sink);
        (source, sink)
    }

    #[test]
    fn test_fast_transfer_pays_once_and_repays_filler() {
        let fee = U256::from(5_000_000_000_000_000u64);
        let amount = U256::from(1_000_000_000_000_000_000u64);
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let (mut source, mut sink) = fast_pair(&origin, &destination, fee);
        let wrapped = source.token();
        let token = sink.token();

        let (alice, bob, filler, latecomer) = (account(1), account(2), account(30), account(31));
        wrapped.mint(alice, amount).unwrap();
        token.mint(sink.address(), amount).unwrap();
        token.mint(filler, amount - fee).unwrap();
        token.mint(latecomer, amount).unwrap();

        let (_, nonce) = source
            .fast_transfer_remote(&Call::new(alice), DESTINATION, bob, amount)
            .unwrap();
        let key = sink
            .fill_fast_transfer(&Call::new(filler), bob, amount, ORIGIN, nonce)
            .unwrap();
        assert_eq!(token.balance_of(bob), amount - fee);
        assert!(token.balance_of(filler).is_zero());
        assert_eq!(
            sink.fill_fast_transfer(&Call::new(latecomer), bob, amount, ORIGIN, nonce),
            Err(RouterError::AlreadyFilled(key))
        );

        let report = relay(&origin, &destination, &mut sink);
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(token.balance_of(filler), amount);
        assert_eq!(token.balance_of(bob), amount - fee);
        assert_eq!(sink.fill_record(&key).map(|r| r.state), Some(FillState::Settled));
        assert_eq!(
            sink.fill_fast_transfer(&Call::new(latecomer), bob, amount, ORIGIN, nonce),
            Err(RouterError::IntentAlreadySettled(key))
        );
        assert_eq!(token.balance_of(latecomer), amount);

        // the filler takes the repayment home
        token.approve(filler, sink.address(), U256::MAX).unwrap();
        sink.transfer_remote_settle(&Call::new(filler), ORIGIN, filler, amount)
            .unwrap();
        relay(&destination, &origin, &mut source);
        assert_eq!(wrapped.balance_of(filler), amount);
        assert_eq!(sink.reserves(), amount);
    }

    #[test]
    fn test_unfilled_fast_transfer_pays_recipient_in_full() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let (mut source, mut sink) = fast_pair(&origin, &destination, u(5));
        let wrapped = source.token();
        let token = sink.token();

        let (alice, bob, filler) = (account(1), account(2), account(30));
        wrapped.mint(alice, u(100)).unwrap();
        token.mint(sink.address(), u(100)).unwrap();
        token.mint(filler, u(100)).unwrap();

        let (_, nonce) = source
            .fast_transfer_remote(&Call::new(alice), DESTINATION, bob, u(100))
            .unwrap();
        relay(&origin, &destination, &mut sink);
        assert_eq!(token.balance_of(bob), u(100));

        let key = FastTokenRouter::<CollateralCustody>::fill_key(ORIGIN, nonce, bob, u(100));
        assert_eq!(
            sink.fill_fast_transfer(&Call::new(filler), bob, u(100), ORIGIN, nonce),
            Err(RouterError::IntentAlreadySettled(key))
        );
        assert_eq!(token.balance_of(filler), u(100));
    }

    #[test]
    fn test_plain_transfers_with_memos_reach_fast_router() {
        let origin = Domain::new(ORIGIN);
        let destination = Domain::new(DESTINATION);
        let (mut source, mut sink) = fast_pair(&origin, &destination, u(5));
        let wrapped = source.token();
        let token = sink.token();

        let (alice, bob) = (account(1), account(2));
        wrapped.mint(alice, u(300)).unwrap();
        token.mint(sink.address(), u(300)).unwrap();

        let memos = [vec![1, 2, 3], vec![7u8; 32], vec![7u8; 32]];
        for memo in memos {
            let request = TransferRequest::new(DESTINATION, bob, u(100)).with_metadata(memo);
            source
                .transfer_remote_with_hook(&Call::new(alice), request, None)
                .unwrap();
        }

        let report = relay(&origin, &destination, &mut sink);
        assert_eq!(report.delivered.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(token.balance_of(bob), u(300));
        assert!(wrapped.total_supply().is_zero());
    }
}
