//! # Warp Route Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Codec | `TransferMessage` encode / decode with and without metadata |
//! | Share math | ERC-4626 conversions at full 256-bit width |
//! | End to end | lock, dispatch, relay and mint across two domains |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use primitive_types::U256;
use shared_types::{address_from_low_u64, TransferMessage};
use warp_router::adapters::{NoopHook, StaticIsm};
use warp_router::algorithms::{convert_to_assets, convert_to_shares, Rounding};
use warp_router::{
    Call, CollateralCustody, DomainLedger, LedgerMailbox, Relayer, SyntheticCustody, TokenRouter,
};

// ============================================================================
// Codec
// ============================================================================

fn bench_transfer_message_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer-message");
    let recipient = address_from_low_u64(0xBEEF);

    for metadata_len in [0usize, 32, 1024] {
        let message = TransferMessage::new(recipient, U256::MAX, vec![0xAB; metadata_len]);
        let encoded = message.encode();
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", metadata_len), &message, |b, m| {
            b.iter(|| black_box(m.encode()))
        });
        group.bench_with_input(BenchmarkId::new("decode", metadata_len), &encoded, |b, bytes| {
            b.iter(|| black_box(TransferMessage::decode(bytes).is_ok()))
        });
    }
    group.finish();
}

// ============================================================================
// Share math
// ============================================================================

fn bench_share_conversions(c: &mut Criterion) {
    let mut group = c.benchmark_group("shares");
    let supply = U256::from(10u64).pow(U256::from(30u64));
    let assets = supply + U256::from(12_345u64);
    let amount = U256::from(10u64).pow(U256::from(24u64));

    group.bench_function("to_shares_up", |b| {
        b.iter(|| black_box(convert_to_shares(amount, assets, supply, Rounding::Up)))
    });
    group.bench_function("to_assets_down", |b| {
        b.iter(|| black_box(convert_to_assets(amount, assets, supply, Rounding::Down)))
    });
    group.finish();
}

// ============================================================================
// End to end
// ============================================================================

fn bench_transfer_and_relay(c: &mut Criterion) {
    c.bench_function("collateral-to-synthetic-round", |b| {
        b.iter_batched(
            || {
                let origin = DomainLedger::new(1);
                let destination = DomainLedger::new(2);
                let mailbox = |ledger: &DomainLedger| {
                    LedgerMailbox::new(
                        ledger,
                        address_from_low_u64(200),
                        Arc::new(NoopHook::new(ledger, address_from_low_u64(201))),
                        Arc::new(StaticIsm::accept_all()),
                    )
                };
                let (origin_mailbox, destination_mailbox) = (mailbox(&origin), mailbox(&destination));
                let owner = address_from_low_u64(9);
                let router = address_from_low_u64(100);

                let token = origin.deploy_token(address_from_low_u64(50));
                let mut collateral = TokenRouter::new(
                    &origin,
                    router,
                    Arc::new(origin_mailbox.clone()),
                    CollateralCustody::new(token.clone()),
                    owner,
                );
                let mut synthetic = TokenRouter::new(
                    &destination,
                    router,
                    Arc::new(destination_mailbox.clone()),
                    SyntheticCustody::new(destination.deploy_token(address_from_low_u64(60))),
                    owner,
                );
                collateral
                    .enroll_remote_router(&Call::new(owner), 2, router)
                    .unwrap();
                synthetic
                    .enroll_remote_router(&Call::new(owner), 1, router)
                    .unwrap();

                let alice = address_from_low_u64(1);
                token.mint(alice, U256::from(1_000u64)).unwrap();
                token.approve(alice, router, U256::MAX).unwrap();
                (collateral, synthetic, origin_mailbox, destination_mailbox)
            },
            |(mut collateral, mut synthetic, origin_mailbox, destination_mailbox)| {
                let alice = address_from_low_u64(1);
                collateral
                    .transfer_remote(&Call::new(alice), 2, alice, U256::from(10u64))
                    .unwrap();
                let report = Relayer::new(address_from_low_u64(300)).relay_pending(
                    &origin_mailbox,
                    &destination_mailbox,
                    &mut synthetic,
                );
                black_box(report.delivered.len())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_transfer_message_codec,
    bench_share_conversions,
    bench_transfer_and_relay
);
criterion_main!(benches);
