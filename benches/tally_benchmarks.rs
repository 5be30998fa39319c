//! Performance Benchmarks for ballot folding and disclosure
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::OsRng;
use sealvote::cipher::elgamal::DiscreteLogTable;
use sealvote::prelude::*;
use sealvote::voting::EncryptedTally;

// =============================================================================
// CIPHER BENCHMARKS
// =============================================================================

fn bench_encrypt_choice(c: &mut Criterion) {
    let keypair = KeyPair::generate();

    c.bench_function("elgamal_encrypt_choice", |b| {
        b.iter(|| ElGamalCiphertext::encrypt_choice(true, &keypair.public, &mut OsRng))
    });
}

fn bench_fold_ballot(c: &mut Criterion) {
    let keypair = KeyPair::generate();
    let tally = EncryptedTally::<ElGamalCiphertext>::new(&keypair.public).unwrap();
    let ballot = ElGamalCiphertext::encrypt_choice(true, &keypair.public, &mut OsRng);

    c.bench_function("tally_fold_ballot", |b| {
        b.iter(|| tally.fold_ballot(&ballot, &keypair.public).unwrap())
    });
}

fn bench_dlog_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("dlog_table_build");

    for max in [1_000u64, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(max), &max, |b, &max| {
            b.iter(|| DiscreteLogTable::new(max))
        });
    }

    group.finish();
}

// =============================================================================
// CORE BENCHMARKS
// =============================================================================

fn bench_submit_ballot(c: &mut Criterion) {
    let keypair = KeyPair::generate();
    let core = VotingCore::<ElGamalCiphertext>::new(keypair.public);
    let id = core.create_proposal("Bench", "submit").unwrap();
    let ballot = ElGamalCiphertext::encrypt_choice(false, &keypair.public, &mut OsRng);
    let mut counter = 0u64;

    c.bench_function("core_submit_ballot", |b| {
        b.iter(|| {
            counter += 1;
            core.submit_ballot(id, VoterId::derive(&counter.to_string()), &ballot)
                .unwrap()
        })
    });
}

fn bench_reveal(c: &mut Criterion) {
    let mut group = c.benchmark_group("core_reveal");

    for ballots in [10u64, 1_000] {
        group.throughput(Throughput::Elements(ballots));
        group.bench_with_input(BenchmarkId::from_parameter(ballots), &ballots, |b, &ballots| {
            let keypair = KeyPair::generate();
            b.iter_batched(
                || {
                    let core = VotingCore::<ElGamalCiphertext>::new(keypair.public);
                    let id = core.create_proposal("Bench", "reveal").unwrap();
                    for i in 0..ballots {
                        let ballot =
                            ElGamalCiphertext::encrypt_choice(i % 2 == 0, &keypair.public, &mut OsRng);
                        core.submit_ballot(id, VoterId::derive(&i.to_string()), &ballot)
                            .unwrap();
                    }
                    core.close_proposal(id).unwrap();
                    (core, id)
                },
                |(core, id)| {
                    core.reveal(id, &keypair.secret, Identity::derive("bench"))
                        .unwrap()
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    cipher_benches,
    bench_encrypt_choice,
    bench_fold_ballot,
    bench_dlog_table,
);

criterion_group!(core_benches, bench_submit_ballot, bench_reveal);

criterion_main!(cipher_benches, core_benches);
