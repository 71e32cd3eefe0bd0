use criterion::{black_box, criterion_group, criterion_main, Criterion};

use script_cost::{
    CostEstimator, CostModel, OutPoint, Transaction, TransactionInput, TransactionOutput,
};

fn bench_estimator() -> CostEstimator {
    let model =
        CostModel::from_json_str(include_str!("../models/x86_64-generic.json")).unwrap();
    CostEstimator::new(model)
}

fn bench_tx() -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TransactionInput {
            prevout: OutPoint {
                hash: [0u8; 32],
                index: 0,
            },
            script_sig: vec![0u8; 107],
            sequence: 0xffffffff,
        }],
        outputs: vec![TransactionOutput {
            value: 50_000,
            script_pubkey: vec![0u8; 25],
        }],
        lock_time: 0,
    }
}

/// Standard pay-to-pubkey-hash spend
fn benchmark_p2pkh(c: &mut Criterion) {
    let estimator = bench_estimator();
    let tx = bench_tx();

    let mut unlocking = vec![0x47];
    unlocking.extend([0u8; 71]);
    unlocking.push(0x21);
    unlocking.extend([0u8; 33]);
    // OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
    let mut locking = vec![0x76, 0xa9, 0x14];
    locking.extend([0u8; 20]);
    locking.extend([0x88, 0xac]);

    c.bench_function("estimate_p2pkh", |b| {
        b.iter(|| {
            black_box(estimator.estimate(
                black_box(&unlocking),
                black_box(&locking),
                &tx,
                0,
            ))
        })
    });
}

/// Byte-op heavy script: repeated pushes and concatenations
fn benchmark_cat_chain(c: &mut Criterion) {
    let estimator = bench_estimator();
    let tx = bench_tx();

    let mut unlocking = vec![0x20];
    unlocking.extend([0u8; 32]);
    let mut locking = Vec::new();
    for _ in 0..200 {
        locking.push(0x20);
        locking.extend([0u8; 32]);
        locking.push(0x7e); // OP_CAT
    }

    c.bench_function("estimate_cat_chain_200", |b| {
        b.iter(|| black_box(estimator.estimate(&unlocking, black_box(&locking), &tx, 0)))
    });
}

/// Hash-loop script typical of puzzle outputs
fn benchmark_hash_loop(c: &mut Criterion) {
    let estimator = bench_estimator();
    let tx = bench_tx();

    let mut unlocking = vec![0x20];
    unlocking.extend([0u8; 32]);
    let locking = vec![0xa8; 500]; // 500 x OP_SHA256

    c.bench_function("estimate_sha256_loop_500", |b| {
        b.iter(|| black_box(estimator.estimate(&unlocking, black_box(&locking), &tx, 0)))
    });
}

/// Deeply nested branching exercises the frame machinery
fn benchmark_nested_branches(c: &mut Criterion) {
    let estimator = bench_estimator();
    let tx = bench_tx();

    let mut locking = Vec::new();
    for _ in 0..100 {
        locking.extend([0x01, 0x01, 0x63]); // push 1, OP_IF
    }
    for _ in 0..100 {
        locking.push(0x68); // OP_ENDIF
    }

    c.bench_function("estimate_nested_if_100", |b| {
        b.iter(|| black_box(estimator.estimate(&[], black_box(&locking), &tx, 0)))
    });
}

/// Megabyte-scale push-only payload: parser throughput dominates
fn benchmark_large_data_script(c: &mut Criterion) {
    let estimator = bench_estimator();
    let tx = bench_tx();

    let mut locking = Vec::new();
    for _ in 0..1_000 {
        locking.extend([0x4d, 0x00, 0x04]); // PUSHDATA2, 1024 bytes
        locking.extend(std::iter::repeat(0u8).take(1024));
    }

    c.bench_function("estimate_1mb_pushes", |b| {
        b.iter(|| black_box(estimator.estimate(&[], black_box(&locking), &tx, 0)))
    });
}

criterion_group!(
    benches,
    benchmark_p2pkh,
    benchmark_cat_chain,
    benchmark_hash_loop,
    benchmark_nested_branches,
    benchmark_large_data_script
);
criterion_main!(benches);
