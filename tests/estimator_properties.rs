//! Property tests over arbitrary script bytes
//!
//! Random byte strings are valid scripts by construction (the worst
//! they can do is truncate or underflow, which are warnings), so the
//! estimator's invariants must hold for every generated input.

use proptest::prelude::*;

use script_cost::{
    CostEstimator, CostModel, EstimatorLimits, OutPoint, Transaction, TransactionInput,
    TransactionOutput,
};

fn test_tx() -> Transaction {
    Transaction {
        version: 2,
        inputs: vec![TransactionInput {
            prevout: OutPoint {
                hash: [7u8; 32],
                index: 1,
            },
            script_sig: vec![0u8; 20],
            sequence: 0xfffffffe,
        }],
        outputs: vec![
            TransactionOutput {
                value: 1_000,
                script_pubkey: vec![0u8; 25],
            },
            TransactionOutput {
                value: 2_000,
                script_pubkey: vec![0u8; 25],
            },
        ],
        lock_time: 500_000,
    }
}

/// A model covering one opcode of each formula shape, with every
/// coefficient scaled by `factor` (the global constants included).
fn scaled_model(factor: f64) -> CostModel {
    let json = format!(
        r#"{{
            "profile_id": "scaled",
            "constants": {{
                "c_dispatch": {d},
                "c_parse_per_byte": {p}
            }},
            "opcodes": {{
                "OP_DUP": {{"model": "linear", "c0": {a}, "c1": {b}, "c_alloc": {c}}},
                "OP_SWAP": {{"model": "constant", "c0": {a}}},
                "OP_CAT": {{"model": "linear", "c0": {a}, "c1": {b}, "c_alloc": {c}}},
                "OP_SHA256": {{"model": "linear", "c0": {a}, "c1": {b}}},
                "OP_HASH160": {{"model": "linear", "c0": {a}, "c1": {b}}},
                "OP_CHECKSIG": {{"model": "signature", "c_ecdsa": {e}, "c_preimage_per_byte": {b}}},
                "OP_CHECKMULTISIG": {{"model": "multisig", "c_ecdsa": {e}, "c_preimage_per_byte": {b}, "c_keyscan": {a}, "c_setup": {c}}},
                "OP_IF": {{"model": "constant", "c0": {a}}},
                "OP_ELSE": {{"model": "constant", "c0": {a}}},
                "OP_ENDIF": {{"model": "constant", "c0": {a}}},
                "OP_NOP": {{"model": "constant", "c0": {a}}}
            }}
        }}"#,
        d = 5.0 * factor,
        p = 0.8 * factor,
        a = 10.0 * factor,
        b = 0.5 * factor,
        c = 30.0 * factor,
        e = 85_000.0 * factor,
    );
    CostModel::from_json_str(&json).unwrap()
}

/// Scripts that execute without warnings: small pushes and NOPs only
fn clean_script() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![
            Just(vec![0x00]),                       // push empty
            (0u8..76).prop_map(|v| vec![0x01, v]),  // 1-byte push
            Just(vec![0x61]),                       // OP_NOP
        ],
        0..50,
    )
    .prop_map(|chunks| chunks.concat())
}

proptest! {
    /// Invariant: the breakdown categories always sum to total_cycles,
    /// warnings or not.
    #[test]
    fn breakdown_sums_to_total(script in proptest::collection::vec(any::<u8>(), 0..300)) {
        let estimator = CostEstimator::new(scaled_model(1.0));
        let estimate = estimator.estimate(&script, &[], &test_tx(), 0);
        prop_assert_eq!(estimate.breakdown.sum(), estimate.total_cycles);
    }

    /// Invariant: identical inputs produce byte-identical estimates,
    /// warning order included.
    #[test]
    fn estimation_is_deterministic(
        unlocking in proptest::collection::vec(any::<u8>(), 0..200),
        locking in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let estimator = CostEstimator::new(scaled_model(1.0));
        let tx = test_tx();
        let first = estimator.estimate(&unlocking, &locking, &tx, 0);
        let second = estimator.estimate(&unlocking, &locking, &tx, 0);
        prop_assert_eq!(first, second);
    }

    /// Invariant: a pointwise-smaller model never predicts more cycles.
    #[test]
    fn model_monotonicity(script in proptest::collection::vec(any::<u8>(), 0..300)) {
        let tx = test_tx();
        let small = CostEstimator::new(scaled_model(1.0)).estimate(&script, &[], &tx, 0);
        let large = CostEstimator::new(scaled_model(2.0)).estimate(&script, &[], &tx, 0);
        prop_assert!(small.total_cycles <= large.total_cycles);
    }

    /// Invariant: every opcode processed is counted, and at least one
    /// opcode backs every counted signature.
    #[test]
    fn opcode_count_bounds_signature_count(
        script in proptest::collection::vec(any::<u8>(), 0..300),
    ) {
        let estimator = CostEstimator::new(scaled_model(1.0));
        let estimate = estimator.estimate(&script, &[], &test_tx(), 0);
        prop_assert!(estimate.opcode_count >= estimate.signature_count);
    }

    /// Invariant: peak metrics respect the limit caps, with the single
    /// allowed overshoot on the item count (the push that trips the
    /// check is recorded).
    #[test]
    fn peaks_respect_limits(script in proptest::collection::vec(any::<u8>(), 0..300)) {
        let limits = EstimatorLimits {
            max_stack_items: 5,
            max_stack_item_size: 16,
            ..Default::default()
        };
        let estimator = CostEstimator::new(scaled_model(1.0));
        let estimate =
            estimator.estimate_with_limits(&script, &[], &test_tx(), 0, &limits);
        prop_assert!(u64::from(estimate.peak_stack_items) <= u64::from(limits.max_stack_items) + 1);
        prop_assert!(
            estimate.peak_stack_bytes
                <= limits.max_stack_item_size * u64::from(limits.max_stack_items)
        );
    }

    /// Invariant: appending a zero-effect non-push opcode to a cleanly
    /// terminating script adds exactly the parsing delta, one dispatch
    /// charge and the opcode's own cost.
    #[test]
    fn dispatch_is_additive(script in clean_script()) {
        let estimator = CostEstimator::new(scaled_model(1.0));
        let tx = test_tx();
        let base = estimator.estimate(&script, &[], &tx, 0);
        prop_assert!(base.warnings.is_empty());

        let mut extended = script.clone();
        extended.push(0x61); // OP_NOP
        let longer = estimator.estimate(&extended, &[], &tx, 0);

        let parse_delta = (0.8 * extended.len() as f64) as u64 - (0.8 * script.len() as f64) as u64;
        let nop_cost = 10; // constant c0 = 10.0 in the scaled model
        prop_assert_eq!(
            longer.total_cycles,
            base.total_cycles + parse_delta + 5 + nop_cost
        );
        prop_assert_eq!(longer.opcode_count, base.opcode_count + 1);
    }

    /// The fee surface is a plain division.
    #[test]
    fn fee_scales_with_divisor(script in proptest::collection::vec(any::<u8>(), 0..100)) {
        let estimator = CostEstimator::new(scaled_model(1.0));
        let estimate = estimator.estimate(&script, &[], &test_tx(), 0);
        let fee = estimate.to_fee(100_000);
        prop_assert!((fee * 100_000.0 - estimate.total_cycles as f64).abs() < 1e-6);
    }
}
