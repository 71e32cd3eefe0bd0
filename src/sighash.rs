//! Sighash preimage sizing
//!
//! Signature opcodes hash a preimage assembled from parts of the
//! transaction selected by the sighash flags. The estimator never
//! hashes anything; it only needs the preimage's byte length to
//! parameterize signature cost formulas. [`sighash_preimage_size`] sums
//! those lengths and nothing else.

use serde::{Deserialize, Serialize};

use crate::types::Transaction;

/// Sighash flag byte.
///
/// Wraps the raw byte, preserving its exact value: the base type is
/// determined by masking with 0x1f (NONE=2, SINGLE=3, else ALL) and
/// ANYONECANPAY is bit 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SighashType(pub u8);

impl SighashType {
    pub const ALL: Self = SighashType(0x01);
    pub const NONE: Self = SighashType(0x02);
    pub const SINGLE: Self = SighashType(0x03);
    pub const ALL_ANYONECANPAY: Self = SighashType(0x81);
    pub const NONE_ANYONECANPAY: Self = SighashType(0x82);
    pub const SINGLE_ANYONECANPAY: Self = SighashType(0x83);

    /// Create from a raw sighash byte; any value is accepted
    pub fn from_byte(byte: u8) -> Self {
        SighashType(byte)
    }

    /// Base sighash type (lower 5 bits)
    pub fn base_type(&self) -> u8 {
        self.0 & 0x1f
    }

    /// Whether the ANYONECANPAY flag (bit 7) is set
    pub fn is_anyonecanpay(&self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Whether base type is SIGHASH_NONE
    pub fn is_none(&self) -> bool {
        self.base_type() == 0x02
    }

    /// Whether base type is SIGHASH_SINGLE
    pub fn is_single(&self) -> bool {
        self.base_type() == 0x03
    }
}

/// Per-input contribution: outpoint + 1-byte script length + script +
/// sequence
fn input_size(script_sig_len: u64) -> u64 {
    36 + 1 + script_sig_len + 4
}

/// Per-output contribution: value + 1-byte script length + script
fn output_size(script_pubkey_len: u64) -> u64 {
    8 + 1 + script_pubkey_len
}

/// Byte length of the preimage a signature opcode would hash for
/// `input_index` under `sighash_type`.
///
/// Pure and total: no hashing, no allocation, and an out-of-range
/// `input_index` contributes zero bytes for the missing element.
/// Count prefixes use the 1-byte form; scripts large enough to need
/// wider varints are noise against the preimage they would accompany.
pub fn sighash_preimage_size(
    tx: &Transaction,
    input_index: usize,
    sighash_type: SighashType,
) -> u64 {
    let mut size = 4u64; // version

    if sighash_type.is_anyonecanpay() {
        let script_sig_len = tx
            .inputs
            .get(input_index)
            .map(|input| input.script_sig.len() as u64)
            .unwrap_or(0);
        size += 1 + input_size(script_sig_len);
    } else {
        size += 1;
        for input in &tx.inputs {
            size += input_size(input.script_sig.len() as u64);
        }
    }

    if sighash_type.is_single() {
        size += 1;
        if let Some(output) = tx.outputs.get(input_index) {
            size += output_size(output.script_pubkey.len() as u64);
        }
    } else if sighash_type.is_none() {
        size += 1;
    } else {
        size += 1;
        for output in &tx.outputs {
            size += output_size(output.script_pubkey.len() as u64);
        }
    }

    size + 4 + 4 // locktime + sighash flag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OutPoint, TransactionInput, TransactionOutput};

    fn tx(input_script_lens: &[usize], output_script_lens: &[usize]) -> Transaction {
        Transaction {
            version: 1,
            inputs: input_script_lens
                .iter()
                .map(|&len| TransactionInput {
                    prevout: OutPoint {
                        hash: [0u8; 32],
                        index: 0,
                    },
                    script_sig: vec![0u8; len],
                    sequence: 0xffffffff,
                })
                .collect(),
            outputs: output_script_lens
                .iter()
                .map(|&len| TransactionOutput {
                    value: 1000,
                    script_pubkey: vec![0u8; len],
                })
                .collect(),
            lock_time: 0,
        }
    }

    #[test]
    fn test_sighash_type_masking() {
        assert!(SighashType::ALL_ANYONECANPAY.is_anyonecanpay());
        assert!(!SighashType::ALL.is_anyonecanpay());
        assert!(SighashType::SINGLE_ANYONECANPAY.is_single());
        assert!(SighashType::NONE.is_none());
        // Unusual base values behave as ALL
        let odd = SighashType::from_byte(0x1f);
        assert!(!odd.is_none() && !odd.is_single());
    }

    #[test]
    fn test_all_one_in_one_out() {
        // 4 + (1 + 41) + (1 + 9) + 4 + 4
        assert_eq!(sighash_preimage_size(&tx(&[0], &[0]), 0, SighashType::ALL), 64);
    }

    #[test]
    fn test_all_counts_every_input_and_output() {
        let t = tx(&[10, 20], &[5, 7, 9]);
        let expected = 4 + 1 + (41 + 10) + (41 + 20) + 1 + (9 + 5) + (9 + 7) + (9 + 9) + 8;
        assert_eq!(sighash_preimage_size(&t, 0, SighashType::ALL), expected);
    }

    #[test]
    fn test_anyonecanpay_only_current_input() {
        let t = tx(&[10, 20], &[0]);
        let expected = 4 + 1 + (41 + 20) + 1 + 9 + 8;
        assert_eq!(
            sighash_preimage_size(&t, 1, SighashType::ALL_ANYONECANPAY),
            expected
        );
    }

    #[test]
    fn test_none_charges_count_only() {
        let t = tx(&[0], &[50, 60]);
        assert_eq!(sighash_preimage_size(&t, 0, SighashType::NONE), 4 + 1 + 41 + 1 + 8);
    }

    #[test]
    fn test_single_matching_output() {
        let t = tx(&[0], &[50, 60]);
        let expected = 4 + 1 + 41 + 1 + (9 + 60) + 8;
        assert_eq!(sighash_preimage_size(&t, 1, SighashType::SINGLE), expected);
    }

    #[test]
    fn test_single_without_matching_output_still_counts() {
        let t = tx(&[0, 0, 0], &[50]);
        let expected = 4 + 1 + 3 * 41 + 1 + 8;
        assert_eq!(sighash_preimage_size(&t, 2, SighashType::SINGLE), expected);
    }

    #[test]
    fn test_out_of_range_input_index() {
        let t = tx(&[10], &[5]);
        // ANYONECANPAY with a missing input treats its script as empty
        let expected = 4 + 1 + 41 + 1 + (9 + 5) + 8;
        assert_eq!(
            sighash_preimage_size(&t, 9, SighashType::ALL_ANYONECANPAY),
            expected
        );
    }

    #[test]
    fn test_deterministic() {
        let t = tx(&[10, 20], &[30]);
        let first = sighash_preimage_size(&t, 0, SighashType::ALL);
        assert_eq!(first, sighash_preimage_size(&t, 0, SighashType::ALL));
    }
}
