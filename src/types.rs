//! Transaction types consumed by the estimator
//!
//! These are deliberately plain data: the estimator borrows a
//! transaction to size sighash preimages and never mutates it.

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type (scripts, payloads)
pub type ByteString = Vec<u8>;

/// Reference to a previous transaction output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// Transaction input: prevout reference, unlocking script, sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

/// Transaction output: value in base units plus locking script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: u64,
    pub script_pubkey: ByteString,
}

/// Transaction: version, inputs, outputs, locktime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

/// Serialized size of a varint-encoded length prefix
#[inline]
pub fn varint_size(value: u64) -> u64 {
    if value < 0xfd {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffffffff {
        5
    } else {
        9
    }
}

impl Transaction {
    /// Canonical wire size of this transaction in bytes.
    ///
    /// Sums field widths and varint-prefixed script lengths without
    /// serializing anything.
    pub fn serialized_size(&self) -> u64 {
        let mut size = 4u64; // version
        size += varint_size(self.inputs.len() as u64);
        for input in &self.inputs {
            size += 36; // outpoint (32 + 4)
            size += varint_size(input.script_sig.len() as u64) + input.script_sig.len() as u64;
            size += 4; // sequence
        }
        size += varint_size(self.outputs.len() as u64);
        for output in &self.outputs {
            size += 8; // value
            size += varint_size(output.script_pubkey.len() as u64)
                + output.script_pubkey.len() as u64;
        }
        size + 4 // locktime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_in_one_out(script_sig: Vec<u8>, script_pubkey: Vec<u8>) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint {
                    hash: [0u8; 32],
                    index: 0,
                },
                script_sig,
                sequence: 0xffffffff,
            }],
            outputs: vec![TransactionOutput {
                value: 1000,
                script_pubkey,
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn test_varint_size_boundaries() {
        assert_eq!(varint_size(0), 1);
        assert_eq!(varint_size(0xfc), 1);
        assert_eq!(varint_size(0xfd), 3);
        assert_eq!(varint_size(0xffff), 3);
        assert_eq!(varint_size(0x10000), 5);
        assert_eq!(varint_size(0xffffffff), 5);
        assert_eq!(varint_size(0x100000000), 9);
    }

    #[test]
    fn test_serialized_size_minimal() {
        // 4 (version) + 1 (in count) + 36 + 1 + 0 + 4 (input)
        // + 1 (out count) + 8 + 1 + 0 (output) + 4 (locktime)
        let tx = one_in_one_out(vec![], vec![]);
        assert_eq!(tx.serialized_size(), 60);
    }

    #[test]
    fn test_serialized_size_counts_script_bytes() {
        let tx = one_in_one_out(vec![0u8; 10], vec![0u8; 25]);
        assert_eq!(tx.serialized_size(), 60 + 10 + 25);
    }

    #[test]
    fn test_serialized_size_large_script_grows_varint() {
        // A 300-byte script needs a 3-byte varint prefix
        let tx = one_in_one_out(vec![0u8; 300], vec![]);
        assert_eq!(tx.serialized_size(), 60 + 300 + 2);
    }
}
