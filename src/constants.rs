//! Estimator constants and model-coefficient defaults
//!
//! Limit defaults are sized for an unbounded-size chain: scripts may be
//! megabytes and individual stack items hundreds of megabytes. They are
//! safety rails for the estimator itself, not consensus rules.

/// Default maximum combined script size: 100MB
pub const DEFAULT_MAX_SCRIPT_SIZE: u64 = 100_000_000;

/// Default maximum number of stack items during symbolic execution
pub const DEFAULT_MAX_STACK_ITEMS: u32 = 10_000;

/// Default maximum size of a single stack item: 100MB
pub const DEFAULT_MAX_STACK_ITEM_SIZE: u64 = 100_000_000;

/// Default maximum number of opcodes processed in one estimation
pub const DEFAULT_MAX_OPCODE_COUNT: u32 = 1_000_000;

/// Default cycle ceiling: 10B cycles (safety rail, not a model statement)
pub const DEFAULT_MAX_TOTAL_CYCLES: u64 = 10_000_000_000;

/// Default per-opcode dispatch overhead in cycles
pub const DEFAULT_C_DISPATCH: f64 = 5.0;

/// Default parsing cost in cycles per script byte
pub const DEFAULT_C_PARSE_PER_BYTE: f64 = 0.8;

/// Default ECDSA verification cost in cycles
pub const DEFAULT_C_ECDSA: f64 = 85_000.0;

/// Default preimage hashing cost in cycles per byte
pub const DEFAULT_C_PREIMAGE_PER_BYTE: f64 = 2.5;

/// Cycle cost charged for opcodes absent from the cost model
pub const UNKNOWN_OPCODE_COST: u64 = 100;

/// Default divisor converting cycle counts into fee units
pub const DEFAULT_CYCLES_PER_UNIT: u64 = 100_000;

/// Maximum public keys considered for OP_CHECKMULTISIG when the key
/// count cannot be read from a preceding literal
pub const MAX_PUBKEYS_PER_MULTISIG: u64 = 20;

/// Preimage size assumed by the cost model when no parameter is supplied
pub const DEFAULT_PREIMAGE_SIZE: u64 = 1_000;

/// Maximum byte length of a value produced by OP_BIN2NUM
pub const MAX_NUMERIC_SIZE: u64 = 8;

/// SHA-256 digest length in bytes (OP_SHA256, OP_HASH256)
pub const SHA256_DIGEST_SIZE: u64 = 32;

/// RIPEMD-160 / SHA-1 digest length in bytes (OP_RIPEMD160, OP_SHA1, OP_HASH160)
pub const HASH160_DIGEST_SIZE: u64 = 20;
