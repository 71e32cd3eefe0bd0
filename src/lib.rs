//! # script-cost
//!
//! Predicts the CPU cost of executing a transaction-validation script
//! without running an interpreter. Given the unlocking and locking
//! scripts attached to a transaction input, the estimator walks the
//! concatenated byte stream once, tracks the *sizes* of abstract stack
//! items, applies a loadable per-opcode cost model and enforces
//! resource limits. Miners and wallets use the result as a fee oracle
//! and as an admission-control gate.
//!
//! ## Architecture
//!
//! - [`parser`] - zero-copy opcode decoding over both scripts
//! - [`stack`] - stack of item byte-sizes, no values
//! - [`model`] - per-opcode cost formulas, loaded from a JSON profile
//! - [`sighash`] - preimage sizing for signature opcodes
//! - [`estimator`] - the symbolic executor tying it together
//! - [`estimate`] - totals, breakdown, peaks and warnings
//!
//! The estimator never executes cryptography, never verifies a
//! signature and never evaluates a stack value. Estimates are
//! deterministic, bound the real cost from above (branch arms are
//! summed, unknown operands assume the worst case) and degrade to
//! warnings instead of errors: a truncated script or an underflow
//! yields a partial estimate plus a warning, never a panic.
//!
//! ## Usage
//!
//! ```rust
//! use script_cost::{
//!     CostEstimator, CostModel, OutPoint, Transaction, TransactionInput, TransactionOutput,
//! };
//!
//! let model = CostModel::from_json_str(
//!     r#"{
//!         "profile_id": "docs",
//!         "opcodes": { "OP_DUP": {"model": "linear", "c0": 15.0, "c1": 0.02} }
//!     }"#,
//! )
//! .unwrap();
//! let estimator = CostEstimator::new(model);
//!
//! let tx = Transaction {
//!     version: 1,
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint { hash: [0u8; 32], index: 0 },
//!         script_sig: vec![],
//!         sequence: 0xffffffff,
//!     }],
//!     outputs: vec![TransactionOutput { value: 1000, script_pubkey: vec![] }],
//!     lock_time: 0,
//! };
//!
//! // Unlocking script pushes a byte; locking script duplicates it.
//! let estimate = estimator.estimate(&[0x01, 0xaa], &[0x76], &tx, 0);
//! assert_eq!(estimate.opcode_count, 2);
//! assert!(estimate.warnings.is_empty());
//! ```
//!
//! The cost model is immutable after construction: wrap the estimator
//! in an `Arc` and share it across threads; each call owns its own
//! stack and result.

pub mod constants;
pub mod error;
pub mod estimate;
pub mod estimator;
pub mod model;
pub mod opcodes;
pub mod parser;
pub mod sighash;
pub mod stack;
pub mod types;

pub use error::{EstimatorError, Result};
pub use estimate::{Breakdown, CostCategory, CostEstimate, Warning};
pub use estimator::{CostEstimator, EstimatorLimits};
pub use model::{CostFormula, CostModel, ModelConstants};
pub use sighash::{sighash_preimage_size, SighashType};
pub use types::{OutPoint, Transaction, TransactionInput, TransactionOutput};
