//! Construction-time error types
//!
//! Estimation itself never fails; recoverable conditions surface as
//! warnings on the [`CostEstimate`](crate::estimate::CostEstimate).
//! These errors cover the fatal band: a cost model that cannot be
//! loaded.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("failed to read cost model {}: {source}", path.display())]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cost model {}: {source}", path.display())]
    ModelParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cost model {}: opcode {key}: {source}", path.display())]
    BadOpcodeEntry {
        path: PathBuf,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cost model {}: unknown opcode mnemonic {key}", path.display())]
    UnknownOpcodeName { path: PathBuf, key: String },
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
