//! Loadable opcode cost model
//!
//! The model is data, not code: the micro-benchmark harness refits
//! coefficients when hardware changes and emits a new JSON profile,
//! which is loaded here without recompiling the estimator. After
//! construction the model is immutable and can be shared across any
//! number of concurrent estimations.
//!
//! File format:
//!
//! ```json
//! {
//!   "profile_id": "x86_64-generic",
//!   "hardware_info": "AMD EPYC 7443, 2.85 GHz",
//!   "constants": { "c_dispatch": 5.0, "c_parse_per_byte": 0.8 },
//!   "opcodes": {
//!     "OP_CAT": { "model": "linear", "c0": 40.0, "c1": 0.11, "c_alloc": 90.0 },
//!     "OP_CHECKSIG": { "model": "signature" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_C_DISPATCH, DEFAULT_C_ECDSA, DEFAULT_C_PARSE_PER_BYTE, DEFAULT_C_PREIMAGE_PER_BYTE,
    DEFAULT_PREIMAGE_SIZE, UNKNOWN_OPCODE_COST,
};
use crate::error::{EstimatorError, Result};
use crate::opcodes::{opcode_from_name, opcode_name};

fn default_c_dispatch() -> f64 {
    DEFAULT_C_DISPATCH
}

fn default_c_parse_per_byte() -> f64 {
    DEFAULT_C_PARSE_PER_BYTE
}

fn default_c_ecdsa() -> f64 {
    DEFAULT_C_ECDSA
}

fn default_c_preimage_per_byte() -> f64 {
    DEFAULT_C_PREIMAGE_PER_BYTE
}

fn default_profile_id() -> String {
    "unknown".to_string()
}

/// Cost formula for a single opcode.
///
/// The `model` tag selects the variant; coefficients missing from the
/// file take their documented defaults. An unrecognized tag fails
/// deserialization, which surfaces as a load-time error naming the
/// offending opcode key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum CostFormula {
    /// Fixed cost: `c0`
    Constant {
        #[serde(default)]
        c0: f64,
    },
    /// Size-dependent cost: `c0 + c1 * n + c_alloc`
    Linear {
        #[serde(default)]
        c0: f64,
        #[serde(default)]
        c1: f64,
        #[serde(default)]
        c_alloc: f64,
    },
    /// Single signature check: `c_ecdsa + c_preimage_per_byte * preimage`
    Signature {
        #[serde(default = "default_c_ecdsa")]
        c_ecdsa: f64,
        #[serde(default = "default_c_preimage_per_byte")]
        c_preimage_per_byte: f64,
    },
    /// m-of-n signature check:
    /// `m * (c_ecdsa + c_preimage_per_byte * preimage) + (n - m) * c_keyscan + c_setup`
    Multisig {
        #[serde(default = "default_c_ecdsa")]
        c_ecdsa: f64,
        #[serde(default = "default_c_preimage_per_byte")]
        c_preimage_per_byte: f64,
        #[serde(default)]
        c_keyscan: f64,
        #[serde(default)]
        c_setup: f64,
    },
}

impl CostFormula {
    /// Evaluate the formula for the given size parameters.
    ///
    /// Parameter meaning is positional and variant-specific: `Linear`
    /// reads `params[0]` as the byte count, `Signature` reads
    /// `params[0]` as the preimage size, `Multisig` reads
    /// `(m, n, preimage)`. Missing parameters fall back to the model
    /// defaults. The result is truncated toward zero once, here, at
    /// per-opcode granularity, and never goes negative.
    pub fn evaluate(&self, params: &[u64]) -> u64 {
        let raw = match self {
            CostFormula::Constant { c0 } => *c0,
            CostFormula::Linear { c0, c1, c_alloc } => {
                let n = params.first().copied().unwrap_or(0) as f64;
                c0 + c1 * n + c_alloc
            }
            CostFormula::Signature {
                c_ecdsa,
                c_preimage_per_byte,
            } => {
                let preimage = params.first().copied().unwrap_or(DEFAULT_PREIMAGE_SIZE) as f64;
                c_ecdsa + c_preimage_per_byte * preimage
            }
            CostFormula::Multisig {
                c_ecdsa,
                c_preimage_per_byte,
                c_keyscan,
                c_setup,
            } => {
                let m = params.first().copied().unwrap_or(1) as f64;
                let n = params.get(1).copied().unwrap_or(3) as f64;
                let preimage = params.get(2).copied().unwrap_or(DEFAULT_PREIMAGE_SIZE) as f64;
                m * (c_ecdsa + c_preimage_per_byte * preimage) + (n - m) * c_keyscan + c_setup
            }
        };
        if raw.is_finite() && raw > 0.0 {
            raw as u64
        } else {
            0
        }
    }
}

/// Global model constants charged outside any single opcode formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConstants {
    /// Per-opcode dispatch overhead in cycles
    #[serde(default = "default_c_dispatch")]
    pub c_dispatch: f64,

    /// Parsing cost in cycles per script byte, charged once over the
    /// combined script length
    #[serde(default = "default_c_parse_per_byte")]
    pub c_parse_per_byte: f64,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            c_dispatch: DEFAULT_C_DISPATCH,
            c_parse_per_byte: DEFAULT_C_PARSE_PER_BYTE,
        }
    }
}

/// On-disk model representation.
///
/// Opcode entries stay as raw JSON values through the first pass so a
/// bad entry can be reported with its key.
#[derive(Deserialize)]
struct ModelFileRaw {
    #[serde(default = "default_profile_id")]
    profile_id: String,
    #[serde(default)]
    hardware_info: Option<String>,
    #[serde(default)]
    constants: ModelConstants,
    #[serde(default)]
    opcodes: BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize)]
struct ModelFileOut<'a> {
    profile_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hardware_info: Option<&'a str>,
    constants: ModelConstants,
    opcodes: BTreeMap<&'static str, &'a CostFormula>,
}

/// Immutable per-opcode cost model plus global constants.
///
/// Mnemonic-keyed in the file, compiled to a direct 256-entry table at
/// load time. No mutator API exists; share freely across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    profile_id: String,
    hardware_info: Option<String>,
    constants: ModelConstants,
    formulas: Box<[Option<CostFormula>; 256]>,
}

impl Default for CostModel {
    /// Model with default constants and no opcode entries; every
    /// opcode resolves to the unknown-opcode fallback cost.
    fn default() -> Self {
        Self {
            profile_id: default_profile_id(),
            hardware_info: None,
            constants: ModelConstants::default(),
            formulas: Box::new(std::array::from_fn(|_| None)),
        }
    }
}

impl CostModel {
    /// Load a cost model from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| EstimatorError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Load a cost model from an in-memory JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::parse(json, Path::new("<inline>"))
    }

    fn parse(json: &str, path: &Path) -> Result<Self> {
        let raw: ModelFileRaw =
            serde_json::from_str(json).map_err(|source| EstimatorError::ModelParse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut formulas: Box<[Option<CostFormula>; 256]> =
            Box::new(std::array::from_fn(|_| None));
        for (key, value) in raw.opcodes {
            let opcode =
                opcode_from_name(&key).ok_or_else(|| EstimatorError::UnknownOpcodeName {
                    path: path.to_path_buf(),
                    key: key.clone(),
                })?;
            let formula: CostFormula = serde_json::from_value(value).map_err(|source| {
                EstimatorError::BadOpcodeEntry {
                    path: path.to_path_buf(),
                    key,
                    source,
                }
            })?;
            formulas[opcode as usize] = Some(formula);
        }

        Ok(Self {
            profile_id: raw.profile_id,
            hardware_info: raw.hardware_info,
            constants: raw.constants,
            formulas,
        })
    }

    /// Serialize back to the file representation.
    ///
    /// Opcode keys come out in mnemonic order (`BTreeMap`), so output
    /// is stable and a load/save/load cycle yields an equal model.
    pub fn to_json_string(&self) -> String {
        let opcodes: BTreeMap<&'static str, &CostFormula> = self
            .formulas
            .iter()
            .enumerate()
            .filter_map(|(byte, formula)| {
                formula
                    .as_ref()
                    .map(|f| (opcode_name(byte as u8).expect("named opcode"), f))
            })
            .collect();
        let out = ModelFileOut {
            profile_id: &self.profile_id,
            hardware_info: self.hardware_info.as_deref(),
            constants: self.constants,
            opcodes,
        };
        serde_json::to_string_pretty(&out).expect("model serialization cannot fail")
    }

    /// Cycle cost of one opcode for the given size parameters.
    ///
    /// Opcodes without a model entry cost the fixed fallback.
    pub fn cost_of(&self, opcode: u8, params: &[u64]) -> u64 {
        match &self.formulas[opcode as usize] {
            Some(formula) => formula.evaluate(params),
            None => UNKNOWN_OPCODE_COST,
        }
    }

    /// The formula loaded for an opcode, if any
    pub fn formula(&self, opcode: u8) -> Option<&CostFormula> {
        self.formulas[opcode as usize].as_ref()
    }

    /// Global constants: dispatch and per-byte parsing overhead
    pub fn constants(&self) -> ModelConstants {
        self.constants
    }

    /// Identifier of the fitted profile
    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    /// Hardware description recorded by the fitting harness, if any
    pub fn hardware_info(&self) -> &str {
        self.hardware_info.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::*;

    #[test]
    fn test_empty_document_gets_defaults() {
        let model = CostModel::from_json_str("{}").unwrap();
        assert_eq!(model.profile_id(), "unknown");
        assert_eq!(model.hardware_info(), "");
        assert_eq!(model.constants().c_dispatch, 5.0);
        assert_eq!(model.constants().c_parse_per_byte, 0.8);
    }

    #[test]
    fn test_unlisted_opcode_costs_fallback() {
        let model = CostModel::from_json_str("{}").unwrap();
        assert_eq!(model.cost_of(OP_DUP, &[10]), 100);
        assert_eq!(model.cost_of(0xfe, &[]), 100);
    }

    #[test]
    fn test_constant_model() {
        let model = CostModel::from_json_str(
            r#"{"opcodes": {"OP_SWAP": {"model": "constant", "c0": 12.9}}}"#,
        )
        .unwrap();
        // Truncation toward zero, not rounding
        assert_eq!(model.cost_of(OP_SWAP, &[]), 12);
    }

    #[test]
    fn test_linear_model() {
        let model = CostModel::from_json_str(
            r#"{"opcodes": {"OP_CAT": {"model": "linear", "c0": 40.0, "c1": 0.5, "c_alloc": 90.0}}}"#,
        )
        .unwrap();
        assert_eq!(model.cost_of(OP_CAT, &[20]), 140);
        // Missing parameter means n = 0
        assert_eq!(model.cost_of(OP_CAT, &[]), 130);
    }

    #[test]
    fn test_signature_model_defaults() {
        let model = CostModel::from_json_str(
            r#"{"opcodes": {"OP_CHECKSIG": {"model": "signature"}}}"#,
        )
        .unwrap();
        // 85000 + 2.5 * 200
        assert_eq!(model.cost_of(OP_CHECKSIG, &[200]), 85_500);
        // Missing preimage parameter assumes 1000 bytes
        assert_eq!(model.cost_of(OP_CHECKSIG, &[]), 87_500);
    }

    #[test]
    fn test_multisig_model() {
        let model = CostModel::from_json_str(
            r#"{"opcodes": {"OP_CHECKMULTISIG": {
                "model": "multisig",
                "c_ecdsa": 1000.0, "c_preimage_per_byte": 1.0,
                "c_keyscan": 10.0, "c_setup": 5.0
            }}}"#,
        )
        .unwrap();
        // 2 * (1000 + 100) + (3 - 2) * 10 + 5
        assert_eq!(model.cost_of(OP_CHECKMULTISIG, &[2, 3, 100]), 2215);
    }

    #[test]
    fn test_negative_formula_clamps_to_zero() {
        let model = CostModel::from_json_str(
            r#"{"opcodes": {"OP_NOP": {"model": "constant", "c0": -3.0}}}"#,
        )
        .unwrap();
        assert_eq!(model.cost_of(OP_NOP, &[]), 0);
    }

    #[test]
    fn test_unrecognized_model_type_rejected() {
        let err = CostModel::from_json_str(
            r#"{"opcodes": {"OP_CAT": {"model": "quadratic", "c0": 1.0}}}"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("OP_CAT"), "diagnostic names the key: {message}");
    }

    #[test]
    fn test_unknown_mnemonic_rejected() {
        let err = CostModel::from_json_str(
            r#"{"opcodes": {"OP_SUBSTR": {"model": "constant", "c0": 1.0}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("OP_SUBSTR"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(CostModel::from_json_str("not json").is_err());
    }

    #[test]
    fn test_round_trip_preserves_model() {
        let json = r#"{
            "profile_id": "test-profile",
            "hardware_info": "bench rig",
            "constants": {"c_dispatch": 4.5, "c_parse_per_byte": 1.0},
            "opcodes": {
                "OP_DUP": {"model": "linear", "c0": 15.0, "c1": 0.02, "c_alloc": 30.0},
                "OP_CHECKSIG": {"model": "signature", "c_ecdsa": 80000.0},
                "OP_CHECKMULTISIG": {"model": "multisig", "c_keyscan": 150.0, "c_setup": 300.0},
                "OP_SWAP": {"model": "constant", "c0": 8.0}
            }
        }"#;
        let model = CostModel::from_json_str(json).unwrap();
        let reloaded = CostModel::from_json_str(&model.to_json_string()).unwrap();
        assert_eq!(model, reloaded);
    }
}
