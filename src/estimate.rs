//! Estimation results: totals, breakdown, peaks, warnings
//!
//! One [`CostEstimate`] is built per estimation call and returned by
//! value; there is no shared state between calls. On early termination
//! every field holds the partial totals accumulated so far; callers
//! check the warnings list to decide whether the estimate is usable.

use std::fmt;

use serde::Serialize;

use crate::opcodes::opcode_name;

/// Cost accounting category for one opcode charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostCategory {
    Parsing,
    Dispatch,
    StackOps,
    ByteOps,
    Hashing,
    Signatures,
    ControlFlow,
    /// Unknown-opcode fallback charges
    Other,
}

/// Cycle totals by category.
///
/// The category fields always sum to the estimate's `total_cycles`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub parsing: u64,
    pub dispatch: u64,
    pub stack_ops: u64,
    pub byte_ops: u64,
    pub hashing: u64,
    pub signatures: u64,
    pub control_flow: u64,
    pub other: u64,
}

impl Breakdown {
    pub fn sum(&self) -> u64 {
        self.parsing
            + self.dispatch
            + self.stack_ops
            + self.byte_ops
            + self.hashing
            + self.signatures
            + self.control_flow
            + self.other
    }

    fn field_mut(&mut self, category: CostCategory) -> &mut u64 {
        match category {
            CostCategory::Parsing => &mut self.parsing,
            CostCategory::Dispatch => &mut self.dispatch,
            CostCategory::StackOps => &mut self.stack_ops,
            CostCategory::ByteOps => &mut self.byte_ops,
            CostCategory::Hashing => &mut self.hashing,
            CostCategory::Signatures => &mut self.signatures,
            CostCategory::ControlFlow => &mut self.control_flow,
            CostCategory::Other => &mut self.other,
        }
    }
}

/// Recoverable condition observed during estimation.
///
/// Warnings never abort the call; most stop execution early and the
/// estimate keeps whatever was accumulated. The informational variants
/// (`UnknownOpcode`, `ConservativeEstimate`, `BranchStackMismatch`)
/// let execution continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Warning {
    ScriptTooLarge { size: u64, limit: u64 },
    OpcodeLimitExceeded { limit: u32 },
    CycleLimitExceeded { limit: u64 },
    StackBytesExceeded { size: u64, limit: u64 },
    StackItemsExceeded { items: u32, limit: u32 },
    Underflow { opcode: u8 },
    TruncatedPush { position: u64 },
    BranchStackMismatch { then_items: u32, else_items: u32 },
    UnknownOpcode { opcode: u8 },
    ConservativeEstimate { opcode: u8, assumed: u64 },
}

impl Warning {
    /// Whether this warning stops execution
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Warning::UnknownOpcode { .. }
                | Warning::ConservativeEstimate { .. }
                | Warning::BranchStackMismatch { .. }
        )
    }
}

fn describe_opcode(opcode: u8) -> String {
    match opcode_name(opcode) {
        Some(name) => name.to_string(),
        None => format!("opcode 0x{opcode:02x}"),
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ScriptTooLarge { size, limit } => {
                write!(f, "combined script size {size} exceeds limit {limit}")
            }
            Warning::OpcodeLimitExceeded { limit } => {
                write!(f, "opcode count limit {limit} exceeded")
            }
            Warning::CycleLimitExceeded { limit } => {
                write!(f, "cycle ceiling {limit} exceeded")
            }
            Warning::StackBytesExceeded { size, limit } => {
                write!(f, "stack item of {size} bytes exceeds limit {limit}")
            }
            Warning::StackItemsExceeded { items, limit } => {
                write!(f, "stack item count {items} exceeds limit {limit}")
            }
            Warning::Underflow { opcode } => {
                write!(f, "stack underflow at {}", describe_opcode(*opcode))
            }
            Warning::TruncatedPush { position } => {
                write!(f, "push at position {position} extends past end of script")
            }
            Warning::BranchStackMismatch {
                then_items,
                else_items,
            } => write!(
                f,
                "branch arms leave {then_items} vs {else_items} stack items; larger arm adopted"
            ),
            Warning::UnknownOpcode { opcode } => {
                write!(f, "unknown {}, fallback cost applied", describe_opcode(*opcode))
            }
            Warning::ConservativeEstimate { opcode, assumed } => write!(
                f,
                "{} operand not statically known, assumed {assumed}",
                describe_opcode(*opcode)
            ),
        }
    }
}

/// Predicted cost of validating one transaction input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostEstimate {
    /// Total predicted cycles (always equals `breakdown.sum()`)
    pub total_cycles: u64,
    pub breakdown: Breakdown,
    /// Largest sum of stack item sizes observed
    pub peak_stack_bytes: u64,
    /// Largest stack item count observed
    pub peak_stack_items: u32,
    /// Signatures the real interpreter would verify
    pub signature_count: u32,
    /// Opcodes processed (pushes included)
    pub opcode_count: u32,
    /// Conditions observed, in emission order
    pub warnings: Vec<Warning>,
}

impl CostEstimate {
    /// Fold `cycles` into the category and the running total
    pub(crate) fn charge(&mut self, category: CostCategory, cycles: u64) {
        *self.breakdown.field_mut(category) += cycles;
        self.total_cycles += cycles;
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Convert cycles to fee units: `total_cycles / cycles_per_unit`.
    ///
    /// The conventional divisor is
    /// [`DEFAULT_CYCLES_PER_UNIT`](crate::constants::DEFAULT_CYCLES_PER_UNIT).
    pub fn to_fee(&self, cycles_per_unit: u64) -> f64 {
        self.total_cycles as f64 / cycles_per_unit as f64
    }

    /// Warnings rendered as human-readable strings, in emission order
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }
}
