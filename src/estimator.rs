//! Symbolic execution engine
//!
//! Walks the concatenated scripts once, tracks item sizes on a
//! [`SizeStack`], asks the [`CostModel`] for a cycle figure per opcode,
//! and enforces the estimator limits. No value is ever computed: the
//! engine reasons about dataflow sizes only, so it terminates in
//! O(limits) time on any input, adversarial or not.
//!
//! Branches are bounded from above: both arms of an IF are executed
//! symbolically and their costs summed, so the real execution (which
//! runs one arm) can never cost more than the estimate.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_OPCODE_COUNT, DEFAULT_MAX_SCRIPT_SIZE, DEFAULT_MAX_STACK_ITEMS,
    DEFAULT_MAX_STACK_ITEM_SIZE, DEFAULT_MAX_TOTAL_CYCLES, HASH160_DIGEST_SIZE, MAX_NUMERIC_SIZE,
    MAX_PUBKEYS_PER_MULTISIG, SHA256_DIGEST_SIZE,
};
use crate::error::Result;
use crate::estimate::{CostCategory, CostEstimate, Warning};
use crate::model::CostModel;
use crate::opcodes::*;
use crate::parser::{ScriptCursor, ScriptElement};
use crate::sighash::{sighash_preimage_size, SighashType};
use crate::stack::SizeStack;
use crate::types::Transaction;

/// Deepest IF/NOTIF nesting tracked with join semantics.
///
/// Each tracked level clones the size stack, so unbounded nesting would
/// break the O(max_stack_items) memory bound. Beyond this depth arms
/// run sequentially on the shared stack, which still sums their costs
/// and can only over-estimate.
const MAX_BRANCH_NESTING: usize = 256;

fn default_max_script_size() -> u64 {
    DEFAULT_MAX_SCRIPT_SIZE
}

fn default_max_stack_items() -> u32 {
    DEFAULT_MAX_STACK_ITEMS
}

fn default_max_stack_item_size() -> u64 {
    DEFAULT_MAX_STACK_ITEM_SIZE
}

fn default_max_opcode_count() -> u32 {
    DEFAULT_MAX_OPCODE_COUNT
}

fn default_max_total_cycles() -> u64 {
    DEFAULT_MAX_TOTAL_CYCLES
}

/// Hard caps on one estimation call.
///
/// Any breach stops execution with a warning on the result. Fields
/// missing from a JSON override take their defaults, so deployments can
/// ship partial limit files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorLimits {
    /// Maximum combined unlocking + locking script size in bytes
    #[serde(default = "default_max_script_size")]
    pub max_script_size: u64,

    /// Maximum number of stack items
    #[serde(default = "default_max_stack_items")]
    pub max_stack_items: u32,

    /// Maximum size of a single stack item in bytes
    #[serde(default = "default_max_stack_item_size")]
    pub max_stack_item_size: u64,

    /// Maximum opcodes processed before giving up
    #[serde(default = "default_max_opcode_count")]
    pub max_opcode_count: u32,

    /// Cycle ceiling; a safety rail, not a model statement
    #[serde(default = "default_max_total_cycles")]
    pub max_total_cycles: u64,
}

impl Default for EstimatorLimits {
    fn default() -> Self {
        Self {
            max_script_size: DEFAULT_MAX_SCRIPT_SIZE,
            max_stack_items: DEFAULT_MAX_STACK_ITEMS,
            max_stack_item_size: DEFAULT_MAX_STACK_ITEM_SIZE,
            max_opcode_count: DEFAULT_MAX_OPCODE_COUNT,
            max_total_cycles: DEFAULT_MAX_TOTAL_CYCLES,
        }
    }
}

/// Truncation toward zero at per-opcode granularity; negative and
/// non-finite figures clamp to zero.
fn truncate_cycles(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw as u64
    } else {
        0
    }
}

/// Byte length of the minimal signed little-endian encoding of a
/// non-negative value (what OP_DEPTH and OP_SIZE push).
fn script_num_size(value: u64) -> u64 {
    if value == 0 {
        return 0;
    }
    let bits = 64 - u64::from(value.leading_zeros());
    bits / 8 + 1
}

/// Predicts the CPU cost of validating one transaction input.
///
/// Exclusive construction, shared read-only thereafter: the estimator
/// holds only the immutable cost model, so wrap it in an `Arc` and call
/// [`estimate`](Self::estimate) from as many threads as needed. Not
/// clonable on purpose; clone the handle, not the model.
#[derive(Debug)]
pub struct CostEstimator {
    model: CostModel,
}

impl CostEstimator {
    /// Build an estimator around an already-parsed cost model
    pub fn new(model: CostModel) -> Self {
        Self { model }
    }

    /// Load the cost model from a JSON profile and build an estimator
    pub fn from_model_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(CostModel::from_file(path)?))
    }

    /// Identifier of the loaded cost profile
    pub fn profile_id(&self) -> &str {
        self.model.profile_id()
    }

    /// Hardware description recorded by the fitting harness
    pub fn hardware_info(&self) -> &str {
        self.model.hardware_info()
    }

    /// The loaded cost model
    pub fn model(&self) -> &CostModel {
        &self.model
    }

    /// Estimate the cost of validating `tx.inputs[input_index]` with
    /// the default limits.
    pub fn estimate(
        &self,
        unlocking_script: &[u8],
        locking_script: &[u8],
        tx: &Transaction,
        input_index: usize,
    ) -> CostEstimate {
        self.estimate_with_limits(
            unlocking_script,
            locking_script,
            tx,
            input_index,
            &EstimatorLimits::default(),
        )
    }

    /// Estimate with caller-supplied limits
    pub fn estimate_with_limits(
        &self,
        unlocking_script: &[u8],
        locking_script: &[u8],
        tx: &Transaction,
        input_index: usize,
        limits: &EstimatorLimits,
    ) -> CostEstimate {
        let mut cursor = ScriptCursor::new(unlocking_script, locking_script);
        let total_len = cursor.total_len();

        if total_len > limits.max_script_size {
            let mut estimate = CostEstimate::default();
            estimate.warn(Warning::ScriptTooLarge {
                size: total_len,
                limit: limits.max_script_size,
            });
            return estimate;
        }

        let mut engine = Engine {
            model: &self.model,
            limits,
            tx,
            input_index,
            estimate: CostEstimate::default(),
            stack: SizeStack::new(),
            frames: Vec::new(),
            unframed_ifs: 0,
            unknown_seen: [false; 256],
            last_literal: None,
            stopped: false,
        };

        let parsing = truncate_cycles(
            self.model.constants().c_parse_per_byte * total_len as f64,
        );
        engine.estimate.charge(CostCategory::Parsing, parsing);

        engine.run(&mut cursor);
        engine.estimate
    }
}

/// One tracked IF/NOTIF level
struct BranchFrame {
    /// Stack as it stood after the condition pop
    base: SizeStack,
    /// Then-arm result, captured when ELSE is reached
    then_stack: Option<SizeStack>,
}

struct Engine<'a> {
    model: &'a CostModel,
    limits: &'a EstimatorLimits,
    tx: &'a Transaction,
    input_index: usize,
    estimate: CostEstimate,
    stack: SizeStack,
    frames: Vec<BranchFrame>,
    unframed_ifs: u32,
    unknown_seen: [bool; 256],
    /// Value of the most recent push, when it was a small literal
    last_literal: Option<u64>,
    stopped: bool,
}

impl Engine<'_> {
    fn run(&mut self, cursor: &mut ScriptCursor) {
        while !self.stopped {
            let start = cursor.position();
            let element = cursor.next_element();
            match element {
                ScriptElement::End => break,
                ScriptElement::Truncated => {
                    // The element never decoded; nothing is counted or
                    // charged for it.
                    self.fatal(Warning::TruncatedPush {
                        position: start as u64,
                    });
                    break;
                }
                ScriptElement::Push { .. } | ScriptElement::Op(_) => {}
            }

            self.estimate.opcode_count += 1;
            if self.estimate.opcode_count > self.limits.max_opcode_count {
                self.fatal(Warning::OpcodeLimitExceeded {
                    limit: self.limits.max_opcode_count,
                });
                break;
            }

            let dispatch = truncate_cycles(self.model.constants().c_dispatch);
            self.estimate.charge(CostCategory::Dispatch, dispatch);

            let literal_before = self.last_literal.take();
            match element {
                ScriptElement::Push { len, .. } => {
                    self.stack.push(len);
                    self.last_literal = if len == 0 {
                        Some(0)
                    } else {
                        cursor.literal_value(&element)
                    };
                }
                ScriptElement::Op(opcode) => {
                    self.exec_opcode(opcode, literal_before);
                    if (OP_1..=OP_16).contains(&opcode) {
                        self.last_literal = Some((opcode - OP_N_BASE) as u64);
                    }
                }
                ScriptElement::End | ScriptElement::Truncated => unreachable!(),
            }

            if !self.stopped {
                self.check_state();
            }
        }
    }

    /// Peak tracking and limit rails, in an order that keeps
    /// `peak_stack_bytes` within `max_stack_item_size * max_stack_items`
    /// while still letting `peak_stack_items` record the push that
    /// trips the item-count check.
    fn check_state(&mut self) {
        let items = self.stack.depth() as u32;
        self.estimate.peak_stack_items = self.estimate.peak_stack_items.max(items);

        if items > self.limits.max_stack_items {
            self.fatal(Warning::StackItemsExceeded {
                items,
                limit: self.limits.max_stack_items,
            });
            return;
        }
        if self.stack.largest_item() > self.limits.max_stack_item_size {
            self.fatal(Warning::StackBytesExceeded {
                size: self.stack.largest_item(),
                limit: self.limits.max_stack_item_size,
            });
            return;
        }

        self.estimate.peak_stack_bytes =
            self.estimate.peak_stack_bytes.max(self.stack.current_bytes());

        if self.estimate.total_cycles > self.limits.max_total_cycles {
            self.fatal(Warning::CycleLimitExceeded {
                limit: self.limits.max_total_cycles,
            });
        }
    }

    fn fatal(&mut self, warning: Warning) {
        self.estimate.warn(warning);
        self.stopped = true;
    }

    fn charge_op(&mut self, opcode: u8, category: CostCategory, params: &[u64]) {
        let cycles = self.model.cost_of(opcode, params);
        self.estimate.charge(category, cycles);
    }

    fn pop_or_underflow(&mut self, opcode: u8) -> Option<u64> {
        match self.stack.pop() {
            Ok(size) => Some(size),
            Err(_) => {
                self.fatal(Warning::Underflow { opcode });
                None
            }
        }
    }

    /// Pop the top two items as `(second, top)`
    fn pop2_or_underflow(&mut self, opcode: u8) -> Option<(u64, u64)> {
        if self.stack.depth() < 2 {
            self.fatal(Warning::Underflow { opcode });
            return None;
        }
        let top = self.stack.pop().expect("depth checked");
        let second = self.stack.pop().expect("depth checked");
        Some((second, top))
    }

    /// Depth operand for PICK/ROLL: the preceding push's literal value
    /// when readable, otherwise the worst case for the current stack.
    fn depth_operand(&mut self, opcode: u8, literal_before: Option<u64>) -> u64 {
        match literal_before {
            Some(value) => value,
            None => {
                let worst = (self.stack.depth() as u64).saturating_sub(1);
                self.estimate.warn(Warning::ConservativeEstimate {
                    opcode,
                    assumed: worst,
                });
                worst
            }
        }
    }

    fn exec_opcode(&mut self, opcode: u8, literal_before: Option<u64>) {
        use CostCategory::*;

        match opcode {
            // Small-integer opcodes push a one-byte item; like payload
            // pushes, their cost is covered by dispatch.
            OP_1NEGATE | OP_1..=OP_16 => self.stack.push(1),

            // ---- control flow --------------------------------------
            OP_IF | OP_NOTIF => {
                if self.pop_or_underflow(opcode).is_none() {
                    return;
                }
                self.charge_op(opcode, ControlFlow, &[]);
                if self.frames.len() < MAX_BRANCH_NESTING {
                    self.frames.push(BranchFrame {
                        base: self.stack.clone(),
                        then_stack: None,
                    });
                } else {
                    self.unframed_ifs += 1;
                }
            }
            OP_ELSE => {
                self.charge_op(opcode, ControlFlow, &[]);
                if self.unframed_ifs == 0 {
                    if let Some(frame) = self.frames.last_mut() {
                        match &mut frame.then_stack {
                            None => {
                                let then_stack =
                                    std::mem::replace(&mut self.stack, frame.base.clone());
                                frame.then_stack = Some(then_stack);
                            }
                            // Repeated ELSE toggles arms, as in the
                            // interpreter
                            Some(stored) => std::mem::swap(stored, &mut self.stack),
                        }
                    }
                }
            }
            OP_ENDIF => {
                self.charge_op(opcode, ControlFlow, &[]);
                if self.unframed_ifs > 0 {
                    self.unframed_ifs -= 1;
                } else if let Some(frame) = self.frames.pop() {
                    let current = std::mem::take(&mut self.stack);
                    let (then_stack, else_stack) = match frame.then_stack {
                        Some(stored) => (stored, current),
                        None => (current, frame.base),
                    };
                    self.stack = self.join_branch(then_stack, else_stack);
                }
            }
            OP_VERIFY => {
                if self.pop_or_underflow(opcode).is_none() {
                    return;
                }
                self.charge_op(opcode, ControlFlow, &[]);
            }
            OP_NOP | OP_CODESEPARATOR | OP_NOP1..=OP_NOP10 => {
                self.charge_op(opcode, ControlFlow, &[]);
            }

            // ---- stack operations ----------------------------------
            OP_DUP => match self.stack.dup_top() {
                Ok(top) => self.charge_op(opcode, StackOps, &[top]),
                Err(_) => self.fatal(Warning::Underflow { opcode }),
            },
            OP_SWAP => match self.stack.swap_top_two() {
                Ok(()) => self.charge_op(opcode, StackOps, &[]),
                Err(_) => self.fatal(Warning::Underflow { opcode }),
            },
            OP_ROT => {
                if self.stack.depth() < 3 {
                    self.fatal(Warning::Underflow { opcode });
                    return;
                }
                let moved = self.stack.peek(0).expect("depth checked")
                    + self.stack.peek(1).expect("depth checked")
                    + self.stack.peek(2).expect("depth checked");
                self.stack.rotate_top_three().expect("depth checked");
                self.charge_op(opcode, StackOps, &[moved]);
            }
            OP_PICK => {
                if self.pop_or_underflow(opcode).is_none() {
                    return;
                }
                let depth = self.depth_operand(opcode, literal_before);
                match self.stack.pick(depth as usize) {
                    Ok(size) => self.charge_op(opcode, StackOps, &[size]),
                    Err(_) => self.fatal(Warning::Underflow { opcode }),
                }
            }
            OP_ROLL => {
                if self.pop_or_underflow(opcode).is_none() {
                    return;
                }
                let depth = self.depth_operand(opcode, literal_before);
                match self.stack.roll(depth as usize) {
                    // Depth is the cost parameter: a proxy for the
                    // memmove the interpreter performs
                    Ok(()) => self.charge_op(opcode, StackOps, &[depth]),
                    Err(_) => self.fatal(Warning::Underflow { opcode }),
                }
            }
            OP_DROP => {
                if self.pop_or_underflow(opcode).is_none() {
                    return;
                }
                self.charge_op(opcode, StackOps, &[]);
            }
            OP_2DROP => {
                if self.pop2_or_underflow(opcode).is_none() {
                    return;
                }
                self.charge_op(opcode, StackOps, &[]);
            }
            OP_NIP => {
                let Some((_, top)) = self.pop2_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(top);
                self.charge_op(opcode, StackOps, &[]);
            }
            OP_OVER => match self.stack.pick(1) {
                Ok(size) => self.charge_op(opcode, StackOps, &[size]),
                Err(_) => self.fatal(Warning::Underflow { opcode }),
            },
            OP_TUCK => {
                let Some((second, top)) = self.pop2_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(top);
                self.stack.push(second);
                self.stack.push(top);
                self.charge_op(opcode, StackOps, &[top]);
            }
            OP_2DUP => {
                if self.stack.depth() < 2 {
                    self.fatal(Warning::Underflow { opcode });
                    return;
                }
                let top = self.stack.peek(0).expect("depth checked");
                let second = self.stack.peek(1).expect("depth checked");
                self.stack.push(second);
                self.stack.push(top);
                self.charge_op(opcode, StackOps, &[second + top]);
            }
            OP_3DUP => {
                if self.stack.depth() < 3 {
                    self.fatal(Warning::Underflow { opcode });
                    return;
                }
                let top = self.stack.peek(0).expect("depth checked");
                let second = self.stack.peek(1).expect("depth checked");
                let third = self.stack.peek(2).expect("depth checked");
                self.stack.push(third);
                self.stack.push(second);
                self.stack.push(top);
                self.charge_op(opcode, StackOps, &[third + second + top]);
            }
            OP_DEPTH => {
                let depth = self.stack.depth() as u64;
                self.stack.push(script_num_size(depth));
                self.charge_op(opcode, StackOps, &[]);
            }
            OP_SIZE => match self.stack.peek(0) {
                Ok(top) => {
                    self.stack.push(script_num_size(top));
                    self.charge_op(opcode, StackOps, &[]);
                }
                Err(_) => self.fatal(Warning::Underflow { opcode }),
            },

            // ---- byte operations -----------------------------------
            OP_CAT => match self.stack.combine_top_two_into_sum() {
                Ok(combined) => self.charge_op(opcode, ByteOps, &[combined]),
                Err(_) => self.fatal(Warning::Underflow { opcode }),
            },
            OP_SPLIT => {
                // The split point is unknown, so one part may be as
                // large as the whole; total bytes are preserved.
                let Some(size) = self.pop_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(size);
                self.stack.push(0);
                self.charge_op(opcode, ByteOps, &[size]);
            }
            OP_NUM2BIN => {
                // Pops the size operand; the converted item keeps its
                // current size (treated symbolically).
                if self.pop_or_underflow(opcode).is_none() {
                    return;
                }
                let Some(size) = self.pop_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(size);
                self.charge_op(opcode, ByteOps, &[size]);
            }
            OP_BIN2NUM => {
                let Some(size) = self.pop_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(size.min(MAX_NUMERIC_SIZE));
                self.charge_op(opcode, ByteOps, &[size]);
            }
            OP_INVERT => {
                let Some(size) = self.pop_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(size);
                self.charge_op(opcode, ByteOps, &[size]);
            }
            OP_AND | OP_OR | OP_XOR => {
                let Some((second, top)) = self.pop2_or_underflow(opcode) else {
                    return;
                };
                let result = second.max(top);
                self.stack.push(result);
                self.charge_op(opcode, ByteOps, &[result]);
            }
            OP_EQUAL | OP_EQUALVERIFY => {
                let Some((second, top)) = self.pop2_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(1);
                self.charge_op(opcode, ByteOps, &[second.max(top)]);
            }

            // ---- numeric operations --------------------------------
            OP_1ADD | OP_1SUB => {
                let Some(size) = self.pop_or_underflow(opcode) else {
                    return;
                };
                // Result may need one more byte than the operand
                self.stack.push(size + 1);
                self.charge_op(opcode, ByteOps, &[size]);
            }
            OP_NEGATE | OP_ABS => {
                let Some(size) = self.pop_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(size);
                self.charge_op(opcode, ByteOps, &[size]);
            }
            OP_NOT | OP_0NOTEQUAL => {
                let Some(size) = self.pop_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(1);
                self.charge_op(opcode, ByteOps, &[size]);
            }
            OP_ADD | OP_SUB => {
                let Some((second, top)) = self.pop2_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(second.max(top) + 1);
                self.charge_op(opcode, ByteOps, &[second + top]);
            }
            OP_BOOLAND | OP_BOOLOR | OP_NUMEQUAL | OP_NUMEQUALVERIFY | OP_NUMNOTEQUAL
            | OP_LESSTHAN | OP_GREATERTHAN | OP_LESSTHANOREQUAL | OP_GREATERTHANOREQUAL => {
                let Some((second, top)) = self.pop2_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(1);
                self.charge_op(opcode, ByteOps, &[second + top]);
            }
            OP_MIN | OP_MAX => {
                let Some((second, top)) = self.pop2_or_underflow(opcode) else {
                    return;
                };
                self.stack.push(second.max(top));
                self.charge_op(opcode, ByteOps, &[second + top]);
            }
            OP_WITHIN => {
                if self.stack.depth() < 3 {
                    self.fatal(Warning::Underflow { opcode });
                    return;
                }
                let mut scanned = 0;
                for _ in 0..3 {
                    scanned += self.stack.pop().expect("depth checked");
                }
                self.stack.push(1);
                self.charge_op(opcode, ByteOps, &[scanned]);
            }

            // ---- hashing -------------------------------------------
            OP_RIPEMD160 | OP_SHA1 | OP_HASH160 => {
                self.exec_hash(opcode, HASH160_DIGEST_SIZE)
            }
            OP_SHA256 | OP_HASH256 => self.exec_hash(opcode, SHA256_DIGEST_SIZE),

            // ---- signatures ----------------------------------------
            OP_CHECKSIG | OP_CHECKSIGVERIFY => {
                if self.pop2_or_underflow(opcode).is_none() {
                    return;
                }
                self.stack.push(1);
                let preimage =
                    sighash_preimage_size(self.tx, self.input_index, SighashType::ALL);
                self.charge_op(opcode, Signatures, &[preimage]);
                self.estimate.signature_count += 1;
            }
            OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
                self.exec_multisig(opcode, literal_before)
            }

            // ---- everything else -----------------------------------
            _ => {
                if !self.unknown_seen[opcode as usize] {
                    self.unknown_seen[opcode as usize] = true;
                    self.estimate.warn(Warning::UnknownOpcode { opcode });
                }
                self.charge_op(opcode, Other, &[]);
            }
        }
    }

    fn exec_hash(&mut self, opcode: u8, digest_size: u64) {
        let Some(input) = self.pop_or_underflow(opcode) else {
            return;
        };
        self.stack.push(digest_size);
        self.charge_op(opcode, CostCategory::Hashing, &[input]);
    }

    /// OP_CHECKMULTISIG: pop the key-count marker, `n` keys, the
    /// sig-count marker, `m` signatures and the extra dummy item, then
    /// push the boolean result.
    ///
    /// `n` comes from the preceding literal when readable; `m` is never
    /// statically known, so the worst case `m = n` is assumed.
    fn exec_multisig(&mut self, opcode: u8, literal_before: Option<u64>) {
        if self.pop_or_underflow(opcode).is_none() {
            return;
        }
        let n = match literal_before {
            Some(value) if value <= MAX_PUBKEYS_PER_MULTISIG => value,
            _ => {
                self.estimate.warn(Warning::ConservativeEstimate {
                    opcode,
                    assumed: MAX_PUBKEYS_PER_MULTISIG,
                });
                MAX_PUBKEYS_PER_MULTISIG
            }
        };
        let m = n;

        // n pubkeys, sig-count marker, m signatures, dummy
        for _ in 0..n {
            if self.pop_or_underflow(opcode).is_none() {
                return;
            }
        }
        if self.pop_or_underflow(opcode).is_none() {
            return;
        }
        for _ in 0..m {
            if self.pop_or_underflow(opcode).is_none() {
                return;
            }
        }
        if self.pop_or_underflow(opcode).is_none() {
            return;
        }
        self.stack.push(1);

        let preimage = sighash_preimage_size(self.tx, self.input_index, SighashType::ALL);
        self.charge_op(opcode, CostCategory::Signatures, &[m, n, preimage]);
        self.estimate.signature_count += m as u32;
    }

    /// Merge the two arm stacks at ENDIF.
    ///
    /// Equal item counts join element-wise at the larger size; a count
    /// mismatch warns and adopts the larger arm wholesale.
    fn join_branch(&mut self, then_stack: SizeStack, else_stack: SizeStack) -> SizeStack {
        if then_stack.depth() == else_stack.depth() {
            let mut joined = SizeStack::new();
            for (a, b) in then_stack.items().iter().zip(else_stack.items()) {
                joined.push((*a).max(*b));
            }
            return joined;
        }

        self.estimate.warn(Warning::BranchStackMismatch {
            then_items: then_stack.depth() as u32,
            else_items: else_stack.depth() as u32,
        });
        if then_stack.depth() > else_stack.depth() {
            then_stack
        } else {
            else_stack
        }
    }
}
