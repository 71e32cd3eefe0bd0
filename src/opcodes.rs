//! Script opcode constants
//!
//! Opcode byte values for the estimator's script language, with the
//! re-enabled byte operations at 0x7e-0x81 (OP_CAT, OP_SPLIT,
//! OP_NUM2BIN, OP_BIN2NUM). Cost-model files key opcodes by mnemonic,
//! so a name table and both lookup directions live here too.

// ============================================================================
// PUSH DATA OPCODES (0x00 - 0x4e)
// ============================================================================

/// OP_0 / OP_FALSE - Push empty array
pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = 0x00;

/// OP_PUSHDATA1 - Push next byte as data length
pub const OP_PUSHDATA1: u8 = 0x4c;

/// OP_PUSHDATA2 - Push next 2 bytes (little-endian) as data length
pub const OP_PUSHDATA2: u8 = 0x4d;

/// OP_PUSHDATA4 - Push next 4 bytes (little-endian) as data length
pub const OP_PUSHDATA4: u8 = 0x4e;

// ============================================================================
// PUSH VALUE OPCODES (0x4f - 0x60)
// ============================================================================

/// OP_1NEGATE - Push -1 onto stack
pub const OP_1NEGATE: u8 = 0x4f;

/// OP_RESERVED - Reserved opcode
pub const OP_RESERVED: u8 = 0x50;

/// OP_1 / OP_TRUE - Push 1 onto stack
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = 0x51;

/// OP_2 - Push 2 onto stack
pub const OP_2: u8 = 0x52;

/// OP_3 - Push 3 onto stack
pub const OP_3: u8 = 0x53;

/// OP_4 - Push 4 onto stack
pub const OP_4: u8 = 0x54;

/// OP_5 - Push 5 onto stack
pub const OP_5: u8 = 0x55;

/// OP_6 - Push 6 onto stack
pub const OP_6: u8 = 0x56;

/// OP_7 - Push 7 onto stack
pub const OP_7: u8 = 0x57;

/// OP_8 - Push 8 onto stack
pub const OP_8: u8 = 0x58;

/// OP_9 - Push 9 onto stack
pub const OP_9: u8 = 0x59;

/// OP_10 - Push 10 onto stack
pub const OP_10: u8 = 0x5a;

/// OP_11 - Push 11 onto stack
pub const OP_11: u8 = 0x5b;

/// OP_12 - Push 12 onto stack
pub const OP_12: u8 = 0x5c;

/// OP_13 - Push 13 onto stack
pub const OP_13: u8 = 0x5d;

/// OP_14 - Push 14 onto stack
pub const OP_14: u8 = 0x5e;

/// OP_15 - Push 15 onto stack
pub const OP_15: u8 = 0x5f;

/// OP_16 - Push 16 onto stack
pub const OP_16: u8 = 0x60;

// ============================================================================
// CONTROL FLOW OPCODES (0x61 - 0x6a)
// ============================================================================

/// OP_NOP - No operation
pub const OP_NOP: u8 = 0x61;

/// OP_VER - Reserved opcode
pub const OP_VER: u8 = 0x62;

/// OP_IF - If top stack value is true, statements are executed
pub const OP_IF: u8 = 0x63;

/// OP_NOTIF - If top stack value is false, statements are executed
pub const OP_NOTIF: u8 = 0x64;

/// OP_VERIF - Reserved opcode
pub const OP_VERIF: u8 = 0x65;

/// OP_VERNOTIF - Reserved opcode
pub const OP_VERNOTIF: u8 = 0x66;

/// OP_ELSE - Executed if the preceding OP_IF/OP_NOTIF arm was not
pub const OP_ELSE: u8 = 0x67;

/// OP_ENDIF - Ends an OP_IF/OP_NOTIF/OP_ELSE block
pub const OP_ENDIF: u8 = 0x68;

/// OP_VERIFY - Fails script if top stack value is not true
pub const OP_VERIFY: u8 = 0x69;

/// OP_RETURN - Terminates script; remainder is data
pub const OP_RETURN: u8 = 0x6a;

// ============================================================================
// STACK OPERATIONS (0x6b - 0x7d)
// ============================================================================

/// OP_TOALTSTACK - Move top item to the alt stack
pub const OP_TOALTSTACK: u8 = 0x6b;

/// OP_FROMALTSTACK - Move top alt-stack item back to the main stack
pub const OP_FROMALTSTACK: u8 = 0x6c;

/// OP_2DROP - Removes the top two stack items
pub const OP_2DROP: u8 = 0x6d;

/// OP_2DUP - Duplicates the top two stack items
pub const OP_2DUP: u8 = 0x6e;

/// OP_3DUP - Duplicates the top three stack items
pub const OP_3DUP: u8 = 0x6f;

/// OP_2OVER - Copies the pair of items two spaces back to the front
pub const OP_2OVER: u8 = 0x70;

/// OP_2ROT - The fifth and sixth items back are moved to the top
pub const OP_2ROT: u8 = 0x71;

/// OP_2SWAP - Swaps the top two pairs of items
pub const OP_2SWAP: u8 = 0x72;

/// OP_IFDUP - If the top stack value is not 0, duplicate it
pub const OP_IFDUP: u8 = 0x73;

/// OP_DEPTH - Puts the number of stack items onto the stack
pub const OP_DEPTH: u8 = 0x74;

/// OP_DROP - Removes the top stack item
pub const OP_DROP: u8 = 0x75;

/// OP_DUP - Duplicates the top stack item
pub const OP_DUP: u8 = 0x76;

/// OP_NIP - Removes the second-to-top stack item
pub const OP_NIP: u8 = 0x77;

/// OP_OVER - Copies the second-to-top stack item to the top
pub const OP_OVER: u8 = 0x78;

/// OP_PICK - The item n back in the stack is copied to the top
pub const OP_PICK: u8 = 0x79;

/// OP_ROLL - The item n back in the stack is moved to the top
pub const OP_ROLL: u8 = 0x7a;

/// OP_ROT - The top three items on the stack are rotated to the left
pub const OP_ROT: u8 = 0x7b;

/// OP_SWAP - The top two items on the stack are swapped
pub const OP_SWAP: u8 = 0x7c;

/// OP_TUCK - Top item is copied and inserted below the second-to-top
pub const OP_TUCK: u8 = 0x7d;

// ============================================================================
// BYTE OPERATIONS (0x7e - 0x82)
// ============================================================================

/// OP_CAT - Concatenates two byte strings
pub const OP_CAT: u8 = 0x7e;

/// OP_SPLIT - Splits a byte string at a given position
pub const OP_SPLIT: u8 = 0x7f;

/// OP_NUM2BIN - Converts a numeric value into a byte string of given length
pub const OP_NUM2BIN: u8 = 0x80;

/// OP_BIN2NUM - Converts a byte string into a minimally-encoded numeric
pub const OP_BIN2NUM: u8 = 0x81;

/// OP_SIZE - Pushes the byte length of the top element (without popping it)
pub const OP_SIZE: u8 = 0x82;

// ============================================================================
// BITWISE LOGIC (0x83 - 0x8a)
// ============================================================================

/// OP_INVERT - Flips all of the bits in the input
pub const OP_INVERT: u8 = 0x83;

/// OP_AND - Boolean AND between each bit in the inputs
pub const OP_AND: u8 = 0x84;

/// OP_OR - Boolean OR between each bit in the inputs
pub const OP_OR: u8 = 0x85;

/// OP_XOR - Boolean exclusive OR between each bit in the inputs
pub const OP_XOR: u8 = 0x86;

/// OP_EQUAL - Returns 1 if the inputs are exactly equal, 0 otherwise
pub const OP_EQUAL: u8 = 0x87;

/// OP_EQUALVERIFY - Same as OP_EQUAL, but runs OP_VERIFY afterward
pub const OP_EQUALVERIFY: u8 = 0x88;

/// OP_RESERVED1 - Reserved opcode
pub const OP_RESERVED1: u8 = 0x89;

/// OP_RESERVED2 - Reserved opcode
pub const OP_RESERVED2: u8 = 0x8a;

// ============================================================================
// NUMERIC OPERATIONS (0x8b - 0xa5)
// ============================================================================

/// OP_1ADD - 1 is added to the input
pub const OP_1ADD: u8 = 0x8b;

/// OP_1SUB - 1 is subtracted from the input
pub const OP_1SUB: u8 = 0x8c;

/// OP_2MUL - The input is multiplied by 2 (disabled)
pub const OP_2MUL: u8 = 0x8d;

/// OP_2DIV - The input is divided by 2 (disabled)
pub const OP_2DIV: u8 = 0x8e;

/// OP_NEGATE - The sign of the input is flipped
pub const OP_NEGATE: u8 = 0x8f;

/// OP_ABS - The input is made positive
pub const OP_ABS: u8 = 0x90;

/// OP_NOT - If the input is 0 or 1, it is flipped. Otherwise the output is 0
pub const OP_NOT: u8 = 0x91;

/// OP_0NOTEQUAL - Returns 0 if the input is 0, 1 otherwise
pub const OP_0NOTEQUAL: u8 = 0x92;

/// OP_ADD - a is added to b
pub const OP_ADD: u8 = 0x93;

/// OP_SUB - b is subtracted from a
pub const OP_SUB: u8 = 0x94;

/// OP_MUL - a is multiplied by b
pub const OP_MUL: u8 = 0x95;

/// OP_DIV - a is divided by b
pub const OP_DIV: u8 = 0x96;

/// OP_MOD - Returns the remainder after dividing a by b
pub const OP_MOD: u8 = 0x97;

/// OP_LSHIFT - Shifts a left b bits
pub const OP_LSHIFT: u8 = 0x98;

/// OP_RSHIFT - Shifts a right b bits
pub const OP_RSHIFT: u8 = 0x99;

/// OP_BOOLAND - If both a and b are not 0, the output is 1. Otherwise 0
pub const OP_BOOLAND: u8 = 0x9a;

/// OP_BOOLOR - If a or b is not 0, the output is 1. Otherwise 0
pub const OP_BOOLOR: u8 = 0x9b;

/// OP_NUMEQUAL - Returns 1 if the numbers are equal, 0 otherwise
pub const OP_NUMEQUAL: u8 = 0x9c;

/// OP_NUMEQUALVERIFY - Same as OP_NUMEQUAL, but runs OP_VERIFY afterward
pub const OP_NUMEQUALVERIFY: u8 = 0x9d;

/// OP_NUMNOTEQUAL - Returns 1 if the numbers are not equal, 0 otherwise
pub const OP_NUMNOTEQUAL: u8 = 0x9e;

/// OP_LESSTHAN - Returns 1 if a is less than b, 0 otherwise
pub const OP_LESSTHAN: u8 = 0x9f;

/// OP_GREATERTHAN - Returns 1 if a is greater than b, 0 otherwise
pub const OP_GREATERTHAN: u8 = 0xa0;

/// OP_LESSTHANOREQUAL - Returns 1 if a <= b, 0 otherwise
pub const OP_LESSTHANOREQUAL: u8 = 0xa1;

/// OP_GREATERTHANOREQUAL - Returns 1 if a >= b, 0 otherwise
pub const OP_GREATERTHANOREQUAL: u8 = 0xa2;

/// OP_MIN - Returns the smaller of a and b
pub const OP_MIN: u8 = 0xa3;

/// OP_MAX - Returns the larger of a and b
pub const OP_MAX: u8 = 0xa4;

/// OP_WITHIN - Returns 1 if x is within the specified range, 0 otherwise
pub const OP_WITHIN: u8 = 0xa5;

// ============================================================================
// CRYPTOGRAPHIC OPERATIONS (0xa6 - 0xaf)
// ============================================================================

/// OP_RIPEMD160 - The input is hashed using RIPEMD-160
pub const OP_RIPEMD160: u8 = 0xa6;

/// OP_SHA1 - The input is hashed using SHA-1
pub const OP_SHA1: u8 = 0xa7;

/// OP_SHA256 - The input is hashed using SHA-256
pub const OP_SHA256: u8 = 0xa8;

/// OP_HASH160 - The input is hashed with SHA-256 and then RIPEMD-160
pub const OP_HASH160: u8 = 0xa9;

/// OP_HASH256 - The input is hashed two times with SHA-256
pub const OP_HASH256: u8 = 0xaa;

/// OP_CODESEPARATOR - Marks the start of signed script data
pub const OP_CODESEPARATOR: u8 = 0xab;

/// OP_CHECKSIG - Verifies a signature against the transaction preimage
pub const OP_CHECKSIG: u8 = 0xac;

/// OP_CHECKSIGVERIFY - Same as OP_CHECKSIG, but OP_VERIFY is executed afterward
pub const OP_CHECKSIGVERIFY: u8 = 0xad;

/// OP_CHECKMULTISIG - Verifies m of n signatures against public keys
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// OP_CHECKMULTISIGVERIFY - Same as OP_CHECKMULTISIG, plus OP_VERIFY
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

// ============================================================================
// NOP OPCODES (0xb0 - 0xb9)
// ============================================================================

/// OP_NOP1 - Reserved for future use
pub const OP_NOP1: u8 = 0xb0;

/// OP_NOP2 - Reserved for future use
pub const OP_NOP2: u8 = 0xb1;

/// OP_NOP3 - Reserved for future use
pub const OP_NOP3: u8 = 0xb2;

/// OP_NOP4 - Reserved for future use
pub const OP_NOP4: u8 = 0xb3;

/// OP_NOP5 - Reserved for future use
pub const OP_NOP5: u8 = 0xb4;

/// OP_NOP6 - Reserved for future use
pub const OP_NOP6: u8 = 0xb5;

/// OP_NOP7 - Reserved for future use
pub const OP_NOP7: u8 = 0xb6;

/// OP_NOP8 - Reserved for future use
pub const OP_NOP8: u8 = 0xb7;

/// OP_NOP9 - Reserved for future use
pub const OP_NOP9: u8 = 0xb8;

/// OP_NOP10 - Reserved for future use
pub const OP_NOP10: u8 = 0xb9;

// ============================================================================
// HELPER CONSTANTS
// ============================================================================

/// Base value for OP_1 through OP_16 (OP_1 = 0x50 + 1 = 0x51)
pub const OP_N_BASE: u8 = 0x50;

/// Largest direct-push opcode (pushes exactly `opcode` bytes)
pub const MAX_DIRECT_PUSH: u8 = 0x4b;

/// Mnemonic table for every named opcode, used to resolve cost-model
/// file keys and to render diagnostics.
const OPCODE_NAMES: &[(u8, &str)] = &[
    (OP_0, "OP_0"),
    (OP_PUSHDATA1, "OP_PUSHDATA1"),
    (OP_PUSHDATA2, "OP_PUSHDATA2"),
    (OP_PUSHDATA4, "OP_PUSHDATA4"),
    (OP_1NEGATE, "OP_1NEGATE"),
    (OP_RESERVED, "OP_RESERVED"),
    (OP_1, "OP_1"),
    (OP_2, "OP_2"),
    (OP_3, "OP_3"),
    (OP_4, "OP_4"),
    (OP_5, "OP_5"),
    (OP_6, "OP_6"),
    (OP_7, "OP_7"),
    (OP_8, "OP_8"),
    (OP_9, "OP_9"),
    (OP_10, "OP_10"),
    (OP_11, "OP_11"),
    (OP_12, "OP_12"),
    (OP_13, "OP_13"),
    (OP_14, "OP_14"),
    (OP_15, "OP_15"),
    (OP_16, "OP_16"),
    (OP_NOP, "OP_NOP"),
    (OP_VER, "OP_VER"),
    (OP_IF, "OP_IF"),
    (OP_NOTIF, "OP_NOTIF"),
    (OP_VERIF, "OP_VERIF"),
    (OP_VERNOTIF, "OP_VERNOTIF"),
    (OP_ELSE, "OP_ELSE"),
    (OP_ENDIF, "OP_ENDIF"),
    (OP_VERIFY, "OP_VERIFY"),
    (OP_RETURN, "OP_RETURN"),
    (OP_TOALTSTACK, "OP_TOALTSTACK"),
    (OP_FROMALTSTACK, "OP_FROMALTSTACK"),
    (OP_2DROP, "OP_2DROP"),
    (OP_2DUP, "OP_2DUP"),
    (OP_3DUP, "OP_3DUP"),
    (OP_2OVER, "OP_2OVER"),
    (OP_2ROT, "OP_2ROT"),
    (OP_2SWAP, "OP_2SWAP"),
    (OP_IFDUP, "OP_IFDUP"),
    (OP_DEPTH, "OP_DEPTH"),
    (OP_DROP, "OP_DROP"),
    (OP_DUP, "OP_DUP"),
    (OP_NIP, "OP_NIP"),
    (OP_OVER, "OP_OVER"),
    (OP_PICK, "OP_PICK"),
    (OP_ROLL, "OP_ROLL"),
    (OP_ROT, "OP_ROT"),
    (OP_SWAP, "OP_SWAP"),
    (OP_TUCK, "OP_TUCK"),
    (OP_CAT, "OP_CAT"),
    (OP_SPLIT, "OP_SPLIT"),
    (OP_NUM2BIN, "OP_NUM2BIN"),
    (OP_BIN2NUM, "OP_BIN2NUM"),
    (OP_SIZE, "OP_SIZE"),
    (OP_INVERT, "OP_INVERT"),
    (OP_AND, "OP_AND"),
    (OP_OR, "OP_OR"),
    (OP_XOR, "OP_XOR"),
    (OP_EQUAL, "OP_EQUAL"),
    (OP_EQUALVERIFY, "OP_EQUALVERIFY"),
    (OP_RESERVED1, "OP_RESERVED1"),
    (OP_RESERVED2, "OP_RESERVED2"),
    (OP_1ADD, "OP_1ADD"),
    (OP_1SUB, "OP_1SUB"),
    (OP_2MUL, "OP_2MUL"),
    (OP_2DIV, "OP_2DIV"),
    (OP_NEGATE, "OP_NEGATE"),
    (OP_ABS, "OP_ABS"),
    (OP_NOT, "OP_NOT"),
    (OP_0NOTEQUAL, "OP_0NOTEQUAL"),
    (OP_ADD, "OP_ADD"),
    (OP_SUB, "OP_SUB"),
    (OP_MUL, "OP_MUL"),
    (OP_DIV, "OP_DIV"),
    (OP_MOD, "OP_MOD"),
    (OP_LSHIFT, "OP_LSHIFT"),
    (OP_RSHIFT, "OP_RSHIFT"),
    (OP_BOOLAND, "OP_BOOLAND"),
    (OP_BOOLOR, "OP_BOOLOR"),
    (OP_NUMEQUAL, "OP_NUMEQUAL"),
    (OP_NUMEQUALVERIFY, "OP_NUMEQUALVERIFY"),
    (OP_NUMNOTEQUAL, "OP_NUMNOTEQUAL"),
    (OP_LESSTHAN, "OP_LESSTHAN"),
    (OP_GREATERTHAN, "OP_GREATERTHAN"),
    (OP_LESSTHANOREQUAL, "OP_LESSTHANOREQUAL"),
    (OP_GREATERTHANOREQUAL, "OP_GREATERTHANOREQUAL"),
    (OP_MIN, "OP_MIN"),
    (OP_MAX, "OP_MAX"),
    (OP_WITHIN, "OP_WITHIN"),
    (OP_RIPEMD160, "OP_RIPEMD160"),
    (OP_SHA1, "OP_SHA1"),
    (OP_SHA256, "OP_SHA256"),
    (OP_HASH160, "OP_HASH160"),
    (OP_HASH256, "OP_HASH256"),
    (OP_CODESEPARATOR, "OP_CODESEPARATOR"),
    (OP_CHECKSIG, "OP_CHECKSIG"),
    (OP_CHECKSIGVERIFY, "OP_CHECKSIGVERIFY"),
    (OP_CHECKMULTISIG, "OP_CHECKMULTISIG"),
    (OP_CHECKMULTISIGVERIFY, "OP_CHECKMULTISIGVERIFY"),
    (OP_NOP1, "OP_NOP1"),
    (OP_NOP2, "OP_NOP2"),
    (OP_NOP3, "OP_NOP3"),
    (OP_NOP4, "OP_NOP4"),
    (OP_NOP5, "OP_NOP5"),
    (OP_NOP6, "OP_NOP6"),
    (OP_NOP7, "OP_NOP7"),
    (OP_NOP8, "OP_NOP8"),
    (OP_NOP9, "OP_NOP9"),
    (OP_NOP10, "OP_NOP10"),
];

/// Mnemonic for an opcode byte, if it has one.
///
/// Direct-push opcodes (0x01-0x4b) have no mnemonic; they are lengths.
pub fn opcode_name(opcode: u8) -> Option<&'static str> {
    OPCODE_NAMES
        .iter()
        .find(|(byte, _)| *byte == opcode)
        .map(|(_, name)| *name)
}

/// Opcode byte for a mnemonic, used when resolving cost-model file keys.
pub fn opcode_from_name(name: &str) -> Option<u8> {
    OPCODE_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(byte, _)| *byte)
}
