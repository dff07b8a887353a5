//! Hprose tag byte constants.
//!
//! Every serialized value and every structural marker begins with exactly one
//! of these ASCII bytes. They are the wire contract and must match other
//! Hprose implementations bit-exactly.

// Value openers.
// Digits '0'..='9' open single-digit integers directly.
pub const INTEGER: u8 = b'i';
pub const LONG: u8 = b'l';
pub const DOUBLE: u8 = b'd';
pub const NAN: u8 = b'N';
pub const INFINITY: u8 = b'I';
pub const NULL: u8 = b'n';
pub const EMPTY: u8 = b'e';
pub const TRUE: u8 = b't';
pub const FALSE: u8 = b'f';
pub const DATE: u8 = b'D';
pub const TIME: u8 = b'T';
pub const BYTES: u8 = b'b';
pub const UTF8_CHAR: u8 = b'u';
pub const STRING: u8 = b's';
pub const GUID: u8 = b'g';
pub const LIST: u8 = b'a';
pub const MAP: u8 = b'm';
pub const CLASS: u8 = b'c';
pub const OBJECT: u8 = b'o';
pub const REF: u8 = b'r';
pub const ERROR: u8 = b'E';

// Separators.
pub const SEMICOLON: u8 = b';';
pub const QUOTE: u8 = b'"';
pub const OPENBRACE: u8 = b'{';
pub const CLOSEBRACE: u8 = b'}';
pub const POINT: u8 = b'.';
pub const UTC: u8 = b'Z';
pub const POS: u8 = b'+';
pub const NEG: u8 = b'-';

// Envelope markers.
pub const CALL: u8 = b'C';
pub const RESULT: u8 = b'R';
pub const ARGUMENT: u8 = b'A';
pub const FUNCTIONS: u8 = b'F';
pub const END: u8 = b'z';
