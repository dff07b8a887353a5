//! Error types for the Hprose protocol.

use std::io;

/// Errors that can occur during Hprose codec and RPC operations.
#[derive(Debug, thiserror::Error)]
pub enum HproseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{}", unexpected_tag_message(.found, .expected))]
    UnexpectedTag {
        found: u8,
        /// The tags that were acceptable at this grammar position, empty if
        /// any value opener was acceptable.
        expected: Vec<u8>,
    },

    #[error("cannot convert {from} to type {to}")]
    Conversion { from: String, to: String },

    #[error("bad utf-8 encoding")]
    BadUtf8,

    #[error("reference {0} does not resolve in this stream")]
    DanglingReference(usize),

    #[error("can't find method {0}")]
    MissingMethod(String),

    #[error("{0}")]
    User(String),
}

impl HproseError {
    /// An unexpected tag with no particular expected set.
    pub fn unexpected(found: u8) -> Self {
        Self::UnexpectedTag {
            found,
            expected: Vec::new(),
        }
    }

    /// An unexpected tag at a position where only `expected` are valid.
    pub fn expected(expected: &[u8], found: u8) -> Self {
        Self::UnexpectedTag {
            found,
            expected: expected.to_vec(),
        }
    }

    /// A conversion failure from the value kind opened by `tag` to `to`.
    pub fn cannot_convert(tag: u8, to: &str) -> Self {
        Self::Conversion {
            from: tag_type_name(tag).to_string(),
            to: to.to_string(),
        }
    }

    /// Wraps any displayable error as a user error.
    pub fn user(e: impl std::fmt::Display) -> Self {
        Self::User(e.to_string())
    }
}

fn unexpected_tag_message(found: &u8, expected: &[u8]) -> String {
    let t = char::from(*found);
    if expected.is_empty() {
        format!("unexpected serialize tag '{t}' in stream")
    } else {
        let e: String = expected.iter().map(|&b| char::from(b)).collect();
        format!("tag '{e}' expected, but '{t}' found in stream")
    }
}

/// Human-readable name of the value kind a tag opens, used in conversion
/// error messages.
pub(crate) fn tag_type_name(tag: u8) -> &'static str {
    use crate::codec::tag;
    match tag {
        b'0'..=b'9' | tag::INTEGER => "int",
        tag::LONG => "big int",
        tag::DOUBLE => "double",
        tag::NULL => "nil",
        tag::EMPTY => "empty string",
        tag::TRUE => "bool true",
        tag::FALSE => "bool false",
        tag::NAN => "NaN",
        tag::INFINITY => "Infinity",
        tag::DATE | tag::TIME => "time",
        tag::BYTES => "bytes",
        tag::UTF8_CHAR | tag::STRING => "string",
        tag::GUID => "guid",
        tag::LIST => "list",
        tag::MAP => "map",
        tag::CLASS => "class",
        tag::OBJECT => "object",
        tag::REF => "value reference",
        tag::ERROR => "error",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tag;

    #[test]
    fn unexpected_message_without_expected_set() {
        let err = HproseError::unexpected(b'x');
        assert_eq!(err.to_string(), "unexpected serialize tag 'x' in stream");
    }

    #[test]
    fn unexpected_message_with_expected_set() {
        let err = HproseError::expected(&[tag::LIST, tag::END], b'q');
        assert_eq!(err.to_string(), "tag 'az' expected, but 'q' found in stream");
    }

    #[test]
    fn conversion_message_names_tag_kind() {
        let err = HproseError::cannot_convert(tag::MAP, "i64");
        assert_eq!(err.to_string(), "cannot convert map to type i64");
    }
}
