//! Response frame decoding (client side).

use bytes::{BufMut, BytesMut};

use super::ResultMode;
use crate::codec::{tag, Reader};
use crate::error::HproseError;
use crate::types::{FromValue, Value};

/// A decoded service response.
#[derive(Debug)]
pub struct Reply {
    /// The decoded result in [`ResultMode::Normal`]; a multi-result method
    /// arrives as a list value. `Null` in the raw modes.
    pub result: Value,
    /// Echoed (possibly mutated) arguments of a by-ref call.
    pub args: Option<Vec<Value>>,
    /// The undecoded payload in the non-`Normal` modes.
    pub raw: Option<BytesMut>,
}

/// Decodes one response frame according to the requested result mode.
///
/// An `E` frame surfaces as [`HproseError::User`] carrying the message; in
/// the raw modes it is captured verbatim instead.
pub fn decode_reply(data: &[u8], mode: ResultMode) -> Result<Reply, HproseError> {
    let mut r = Reader::new(data);
    let mut raw = BytesMut::new();
    let mut result = Value::Null;
    let mut args = None;

    loop {
        let t = r.check_tags(&[tag::RESULT, tag::ARGUMENT, tag::ERROR, tag::END])?;
        match t {
            tag::RESULT => match mode {
                ResultMode::Normal => {
                    r.reset();
                    result = r.read_value()?;
                }
                ResultMode::Serialized => {
                    r.read_raw_to(&mut raw)?;
                }
                ResultMode::Raw | ResultMode::RawWithEndTag => {
                    raw.put_u8(tag::RESULT);
                    r.read_raw_to(&mut raw)?;
                }
            },
            tag::ARGUMENT => match mode {
                ResultMode::Normal | ResultMode::Serialized => {
                    r.reset();
                    r.check_tag(tag::LIST)?;
                    let count = r.read_count(tag::OPENBRACE)?;
                    args = Some(r.read_arguments(count)?);
                }
                ResultMode::Raw | ResultMode::RawWithEndTag => {
                    raw.put_u8(tag::ARGUMENT);
                    r.read_raw_to(&mut raw)?;
                }
            },
            tag::ERROR => match mode {
                ResultMode::Normal | ResultMode::Serialized => {
                    r.reset();
                    let message = r.read_string()?.unwrap_or_default();
                    r.check_tag(tag::END)?;
                    return Err(HproseError::User(message));
                }
                ResultMode::Raw | ResultMode::RawWithEndTag => {
                    raw.put_u8(tag::ERROR);
                    r.read_raw_to(&mut raw)?;
                }
            },
            _ => break,
        }
    }

    match mode {
        ResultMode::Normal => Ok(Reply {
            result,
            args,
            raw: None,
        }),
        ResultMode::Serialized => Ok(Reply {
            result: Value::Null,
            args,
            raw: Some(raw),
        }),
        ResultMode::Raw => Ok(Reply {
            result: Value::Null,
            args: None,
            raw: Some(raw),
        }),
        ResultMode::RawWithEndTag => {
            raw.put_u8(tag::END);
            Ok(Reply {
                result: Value::Null,
                args: None,
                raw: Some(raw),
            })
        }
    }
}

/// Decodes a discovery frame: `F <string[]:methodnames> z`.
pub fn decode_function_list(data: &[u8]) -> Result<Vec<String>, HproseError> {
    let mut r = Reader::new(data);
    r.check_tag(tag::FUNCTIONS)?;
    let names: Vec<String> = FromValue::from_value(r.read_value()?)?;
    r.check_tag(tag::END)?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_normal_result() {
        let reply = decode_reply(b"Rs12\"Hello World!\"z", ResultMode::Normal).unwrap();
        assert_eq!(reply.result, Value::from("Hello World!"));
        assert!(reply.args.is_none());
        assert!(reply.raw.is_none());
    }

    #[test]
    fn decode_error_frame() {
        let err = decode_reply(b"Es4\"boom\"z", ResultMode::Normal).unwrap_err();
        assert!(matches!(err, HproseError::User(m) if m == "boom"));
    }

    #[test]
    fn decode_byref_echo() {
        let reply = decode_reply(b"R1Aa2{23}z", ResultMode::Normal).unwrap();
        assert_eq!(reply.result, Value::Int(1));
        assert_eq!(reply.args, Some(vec![Value::Int(2), Value::Int(3)]));
    }

    #[test]
    fn serialized_mode_captures_result_bytes() {
        let reply = decode_reply(b"Rs2\"hi\"z", ResultMode::Serialized).unwrap();
        assert_eq!(&reply.raw.unwrap()[..], b"s2\"hi\"");
    }

    #[test]
    fn raw_mode_captures_frame_without_end() {
        let reply = decode_reply(b"Rs2\"hi\"z", ResultMode::Raw).unwrap();
        assert_eq!(&reply.raw.unwrap()[..], b"Rs2\"hi\"");
    }

    #[test]
    fn raw_with_end_tag_appends_end() {
        let reply = decode_reply(b"Rs2\"hi\"z", ResultMode::RawWithEndTag).unwrap();
        assert_eq!(&reply.raw.unwrap()[..], b"Rs2\"hi\"z");
    }

    #[test]
    fn raw_mode_captures_error_frames_verbatim() {
        let reply = decode_reply(b"Es4\"boom\"z", ResultMode::Raw).unwrap();
        assert_eq!(&reply.raw.unwrap()[..], b"Es4\"boom\"");
    }

    #[test]
    fn decode_function_list_frame() {
        let names = decode_function_list(b"Fa2{s5\"hello\"s4\"swap\"}z").unwrap();
        assert_eq!(names, vec!["hello", "swap"]);
    }

    #[test]
    fn stray_tag_rejected() {
        assert!(matches!(
            decode_reply(b"Q", ResultMode::Normal),
            Err(HproseError::UnexpectedTag { .. })
        ));
    }
}
