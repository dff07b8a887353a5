//! Call frame encoding and decoding.

use bytes::BufMut;

use crate::codec::{tag, Reader, Writer};
use crate::error::HproseError;
use crate::types::Value;

/// One decoded method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<Value>,
    /// The caller requested by-reference semantics: possibly-mutated
    /// argument values must be echoed back.
    pub byref: bool,
}

/// Encodes one call frame body: `C <name> [ a<argc>{args} [t]? ]?`.
///
/// The terminating `z` (or the `C` of the next pipelined call) is appended
/// by the caller. Tables are reset between the name and argument portions so
/// class definitions do not bleed across.
pub fn encode_call(w: &mut Writer, name: &str, args: &[Value], byref: bool) {
    w.buf_mut().put_u8(tag::CALL);
    w.write_string(name);
    if !args.is_empty() || byref {
        w.reset();
        w.write_array(args);
        if byref {
            w.write_bool(true);
        }
    }
}

/// Decodes one call of a request frame, after its `C` tag has been
/// consumed. Returns the invocation and whether another pipelined call
/// follows.
pub fn decode_call(r: &mut Reader<'_>) -> Result<(Invocation, bool), HproseError> {
    r.reset();
    let name = r.read_string()?.ok_or_else(|| HproseError::Conversion {
        from: "nil".to_string(),
        to: "method name".to_string(),
    })?;

    let mut args = Vec::new();
    let mut byref = false;
    let mut t = r.check_tags(&[tag::LIST, tag::END, tag::CALL])?;
    if t == tag::LIST {
        r.reset();
        let count = r.read_count(tag::OPENBRACE)?;
        args = r.read_arguments(count)?;
        t = r.check_tags(&[tag::TRUE, tag::END, tag::CALL])?;
        if t == tag::TRUE {
            byref = true;
            t = r.check_tags(&[tag::END, tag::CALL])?;
        }
    }

    Ok((Invocation { name, args, byref }, t == tag::CALL))
}
