//! The Hprose RPC envelope.
//!
//! The outermost wire grammar; every body inside it is a codec value.
//!
//! - Call frame: `C <name> [ a<argc>{ <arg>... } [ t ]? ]? z`, with
//!   pipelining by replacing the trailing `z` of each call but the last
//!   with the next `C`.
//! - Response frame: `( R <value> [ A a<n>{ <outarg>... } ]? )+ z`, or
//!   `E <message> z` on failure.
//! - Discovery frame: a bare-`z` request is answered with
//!   `F <string[]:methodnames> z`.

pub mod request;
pub mod response;

pub use request::{decode_call, encode_call, Invocation};
pub use response::{decode_function_list, decode_reply, Reply};

/// How a service method's return value travels in the response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultMode {
    /// The service serializes each returned value through the codec.
    #[default]
    Normal,
    /// The method returns a pre-serialized payload, placed verbatim after
    /// the `R` tag.
    Serialized,
    /// The method returns the response body verbatim; the envelope appends
    /// the terminating `z`.
    Raw,
    /// As `Raw`, but the returned bytes already include the terminating `z`
    /// and the envelope adds nothing.
    RawWithEndTag,
}
