//! Transport-agnostic request handling: one request frame in, one response
//! frame out.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bytes::{BufMut, BytesMut};

use crate::codec::{tag, Encodable, Reader, Writer};
use crate::error::HproseError;
use crate::message::request::decode_call;
use crate::message::ResultMode;
use crate::service::methods::{Arity, Method, MethodOptions, Methods};
use crate::types::Value;

/// Observation hooks around service dispatch. IO errors during response
/// write are reported through [`ServiceEvent::on_send_error`] rather than
/// aborting the host.
pub trait ServiceEvent: Send + Sync {
    fn on_before_invoke(&self, _name: &str, _args: &[Value], _byref: bool) {}
    fn on_after_invoke(&self, _name: &str, _args: &[Value], _byref: bool, _result: &[Value]) {}
    fn on_send_error(&self, _error: &HproseError) {}
}

/// An Hprose service: a method registry plus the request/response contract.
///
/// `handle` is synchronous and transport-agnostic; the TCP host in
/// [`crate::service::Server`] feeds it one frame at a time, and any other
/// byte-stream provider can do the same.
#[derive(Default)]
pub struct Service {
    pub methods: Methods,
    event: Option<Arc<dyn ServiceEvent>>,
}

impl Service {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the event hooks.
    pub fn event(&mut self, event: impl ServiceEvent + 'static) {
        self.event = Some(Arc::new(event));
    }

    /// Registers a function under `name`. See [`Methods::add_function`].
    pub fn add_function<F>(&mut self, name: &str, arity: Arity, options: MethodOptions, f: F)
    where
        F: Fn(&mut Vec<Value>) -> Result<Vec<Value>, HproseError> + Send + Sync + 'static,
    {
        self.methods.add_function(name, arity, options, f);
    }

    /// Registers the catch-all method.
    pub fn add_missing_method<F>(&mut self, options: MethodOptions, f: F)
    where
        F: Fn(&str, &mut Vec<Value>) -> Result<Vec<Value>, HproseError> + Send + Sync + 'static,
    {
        self.methods.add_missing_method(options, f);
    }

    /// Processes one request frame and produces the response frame. Never
    /// fails: every error becomes an `E` frame.
    pub fn handle(&self, request: &[u8]) -> BytesMut {
        match request.first() {
            Some(&tag::CALL) => self
                .do_invoke(&request[1..])
                .unwrap_or_else(|e| self.error_frame(&e)),
            Some(&tag::END) => self.function_list(),
            Some(&other) => self.error_frame(&HproseError::unexpected(other)),
            None => self.error_frame(&HproseError::User("empty request".to_string())),
        }
    }

    pub(crate) fn report_send_error(&self, error: &HproseError) {
        if let Some(event) = &self.event {
            event.on_send_error(error);
        }
    }

    fn do_invoke(&self, body: &[u8]) -> Result<BytesMut, HproseError> {
        let mut reader = Reader::new(body);
        let mut buf = BytesMut::new();
        loop {
            let (call, more) = decode_call(&mut reader)?;
            let direct = self.methods.get(&call.name);
            let mut args = call.args;
            if let Some(method) = &direct {
                shape_args(method.arity, &mut args);
            }

            if let Some(event) = &self.event {
                event.on_before_invoke(&call.name, &args, call.byref);
            }

            let method = match &direct {
                Some(m) => m.clone(),
                None => self
                    .methods
                    .missing_method()
                    .ok_or_else(|| HproseError::MissingMethod(call.name.clone()))?,
            };
            let result = invoke(&method, &call.name, &mut args)?;

            if let Some(event) = &self.event {
                event.on_after_invoke(&call.name, &args, call.byref, &result);
            }

            if method.result_mode != ResultMode::Normal {
                let data = raw_payload(&result)?;
                if method.result_mode == ResultMode::RawWithEndTag {
                    // The payload already carries its own end tag and
                    // replaces the whole response.
                    return Ok(BytesMut::from(&data[..]));
                }
                if method.result_mode == ResultMode::Raw {
                    buf.put_slice(&data);
                } else {
                    let mut w = self.writer_for(&method);
                    w.buf_mut().put_u8(tag::RESULT);
                    w.buf_mut().put_slice(&data);
                    self.echo_args(&mut w, call.byref, &args);
                    buf.put_slice(w.bytes());
                }
            } else {
                let mut w = self.writer_for(&method);
                w.buf_mut().put_u8(tag::RESULT);
                match result.len() {
                    0 => w.write_null(),
                    1 => w.serialize(&result[0]),
                    _ => w.write_array(&result),
                }
                self.echo_args(&mut w, call.byref, &args);
                buf.put_slice(w.bytes());
            }

            if !more {
                break;
            }
        }
        buf.put_u8(tag::END);
        Ok(buf)
    }

    fn writer_for(&self, method: &Method) -> Writer {
        if method.simple {
            Writer::new_simple()
        } else {
            Writer::new()
        }
    }

    fn echo_args(&self, w: &mut Writer, byref: bool, args: &[Value]) {
        if byref {
            w.buf_mut().put_u8(tag::ARGUMENT);
            w.reset();
            w.write_array(args);
        }
    }

    fn function_list(&self) -> BytesMut {
        let mut w = Writer::new_simple();
        w.buf_mut().put_u8(tag::FUNCTIONS);
        self.methods.names().to_vec().encode(&mut w);
        w.buf_mut().put_u8(tag::END);
        w.into_bytes()
    }

    fn error_frame(&self, error: &HproseError) -> BytesMut {
        let mut w = Writer::new_simple();
        w.buf_mut().put_u8(tag::ERROR);
        w.write_string(&error.to_string());
        w.buf_mut().put_u8(tag::END);
        w.into_bytes()
    }
}

/// Truncates or pads the decoded arguments to the declared shape.
fn shape_args(arity: Arity, args: &mut Vec<Value>) {
    let min = match arity {
        Arity::Fixed(n) => {
            args.truncate(n);
            n
        }
        Arity::Variadic(n) => n,
    };
    while args.len() < min {
        args.push(Value::Null);
    }
}

/// Calls the method body, converting panics into user errors.
fn invoke(
    method: &Method,
    name: &str,
    args: &mut Vec<Value>,
) -> Result<Vec<Value>, HproseError> {
    let func = method.func.clone();
    match catch_unwind(AssertUnwindSafe(|| func(name, args))) {
        Ok(result) => result,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "panic in service method".to_string()
            };
            Err(HproseError::User(message))
        }
    }
}

/// Extracts the pre-serialized payload of a non-Normal result.
fn raw_payload(result: &[Value]) -> Result<Vec<u8>, HproseError> {
    let first = result
        .first()
        .ok_or_else(|| HproseError::User("can't find the result value".to_string()))?;
    match first {
        Value::Bytes(b) => Ok(b.read().unwrap().clone()),
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        other => Err(HproseError::Conversion {
            from: other.to_string(),
            to: "raw bytes".to_string(),
        }),
    }
}
