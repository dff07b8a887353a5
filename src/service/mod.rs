//! Hprose service: method registry, dispatch, and TCP hosting.

pub mod handler;
pub mod methods;
pub mod server;

pub use handler::{Service, ServiceEvent};
pub use methods::{Arity, Method, MethodFn, MethodOptions, Methods, MISSING_METHOD};
pub use server::Server;
