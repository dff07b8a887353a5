//! HproseR — a pure-Rust implementation of the Hprose RPC protocol.
//!
//! This crate implements the Hprose (High Performance Remote Object Service
//! Engine) wire format: a self-describing, tag-prefixed serialization codec
//! with reference and class tables, plus the thin RPC envelope framed on
//! top of it.
//!
//! # Architecture
//!
//! - **`codec`** — Tag alphabet, raw pass-through reader, `Writer`/`Reader`,
//!   and the `Encodable`/`Decodable`/`Record` trait seams
//! - **`types`** — The dynamic `Value` model with shared, identity-bearing
//!   container handles
//! - **`message`** — RPC envelope: call, response, and discovery frames
//! - **`frame`** — Length-prefixed framing for TCP streams
//! - **`service`** — Method registry, dispatch, and TCP hosting
//! - **`client`** — Client for invoking remote methods (feature-gated)

pub mod codec;
pub mod error;
pub mod frame;
pub mod message;
pub mod service;
pub mod types;

#[cfg(feature = "client")]
pub mod client;
