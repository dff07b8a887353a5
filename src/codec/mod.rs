//! The Hprose serialization codec.
//!
//! A self-describing, tag-prefixed textual-binary format: every value opens
//! with one ASCII tag byte, multi-byte counts are decimal ASCII, quoted
//! payloads are UTF-8. Byte order never matters.

pub mod raw;
pub mod reader;
pub mod tag;
pub mod traits;
pub mod writer;

pub use raw::RawReader;
pub use reader::Reader;
pub use traits::{register_class_alias, Decodable, Encodable, Record};
pub use writer::Writer;
