//! Raw reading: cursor primitives and verbatim value pass-through.
//!
//! [`RawReader`] copies one well-formed value from the input to an output
//! buffer without building any in-memory representation. The RPC layer uses
//! it to hand opaque result payloads through to callers who asked for raw
//! mode, and [`Reader`](super::reader::Reader) builds its grammar on top of
//! the same cursor.

use bytes::{BufMut, BytesMut};

use super::tag;
use crate::error::HproseError;

/// A byte cursor over one serialized frame, with tag-directed verbatim copy.
pub struct RawReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RawReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8, HproseError> {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(eof()),
        }
    }

    pub(crate) fn read_slice(&mut self, len: usize) -> Result<&'a [u8], HproseError> {
        if self.remaining() < len {
            return Err(eof());
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads up to and excluding `terminator`, consuming the terminator.
    pub(crate) fn read_until(&mut self, terminator: u8) -> Result<&'a [u8], HproseError> {
        let start = self.pos;
        while let Some(&b) = self.data.get(self.pos) {
            self.pos += 1;
            if b == terminator {
                return Ok(&self.data[start..self.pos - 1]);
            }
        }
        Err(eof())
    }

    /// Reads one UTF-8 encoded codepoint (1–4 bytes).
    pub(crate) fn read_utf8_char(&mut self) -> Result<char, HproseError> {
        let first = *self.data.get(self.pos).ok_or_else(eof)?;
        let len = utf8_len(first).ok_or(HproseError::BadUtf8)?;
        let bytes = self.read_slice(len)?;
        let s = std::str::from_utf8(bytes).map_err(|_| HproseError::BadUtf8)?;
        s.chars().next().ok_or(HproseError::BadUtf8)
    }

    /// Reads a string counted in UTF-16 code units: each BMP codepoint
    /// consumes one unit, each supplementary codepoint two.
    pub(crate) fn read_utf8_units(&mut self, units: usize) -> Result<&'a str, HproseError> {
        let start = self.pos;
        let mut consumed = 0usize;
        while consumed < units {
            let first = *self.data.get(self.pos).ok_or_else(eof)?;
            let len = utf8_len(first).ok_or(HproseError::BadUtf8)?;
            if self.remaining() < len {
                return Err(eof());
            }
            self.pos += len;
            consumed += if len == 4 { 2 } else { 1 };
        }
        std::str::from_utf8(&self.data[start..self.pos]).map_err(|_| HproseError::BadUtf8)
    }

    /// Reads one complete value and returns its bytes verbatim.
    pub fn read_raw(&mut self) -> Result<BytesMut, HproseError> {
        let mut out = BytesMut::new();
        self.read_raw_to(&mut out)?;
        Ok(out)
    }

    /// Reads one complete value, copying its bytes verbatim to `out`.
    pub fn read_raw_to(&mut self, out: &mut BytesMut) -> Result<(), HproseError> {
        let t = self.read_byte()?;
        self.read_raw_tagged(out, t)
    }

    fn read_raw_tagged(&mut self, out: &mut BytesMut, t: u8) -> Result<(), HproseError> {
        match t {
            b'0'..=b'9' | tag::NULL | tag::EMPTY | tag::TRUE | tag::FALSE | tag::NAN => {
                out.put_u8(t);
                Ok(())
            }
            tag::INFINITY => {
                out.put_u8(t);
                out.put_u8(self.read_byte()?);
                Ok(())
            }
            tag::INTEGER | tag::LONG | tag::DOUBLE | tag::REF => self.copy_number(out, t),
            tag::DATE | tag::TIME => self.copy_datetime(out, t),
            tag::UTF8_CHAR => {
                out.put_u8(t);
                let mut buf = [0u8; 4];
                let c = self.read_utf8_char()?;
                out.put_slice(c.encode_utf8(&mut buf).as_bytes());
                Ok(())
            }
            tag::BYTES => self.copy_bytes(out, t),
            tag::STRING => self.copy_string(out, t),
            tag::GUID => self.copy_guid(out, t),
            tag::LIST | tag::MAP | tag::OBJECT => self.copy_complex(out, t),
            tag::CLASS => {
                self.copy_complex(out, t)?;
                // The first instance follows its class descriptor.
                self.read_raw_to(out)
            }
            tag::ERROR => {
                out.put_u8(t);
                self.read_raw_to(out)
            }
            _ => Err(HproseError::unexpected(t)),
        }
    }

    /// Copies tag plus bytes up to and including the next semicolon.
    fn copy_number(&mut self, out: &mut BytesMut, t: u8) -> Result<(), HproseError> {
        out.put_u8(t);
        let body = self.read_until(tag::SEMICOLON)?;
        out.put_slice(body);
        out.put_u8(tag::SEMICOLON);
        Ok(())
    }

    /// Copies tag plus bytes up to and including the next `;` or `Z`.
    fn copy_datetime(&mut self, out: &mut BytesMut, t: u8) -> Result<(), HproseError> {
        out.put_u8(t);
        loop {
            let b = self.read_byte()?;
            out.put_u8(b);
            if b == tag::SEMICOLON || b == tag::UTC {
                return Ok(());
            }
        }
    }

    fn copy_count(&mut self, out: &mut BytesMut) -> Result<usize, HproseError> {
        let mut count = 0usize;
        loop {
            let b = self.read_byte()?;
            out.put_u8(b);
            if b == tag::QUOTE {
                return Ok(count);
            }
            if !b.is_ascii_digit() {
                return Err(HproseError::unexpected(b));
            }
            count = count * 10 + usize::from(b - b'0');
        }
    }

    fn copy_bytes(&mut self, out: &mut BytesMut, t: u8) -> Result<(), HproseError> {
        out.put_u8(t);
        let count = self.copy_count(out)?;
        // Payload plus the closing quote.
        out.put_slice(self.read_slice(count + 1)?);
        Ok(())
    }

    fn copy_string(&mut self, out: &mut BytesMut, t: u8) -> Result<(), HproseError> {
        out.put_u8(t);
        let count = self.copy_count(out)?;
        out.put_slice(self.read_utf8_units(count)?.as_bytes());
        out.put_u8(self.read_byte()?);
        Ok(())
    }

    fn copy_guid(&mut self, out: &mut BytesMut, t: u8) -> Result<(), HproseError> {
        out.put_u8(t);
        // `{` + 36 hyphenated hex characters + `}`.
        out.put_slice(self.read_slice(38)?);
        Ok(())
    }

    /// Copies a list/map/object: header up to and including `{`, then
    /// embedded values until the matching `}`.
    fn copy_complex(&mut self, out: &mut BytesMut, t: u8) -> Result<(), HproseError> {
        let mut b = t;
        out.put_u8(b);
        while b != tag::OPENBRACE {
            b = self.read_byte()?;
            out.put_u8(b);
        }
        loop {
            b = self.read_byte()?;
            if b == tag::CLOSEBRACE {
                out.put_u8(b);
                return Ok(());
            }
            self.read_raw_tagged(out, b)?;
        }
    }
}

fn utf8_len(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

fn eof() -> HproseError {
    HproseError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "unexpected end of stream",
    ))
}
