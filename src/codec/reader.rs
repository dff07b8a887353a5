//! Hprose decoding: tagged byte stream → values.
//!
//! Scalar requests apply best-effort coercions (`null` reads as a distinct
//! `None`, booleans and digits widen into numbers, strings re-parse).
//! Containers and records are decoded dynamically into [`Value`] so the
//! reference table stays in lock-step with the writer; typed destinations
//! convert from there.

use std::sync::Arc;

use bytes::BytesMut;
use chrono::NaiveDate;
use num_bigint::BigInt;
use uuid::Uuid;

use super::raw::RawReader;
use super::tag;
use crate::error::HproseError;
use crate::types::{shared, ClassDef, Object, Timestamp, Value};

/// Decodes Hprose values from one serialized frame, maintaining a reference
/// table and a class table for the duration of one top-level operation.
///
/// A reader created with [`Reader::new_simple`] rejects every reference tag
/// it sees with [`HproseError::DanglingReference`].
pub struct Reader<'a> {
    raw: RawReader<'a>,
    simple: bool,
    refs: Vec<Value>,
    classes: Vec<Arc<ClassDef>>,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_mode(data, false)
    }

    pub fn new_simple(data: &'a [u8]) -> Self {
        Self::with_mode(data, true)
    }

    fn with_mode(data: &'a [u8], simple: bool) -> Self {
        Self {
            raw: RawReader::new(data),
            simple,
            refs: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.raw.remaining()
    }

    /// Clears both tables. Invoked between independent operations on one
    /// stream (e.g. between pipelined RPC calls).
    pub fn reset(&mut self) {
        self.refs.clear();
        self.classes.clear();
    }

    /// Copies the next complete value verbatim into `out`.
    pub fn read_raw_to(&mut self, out: &mut BytesMut) -> Result<(), HproseError> {
        self.raw.read_raw_to(out)
    }

    fn register(&mut self, v: Value) {
        if !self.simple {
            self.refs.push(v);
        }
    }

    // -- Tag plumbing --

    pub(crate) fn read_byte(&mut self) -> Result<u8, HproseError> {
        self.raw.read_byte()
    }

    pub fn check_tag(&mut self, expected: u8) -> Result<(), HproseError> {
        let t = self.read_byte()?;
        if t == expected {
            Ok(())
        } else {
            Err(HproseError::expected(&[expected], t))
        }
    }

    pub fn check_tags(&mut self, expected: &[u8]) -> Result<u8, HproseError> {
        let t = self.read_byte()?;
        if expected.contains(&t) {
            Ok(t)
        } else {
            Err(HproseError::expected(expected, t))
        }
    }

    /// Reads a decimal count (optionally signed) terminated by `terminator`.
    pub fn read_count(&mut self, terminator: u8) -> Result<usize, HproseError> {
        let i = self.read_i64_until(terminator)?;
        usize::try_from(i).map_err(|_| HproseError::Conversion {
            from: i.to_string(),
            to: "count".to_string(),
        })
    }

    fn read_i64_until(&mut self, terminator: u8) -> Result<i64, HproseError> {
        let body = self.raw.read_until(terminator)?;
        parse_decimal_i64(body)
    }

    // -- Scalar reads with coercion; `None` means the wire value was null --

    pub fn read_i64(&mut self) -> Result<Option<i64>, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0'..=b'9' => Ok(Some(i64::from(t - b'0'))),
            tag::INTEGER | tag::LONG => Ok(Some(self.read_i64_until(tag::SEMICOLON)?)),
            tag::DOUBLE => Ok(Some(self.read_f64_body()? as i64)),
            tag::NULL => Ok(None),
            tag::EMPTY | tag::FALSE => Ok(Some(0)),
            tag::TRUE => Ok(Some(1)),
            tag::UTF8_CHAR => Ok(Some(i64::from(u32::from(self.raw.read_utf8_char()?)))),
            tag::STRING => {
                let s = self.read_string_body(true)?;
                s.parse::<i64>().map(Some).map_err(|_| HproseError::Conversion {
                    from: format!("string \"{s}\""),
                    to: "i64".to_string(),
                })
            }
            tag::REF => Ok(Some(self.read_ref_body()?.to_i64()?)),
            _ => Err(HproseError::cannot_convert(t, "i64")),
        }
    }

    pub fn read_u64(&mut self) -> Result<Option<u64>, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0'..=b'9' => Ok(Some(u64::from(t - b'0'))),
            tag::INTEGER | tag::LONG => {
                let body = self.raw.read_until(tag::SEMICOLON)?;
                parse_decimal_u64(body).map(Some)
            }
            tag::DOUBLE => Ok(Some(self.read_f64_body()? as u64)),
            tag::NULL => Ok(None),
            tag::EMPTY | tag::FALSE => Ok(Some(0)),
            tag::TRUE => Ok(Some(1)),
            tag::UTF8_CHAR => Ok(Some(u64::from(u32::from(self.raw.read_utf8_char()?)))),
            tag::STRING => {
                let s = self.read_string_body(true)?;
                s.parse::<u64>().map(Some).map_err(|_| HproseError::Conversion {
                    from: format!("string \"{s}\""),
                    to: "u64".to_string(),
                })
            }
            tag::REF => {
                let i = self.read_ref_body()?.to_i64()?;
                u64::try_from(i).map(Some).map_err(|_| HproseError::Conversion {
                    from: i.to_string(),
                    to: "u64".to_string(),
                })
            }
            _ => Err(HproseError::cannot_convert(t, "u64")),
        }
    }

    pub fn read_f64(&mut self) -> Result<Option<f64>, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0'..=b'9' => Ok(Some(f64::from(t - b'0'))),
            tag::INTEGER | tag::LONG | tag::DOUBLE => Ok(Some(self.read_f64_body()?)),
            tag::NULL => Ok(None),
            tag::EMPTY | tag::FALSE => Ok(Some(0.0)),
            tag::TRUE => Ok(Some(1.0)),
            tag::NAN => Ok(Some(f64::NAN)),
            tag::INFINITY => Ok(Some(self.read_infinity()?)),
            tag::UTF8_CHAR => Ok(Some(f64::from(u32::from(self.raw.read_utf8_char()?)))),
            tag::STRING => {
                let s = self.read_string_body(true)?;
                s.parse::<f64>().map(Some).map_err(|_| HproseError::Conversion {
                    from: format!("string \"{s}\""),
                    to: "f64".to_string(),
                })
            }
            tag::REF => Ok(Some(self.read_ref_body()?.to_f64()?)),
            _ => Err(HproseError::cannot_convert(t, "f64")),
        }
    }

    pub fn read_bool(&mut self) -> Result<Option<bool>, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0' => Ok(Some(false)),
            b'1'..=b'9' => Ok(Some(true)),
            tag::INTEGER | tag::LONG => {
                let i = self.read_bigint_body()?;
                Ok(Some(i != BigInt::from(0)))
            }
            tag::DOUBLE => Ok(Some(self.read_f64_body()? != 0.0)),
            tag::NULL => Ok(None),
            tag::EMPTY | tag::FALSE => Ok(Some(false)),
            tag::TRUE | tag::NAN => Ok(Some(true)),
            tag::INFINITY => {
                self.read_infinity()?;
                Ok(Some(true))
            }
            tag::UTF8_CHAR => {
                let c = self.raw.read_utf8_char()?;
                parse_bool_text(&c.to_string())
            }
            tag::STRING => {
                let s = self.read_string_body(true)?;
                parse_bool_text(&s)
            }
            tag::REF => Ok(Some(self.read_ref_body()?.to_bool()?)),
            _ => Err(HproseError::cannot_convert(t, "bool")),
        }
    }

    pub fn read_bigint(&mut self) -> Result<Option<BigInt>, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0'..=b'9' => Ok(Some(BigInt::from(t - b'0'))),
            tag::INTEGER | tag::LONG => Ok(Some(self.read_bigint_body()?)),
            tag::DOUBLE => Ok(Some(BigInt::from(self.read_f64_body()? as i64))),
            tag::NULL => Ok(None),
            tag::EMPTY | tag::FALSE => Ok(Some(BigInt::from(0))),
            tag::TRUE => Ok(Some(BigInt::from(1))),
            tag::UTF8_CHAR => Ok(Some(BigInt::from(u32::from(self.raw.read_utf8_char()?)))),
            tag::STRING => {
                let s = self.read_string_body(true)?;
                s.parse::<BigInt>().map(Some).map_err(|_| HproseError::Conversion {
                    from: format!("string \"{s}\""),
                    to: "big int".to_string(),
                })
            }
            tag::REF => Ok(Some(self.read_ref_body()?.to_bigint()?)),
            _ => Err(HproseError::cannot_convert(t, "big int")),
        }
    }

    pub fn read_string(&mut self) -> Result<Option<String>, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0'..=b'9' => Ok(Some(char::from(t).to_string())),
            tag::INTEGER | tag::LONG | tag::DOUBLE => {
                let body = self.raw.read_until(tag::SEMICOLON)?;
                let s = std::str::from_utf8(body).map_err(|_| HproseError::BadUtf8)?;
                Ok(Some(s.to_string()))
            }
            tag::NULL => Ok(None),
            tag::EMPTY => Ok(Some(String::new())),
            tag::TRUE => Ok(Some("true".to_string())),
            tag::FALSE => Ok(Some("false".to_string())),
            tag::NAN => Ok(Some("NaN".to_string())),
            tag::INFINITY => {
                let sign = self.read_byte()?;
                Ok(Some(format!("{}Inf", char::from(sign))))
            }
            tag::DATE => Ok(Some(self.read_date_body(true)?.to_string())),
            tag::TIME => Ok(Some(self.read_time_body(true)?.to_string())),
            tag::UTF8_CHAR => Ok(Some(self.raw.read_utf8_char()?.to_string())),
            tag::STRING => Ok(Some(self.read_string_body(true)?.to_string())),
            tag::GUID => Ok(Some(self.read_guid_body(true)?.to_string())),
            tag::BYTES => {
                let b = self.read_bytes_body(true)?;
                let data = b.read().unwrap().clone();
                String::from_utf8(data).map(Some).map_err(|_| HproseError::BadUtf8)
            }
            tag::REF => Ok(Some(self.read_ref_body()?.to_string_value()?)),
            _ => Err(HproseError::cannot_convert(t, "string")),
        }
    }

    pub fn read_bytes(&mut self) -> Result<Option<Vec<u8>>, HproseError> {
        let t = self.read_byte()?;
        match t {
            tag::NULL => Ok(None),
            tag::EMPTY => Ok(Some(Vec::new())),
            tag::UTF8_CHAR => {
                let c = self.raw.read_utf8_char()?;
                Ok(Some(c.to_string().into_bytes()))
            }
            tag::STRING => Ok(Some(self.read_string_body(true)?.as_bytes().to_vec())),
            tag::GUID => Ok(Some(self.read_guid_body(true)?.as_bytes().to_vec())),
            tag::BYTES => {
                let b = self.read_bytes_body(true)?;
                let data = b.read().unwrap().clone();
                Ok(Some(data))
            }
            tag::LIST => Ok(Some(self.read_list_body()?.to_bytes()?)),
            tag::REF => Ok(Some(self.read_ref_body()?.to_bytes()?)),
            _ => Err(HproseError::cannot_convert(t, "bytes")),
        }
    }

    pub fn read_guid(&mut self) -> Result<Option<Uuid>, HproseError> {
        let t = self.read_byte()?;
        match t {
            tag::NULL => Ok(None),
            tag::STRING => {
                let s = self.read_string_body(true)?;
                Uuid::parse_str(&s).map(Some).map_err(|_| HproseError::Conversion {
                    from: format!("string \"{s}\""),
                    to: "guid".to_string(),
                })
            }
            tag::GUID => Ok(Some(self.read_guid_body(true)?)),
            tag::BYTES => {
                let b = self.read_bytes_body(true)?;
                let data = b.read().unwrap();
                Uuid::from_slice(&data).map(Some).map_err(|_| HproseError::Conversion {
                    from: "bytes".to_string(),
                    to: "guid".to_string(),
                })
            }
            tag::REF => Ok(Some(self.read_ref_body()?.to_guid()?)),
            _ => Err(HproseError::cannot_convert(t, "guid")),
        }
    }

    pub fn read_time(&mut self) -> Result<Option<Timestamp>, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0' | tag::EMPTY => Ok(Some(Timestamp::zero())),
            tag::NULL => Ok(None),
            tag::STRING => {
                let s = self.read_string_body(true)?;
                crate::types::parse_timestamp(&s).map(Some).ok_or_else(|| {
                    HproseError::Conversion {
                        from: format!("string \"{s}\""),
                        to: "time".to_string(),
                    }
                })
            }
            tag::DATE => Ok(Some(self.read_date_body(true)?)),
            tag::TIME => Ok(Some(self.read_time_body(true)?)),
            tag::REF => Ok(Some(self.read_ref_body()?.to_time()?)),
            _ => Err(HproseError::cannot_convert(t, "time")),
        }
    }

    // -- Dynamic read --

    /// Reads one value of any kind, resolving references and class
    /// descriptors through the reader's own tables.
    pub fn read_value(&mut self) -> Result<Value, HproseError> {
        let t = self.read_byte()?;
        match t {
            b'0'..=b'9' => Ok(Value::Int(i64::from(t - b'0'))),
            tag::INTEGER => Ok(Value::Int(self.read_i64_until(tag::SEMICOLON)?)),
            tag::LONG => Ok(Value::Long(self.read_bigint_body()?)),
            tag::DOUBLE => Ok(Value::Double(self.read_f64_body()?)),
            tag::NULL => Ok(Value::Null),
            tag::EMPTY => Ok(Value::String(Arc::from(""))),
            tag::TRUE => Ok(Value::Bool(true)),
            tag::FALSE => Ok(Value::Bool(false)),
            tag::NAN => Ok(Value::Double(f64::NAN)),
            tag::INFINITY => Ok(Value::Double(self.read_infinity()?)),
            tag::DATE => Ok(Value::Time(self.read_date_body(true)?)),
            tag::TIME => Ok(Value::Time(self.read_time_body(true)?)),
            tag::BYTES => Ok(Value::Bytes(self.read_bytes_body(true)?)),
            tag::UTF8_CHAR => {
                let c = self.raw.read_utf8_char()?;
                Ok(Value::String(Arc::from(c.to_string().as_str())))
            }
            tag::STRING => Ok(Value::String(self.read_string_body(true)?)),
            tag::GUID => Ok(Value::Guid(self.read_guid_body(true)?)),
            tag::LIST => self.read_list_body(),
            tag::MAP => self.read_map_body(),
            tag::CLASS => {
                // The descriptor itself produces no value; the next tag does.
                self.read_class_body()?;
                self.read_value()
            }
            tag::OBJECT => self.read_object_body(),
            tag::REF => self.read_ref_body(),
            _ => Err(HproseError::unexpected(t)),
        }
    }

    /// Reads `count` values of an RPC argument list, then the closing brace.
    /// The list occupies a reference-table slot like any other list.
    pub(crate) fn read_arguments(&mut self, count: usize) -> Result<Vec<Value>, HproseError> {
        let handle = shared(Vec::with_capacity(count));
        self.register(Value::List(handle.clone()));
        for _ in 0..count {
            let item = self.read_value()?;
            handle.write().unwrap().push(item);
        }
        self.check_tag(tag::CLOSEBRACE)?;
        let items = handle.read().unwrap().clone();
        Ok(items)
    }

    // -- Body readers (tag already consumed) --

    fn read_f64_body(&mut self) -> Result<f64, HproseError> {
        let body = self.raw.read_until(tag::SEMICOLON)?;
        let s = std::str::from_utf8(body).map_err(|_| HproseError::BadUtf8)?;
        s.parse::<f64>().map_err(|_| HproseError::Conversion {
            from: format!("string \"{s}\""),
            to: "f64".to_string(),
        })
    }

    fn read_bigint_body(&mut self) -> Result<BigInt, HproseError> {
        let body = self.raw.read_until(tag::SEMICOLON)?;
        let s = std::str::from_utf8(body).map_err(|_| HproseError::BadUtf8)?;
        if s.is_empty() {
            return Ok(BigInt::from(0));
        }
        s.parse::<BigInt>().map_err(|_| HproseError::Conversion {
            from: format!("string \"{s}\""),
            to: "big int".to_string(),
        })
    }

    fn read_infinity(&mut self) -> Result<f64, HproseError> {
        match self.read_byte()? {
            tag::POS => Ok(f64::INFINITY),
            tag::NEG => Ok(f64::NEG_INFINITY),
            other => Err(HproseError::expected(&[tag::POS, tag::NEG], other)),
        }
    }

    fn read_string_body(&mut self, register: bool) -> Result<Arc<str>, HproseError> {
        let s = self.read_string_unregistered()?;
        if register {
            self.register(Value::String(s.clone()));
        }
        Ok(s)
    }

    fn read_string_unregistered(&mut self) -> Result<Arc<str>, HproseError> {
        let count = self.read_count(tag::QUOTE)?;
        let s: Arc<str> = Arc::from(self.raw.read_utf8_units(count)?);
        self.check_tag(tag::QUOTE)?;
        Ok(s)
    }

    fn read_bytes_body(
        &mut self,
        register: bool,
    ) -> Result<crate::types::Shared<Vec<u8>>, HproseError> {
        let count = self.read_count(tag::QUOTE)?;
        let data = self.raw.read_slice(count)?.to_vec();
        self.check_tag(tag::QUOTE)?;
        let handle = shared(data);
        if register {
            self.register(Value::Bytes(handle.clone()));
        }
        Ok(handle)
    }

    fn read_guid_body(&mut self, register: bool) -> Result<Uuid, HproseError> {
        self.check_tag(tag::OPENBRACE)?;
        let text = self.raw.read_slice(36)?;
        self.check_tag(tag::CLOSEBRACE)?;
        let s = std::str::from_utf8(text).map_err(|_| HproseError::BadUtf8)?;
        let u = Uuid::parse_str(s).map_err(|_| HproseError::Conversion {
            from: format!("string \"{s}\""),
            to: "guid".to_string(),
        })?;
        if register {
            self.register(Value::Guid(u));
        }
        Ok(u)
    }

    fn read_fixed_digits(&mut self, n: usize) -> Result<u32, HproseError> {
        let mut value = 0u32;
        for _ in 0..n {
            let b = self.read_byte()?;
            if !b.is_ascii_digit() {
                return Err(HproseError::unexpected(b));
            }
            value = value * 10 + u32::from(b - b'0');
        }
        Ok(value)
    }

    fn read_date_body(&mut self, register: bool) -> Result<Timestamp, HproseError> {
        let year = self.read_fixed_digits(4)?;
        let month = self.read_fixed_digits(2)?;
        let day = self.read_fixed_digits(2)?;
        let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| {
            HproseError::Conversion {
                from: format!("{year:04}{month:02}{day:02}"),
                to: "date".to_string(),
            }
        })?;
        let next = self.read_byte()?;
        let (time, terminator) = if next == tag::TIME {
            let (h, m, s, ns, terminator) = self.read_timeofday()?;
            (make_time(h, m, s, ns)?, terminator)
        } else {
            (make_time(0, 0, 0, 0)?, next)
        };
        let utc = self.expect_zone(terminator)?;
        let ts = Timestamp::new(date.and_time(time), utc);
        if register {
            self.register(Value::Time(ts));
        }
        Ok(ts)
    }

    fn read_time_body(&mut self, register: bool) -> Result<Timestamp, HproseError> {
        let (h, m, s, ns, terminator) = self.read_timeofday()?;
        let utc = self.expect_zone(terminator)?;
        let date = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        let ts = Timestamp::new(date.and_time(make_time(h, m, s, ns)?), utc);
        if register {
            self.register(Value::Time(ts));
        }
        Ok(ts)
    }

    fn expect_zone(&mut self, terminator: u8) -> Result<bool, HproseError> {
        match terminator {
            tag::UTC => Ok(true),
            tag::SEMICOLON => Ok(false),
            other => Err(HproseError::expected(&[tag::UTC, tag::SEMICOLON], other)),
        }
    }

    /// Reads `hhmmss` plus an optional `.` with 3, 6, or 9 fractional
    /// digits. Returns the fields and the terminator byte that follows.
    fn read_timeofday(&mut self) -> Result<(u32, u32, u32, u32, u8), HproseError> {
        let hour = self.read_fixed_digits(2)?;
        let min = self.read_fixed_digits(2)?;
        let sec = self.read_fixed_digits(2)?;
        let mut next = self.read_byte()?;
        let mut nsec = 0u32;
        if next == tag::POINT {
            nsec = self.read_fixed_digits(3)?;
            next = self.read_byte()?;
            if next.is_ascii_digit() {
                nsec = nsec * 10 + u32::from(next - b'0');
                nsec = nsec * 100 + self.read_fixed_digits(2)?;
                next = self.read_byte()?;
            } else {
                nsec *= 1_000;
            }
            if next.is_ascii_digit() {
                nsec = nsec * 10 + u32::from(next - b'0');
                nsec = nsec * 100 + self.read_fixed_digits(2)?;
                next = self.read_byte()?;
            } else {
                nsec *= 1_000;
            }
        }
        Ok((hour, min, sec, nsec, next))
    }

    fn read_list_body(&mut self) -> Result<Value, HproseError> {
        let count = self.read_count(tag::OPENBRACE)?;
        let handle = shared(Vec::with_capacity(count));
        let value = Value::List(handle.clone());
        self.register(value.clone());
        for _ in 0..count {
            let item = self.read_value()?;
            handle.write().unwrap().push(item);
        }
        self.check_tag(tag::CLOSEBRACE)?;
        Ok(value)
    }

    fn read_map_body(&mut self) -> Result<Value, HproseError> {
        let count = self.read_count(tag::OPENBRACE)?;
        let handle = shared(Vec::with_capacity(count));
        let value = Value::Map(handle.clone());
        self.register(value.clone());
        for _ in 0..count {
            let key = self.read_value()?;
            let val = self.read_value()?;
            handle.write().unwrap().push((key, val));
        }
        self.check_tag(tag::CLOSEBRACE)?;
        Ok(value)
    }

    /// Reads a class descriptor and appends it to the class table. The class
    /// name string is not reference-eligible; the field-name strings are.
    pub(crate) fn read_class_body(&mut self) -> Result<(), HproseError> {
        let name = self.read_string_unregistered()?;
        let count = self.read_count(tag::OPENBRACE)?;
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            let field = self.read_string()?.ok_or_else(|| HproseError::Conversion {
                from: "nil".to_string(),
                to: "field name".to_string(),
            })?;
            fields.push(field);
        }
        self.check_tag(tag::CLOSEBRACE)?;
        self.classes.push(Arc::new(ClassDef::new(name.to_string(), fields)));
        Ok(())
    }

    fn read_object_body(&mut self) -> Result<Value, HproseError> {
        let index = self.read_count(tag::OPENBRACE)?;
        let class = self
            .classes
            .get(index)
            .cloned()
            .ok_or(HproseError::DanglingReference(index))?;
        let field_count = class.fields.len();
        let handle = shared(Object {
            class,
            fields: Vec::with_capacity(field_count),
        });
        let value = Value::Object(handle.clone());
        self.register(value.clone());
        for _ in 0..field_count {
            let field = self.read_value()?;
            handle.write().unwrap().fields.push(field);
        }
        self.check_tag(tag::CLOSEBRACE)?;
        Ok(value)
    }

    fn read_ref_body(&mut self) -> Result<Value, HproseError> {
        let index = self.read_count(tag::SEMICOLON)?;
        if self.simple {
            return Err(HproseError::DanglingReference(index));
        }
        self.refs
            .get(index)
            .cloned()
            .ok_or(HproseError::DanglingReference(index))
    }

    // -- Records --

    /// Reads a record into a typed destination. Field names are matched
    /// case-insensitively; unknown fields are discarded, missing fields left
    /// at their default.
    pub fn read_record<T>(&mut self) -> Result<Option<T>, HproseError>
    where
        T: super::traits::Record + Default + 'static,
    {
        match self.read_value()? {
            Value::Null => Ok(None),
            other => super::traits::record_from_value(other).map(Some),
        }
    }
}

fn make_time(h: u32, m: u32, s: u32, ns: u32) -> Result<chrono::NaiveTime, HproseError> {
    chrono::NaiveTime::from_hms_nano_opt(h, m, s, ns).ok_or_else(|| HproseError::Conversion {
        from: format!("{h:02}{m:02}{s:02}.{ns:09}"),
        to: "time".to_string(),
    })
}

fn parse_decimal_i64(body: &[u8]) -> Result<i64, HproseError> {
    let (sign, digits) = match body.first() {
        Some(&tag::NEG) => (-1i64, &body[1..]),
        Some(&tag::POS) => (1, &body[1..]),
        _ => (1, body),
    };
    let mut value = 0i64;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(HproseError::unexpected(b));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b - b'0') * sign))
            .ok_or_else(|| HproseError::Conversion {
                from: String::from_utf8_lossy(body).into_owned(),
                to: "i64".to_string(),
            })?;
    }
    Ok(value)
}

fn parse_decimal_u64(body: &[u8]) -> Result<u64, HproseError> {
    let digits = match body.first() {
        Some(&tag::POS) => &body[1..],
        _ => body,
    };
    let mut value = 0u64;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(HproseError::unexpected(b));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
            .ok_or_else(|| HproseError::Conversion {
                from: String::from_utf8_lossy(body).into_owned(),
                to: "u64".to_string(),
            })?;
    }
    Ok(value)
}

fn parse_bool_text(s: &str) -> Result<Option<bool>, HproseError> {
    crate::types::parse_bool(s)
        .map(Some)
        .ok_or_else(|| HproseError::Conversion {
            from: format!("string \"{s}\""),
            to: "bool".to_string(),
        })
}
