//! Hprose encoding: values → tagged byte stream.

use std::collections::HashMap;

use bytes::{BufMut, BytesMut};
use chrono::{Datelike, Timelike};
use num_bigint::BigInt;
use uuid::Uuid;

use super::tag;
use crate::types::{Object, Shared, Timestamp, Value};

/// Writer-side reference table.
///
/// Every reference-eligible value bumps the counter so index assignment
/// stays in lock-step with the decoder. Only handle-typed values get a
/// lookup entry; their handles are kept alive so an address cannot be
/// recycled while the table is live.
#[derive(Default)]
struct RefTable {
    indexes: HashMap<usize, usize>,
    keepalive: Vec<Value>,
    count: usize,
}

/// Encodes Hprose values into a byte buffer, maintaining a reference table
/// and a class-descriptor table for the duration of one top-level operation.
///
/// A writer created with [`Writer::new_simple`] never consults or updates a
/// reference table; its output is slightly larger but cycle-free.
pub struct Writer {
    buf: BytesMut,
    refs: Option<RefTable>,
    classref: HashMap<String, usize>,
    class_fields: Vec<Vec<String>>,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_refs(Some(RefTable::default()))
    }

    pub fn new_simple() -> Self {
        Self::with_refs(None)
    }

    fn with_refs(refs: Option<RefTable>) -> Self {
        Self {
            buf: BytesMut::new(),
            refs,
            classref: HashMap::new(),
            class_fields: Vec::new(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }

    pub(crate) fn buf_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Clears both tables. The output buffer is left untouched; reset marks
    /// the boundary between independent operations on one stream.
    pub fn reset(&mut self) {
        if let Some(refs) = &mut self.refs {
            *refs = RefTable::default();
        }
        self.classref.clear();
        self.class_fields.clear();
    }

    // -- Reference table --

    /// Emits `r<index>;` if `v` was already emitted, by identity.
    fn try_write_ref(&mut self, v: &Value) -> bool {
        let Some(refs) = &self.refs else { return false };
        let Some(id) = v.identity() else { return false };
        if let Some(&index) = refs.indexes.get(&id) {
            self.buf.put_u8(tag::REF);
            self.put_uint(index as u64);
            self.buf.put_u8(tag::SEMICOLON);
            true
        } else {
            false
        }
    }

    /// Appends `v` to the reference table before its contents are emitted,
    /// so nested back-references resolve to the container's own slot.
    fn register(&mut self, v: &Value) {
        if let Some(refs) = &mut self.refs {
            let index = refs.count;
            refs.count += 1;
            if let Some(id) = v.identity() {
                refs.indexes.insert(id, index);
                refs.keepalive.push(v.clone());
            }
        }
    }

    /// Appends a table slot for an eligible value without a stable identity.
    fn register_anonymous(&mut self) {
        if let Some(refs) = &mut self.refs {
            refs.count += 1;
        }
    }

    // -- Dynamic serialization --

    /// Serializes one value, deduplicating reference-eligible values through
    /// the reference table.
    pub fn serialize(&mut self, v: &Value) {
        match v {
            Value::Null => self.write_null(),
            Value::Bool(b) => self.write_bool(*b),
            Value::Int(i) => self.write_i64(*i),
            Value::Long(i) => self.write_bigint(i),
            Value::Double(f) => self.write_f64(*f),
            Value::String(s) => {
                if s.is_empty() {
                    self.buf.put_u8(tag::EMPTY);
                } else if let Some(c) = single_bmp_char(s) {
                    self.put_utf8_char(c);
                } else if !self.try_write_ref(v) {
                    self.register(v);
                    self.put_string_body(s);
                }
            }
            Value::Bytes(b) => {
                let empty = b.read().unwrap().is_empty();
                if empty {
                    self.buf.put_u8(tag::EMPTY);
                } else if !self.try_write_ref(v) {
                    self.register(v);
                    let data = b.read().unwrap();
                    self.put_bytes_body(&data);
                }
            }
            Value::Guid(u) => {
                self.register(v);
                self.put_guid_body(u);
            }
            Value::Time(t) => {
                self.register(v);
                self.put_time_body(t);
            }
            Value::List(items) => {
                if !self.try_write_ref(v) {
                    self.register(v);
                    let items = items.read().unwrap();
                    self.buf.put_u8(tag::LIST);
                    if !items.is_empty() {
                        self.put_uint(items.len() as u64);
                    }
                    self.buf.put_u8(tag::OPENBRACE);
                    for item in items.iter() {
                        self.serialize(item);
                    }
                    self.buf.put_u8(tag::CLOSEBRACE);
                }
            }
            Value::Map(pairs) => {
                if !self.try_write_ref(v) {
                    self.register(v);
                    let pairs = pairs.read().unwrap();
                    self.buf.put_u8(tag::MAP);
                    if !pairs.is_empty() {
                        self.put_uint(pairs.len() as u64);
                    }
                    self.buf.put_u8(tag::OPENBRACE);
                    for (key, value) in pairs.iter() {
                        self.serialize(key);
                        self.serialize(value);
                    }
                    self.buf.put_u8(tag::CLOSEBRACE);
                }
            }
            Value::Object(o) => {
                if !self.try_write_ref(v) {
                    self.write_object_value(v, o);
                }
            }
        }
    }

    /// Serializes a transient sequence as a list. Used for RPC argument and
    /// multi-result frames; the sequence itself has no identity but still
    /// occupies a reference-table slot.
    pub fn write_array(&mut self, items: &[Value]) {
        self.write_seq_header(items.len());
        for item in items {
            self.serialize(item);
        }
        self.finish_container();
    }

    /// Opens a list frame of `count` elements, occupying a reference-table
    /// slot. The caller emits the elements and closes with
    /// [`Writer::finish_container`].
    pub(crate) fn write_seq_header(&mut self, count: usize) {
        self.register_anonymous();
        self.buf.put_u8(tag::LIST);
        if count > 0 {
            self.put_uint(count as u64);
        }
        self.buf.put_u8(tag::OPENBRACE);
    }

    /// Opens a map frame of `count` pairs, occupying a reference-table slot.
    pub(crate) fn write_map_header(&mut self, count: usize) {
        self.register_anonymous();
        self.buf.put_u8(tag::MAP);
        if count > 0 {
            self.put_uint(count as u64);
        }
        self.buf.put_u8(tag::OPENBRACE);
    }

    pub(crate) fn finish_container(&mut self) {
        self.buf.put_u8(tag::CLOSEBRACE);
    }

    // -- Scalar emission --

    pub fn write_null(&mut self) {
        self.buf.put_u8(tag::NULL);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.put_u8(if v { tag::TRUE } else { tag::FALSE });
    }

    /// Emits an integer: a bare ASCII digit for 0–9, otherwise `i` when it
    /// fits in signed 32 bits, `l` beyond, with the decimal magnitude and a
    /// closing semicolon.
    pub fn write_i64(&mut self, v: i64) {
        if (0..=9).contains(&v) {
            self.buf.put_u8(b'0' + v as u8);
            return;
        }
        if i64::from(i32::MIN) <= v && v <= i64::from(i32::MAX) {
            self.buf.put_u8(tag::INTEGER);
        } else {
            self.buf.put_u8(tag::LONG);
        }
        self.buf.put_slice(v.to_string().as_bytes());
        self.buf.put_u8(tag::SEMICOLON);
    }

    pub fn write_u64(&mut self, v: u64) {
        if v <= 9 {
            self.buf.put_u8(b'0' + v as u8);
            return;
        }
        if v <= i32::MAX as u64 {
            self.buf.put_u8(tag::INTEGER);
        } else {
            self.buf.put_u8(tag::LONG);
        }
        self.buf.put_slice(v.to_string().as_bytes());
        self.buf.put_u8(tag::SEMICOLON);
    }

    /// Bignums always take the `l` form.
    pub fn write_bigint(&mut self, v: &BigInt) {
        self.buf.put_u8(tag::LONG);
        self.buf.put_slice(v.to_string().as_bytes());
        self.buf.put_u8(tag::SEMICOLON);
    }

    pub fn write_f64(&mut self, v: f64) {
        if v.is_nan() {
            self.buf.put_u8(tag::NAN);
        } else if v.is_infinite() {
            self.buf.put_u8(tag::INFINITY);
            self.buf.put_u8(if v > 0.0 { tag::POS } else { tag::NEG });
        } else {
            self.buf.put_u8(tag::DOUBLE);
            self.buf.put_slice(v.to_string().as_bytes());
            self.buf.put_u8(tag::SEMICOLON);
        }
    }

    // -- Typed emission (reference-table slot, no identity) --

    /// Emits a string in the counted form regardless of length, occupying a
    /// reference-table slot. Used for method names and field names.
    pub fn write_string(&mut self, s: &str) {
        self.register_anonymous();
        self.put_string_body(s);
    }

    /// Emits a string choosing the compact forms: `e` for empty, `u` for a
    /// single BMP character, counted `s` otherwise.
    pub fn write_string_with_ref(&mut self, s: &str) {
        if s.is_empty() {
            self.buf.put_u8(tag::EMPTY);
        } else if let Some(c) = single_bmp_char(s) {
            self.put_utf8_char(c);
        } else {
            self.register_anonymous();
            self.put_string_body(s);
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        if data.is_empty() {
            self.buf.put_u8(tag::EMPTY);
        } else {
            self.register_anonymous();
            self.put_bytes_body(data);
        }
    }

    pub fn write_guid(&mut self, u: &Uuid) {
        self.register_anonymous();
        self.put_guid_body(u);
    }

    pub fn write_time(&mut self, t: &Timestamp) {
        self.register_anonymous();
        self.put_time_body(t);
    }

    // -- Records --

    /// Emits a record instance. The first instance of a class is preceded by
    /// its class descriptor; the descriptor index is reused thereafter.
    pub fn write_record<T: super::traits::Record + 'static>(&mut self, v: &T) {
        let name = super::traits::class_alias::<T>().unwrap_or_else(|| T::NAME.to_string());
        let index = match self.classref.get(&name) {
            Some(&index) => index,
            None => {
                let fields: Vec<String> =
                    T::FIELDS.iter().map(|f| first_letter_to_lower(f)).collect();
                self.write_class(&name, &fields)
            }
        };
        self.register_anonymous();
        self.buf.put_u8(tag::OBJECT);
        self.put_uint(index as u64);
        self.buf.put_u8(tag::OPENBRACE);
        for i in 0..T::FIELDS.len() {
            v.encode_field(i, self);
        }
        self.buf.put_u8(tag::CLOSEBRACE);
    }

    fn write_object_value(&mut self, v: &Value, o: &Shared<Object>) {
        let (name, fields, values) = {
            let o = o.read().unwrap();
            (o.class.name.clone(), o.class.fields.clone(), o.fields.clone())
        };
        let index = match self.classref.get(&name) {
            Some(&index) => index,
            None => self.write_class(&name, &fields),
        };
        self.register(v);
        self.buf.put_u8(tag::OBJECT);
        self.put_uint(index as u64);
        self.buf.put_u8(tag::OPENBRACE);
        for field in &values {
            self.serialize(field);
        }
        self.buf.put_u8(tag::CLOSEBRACE);
    }

    /// Emits a class descriptor and assigns it the next free class index.
    /// The class name is not reference-eligible; the field-name strings are.
    fn write_class(&mut self, name: &str, fields: &[String]) -> usize {
        self.buf.put_u8(tag::CLASS);
        self.put_uint(utf16_len(name) as u64);
        self.buf.put_u8(tag::QUOTE);
        self.buf.put_slice(name.as_bytes());
        self.buf.put_u8(tag::QUOTE);
        if !fields.is_empty() {
            self.put_uint(fields.len() as u64);
        }
        self.buf.put_u8(tag::OPENBRACE);
        for field in fields {
            self.write_string(field);
        }
        self.buf.put_u8(tag::CLOSEBRACE);
        let index = self.class_fields.len();
        self.classref.insert(name.to_string(), index);
        self.class_fields.push(fields.to_vec());
        index
    }

    // -- Body emission helpers --

    fn put_uint(&mut self, v: u64) {
        if v <= 9 {
            self.buf.put_u8(b'0' + v as u8);
        } else {
            self.buf.put_slice(v.to_string().as_bytes());
        }
    }

    fn put_utf8_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.buf.put_u8(tag::UTF8_CHAR);
        self.buf.put_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    /// `s` + length in UTF-16 code units (omitted when zero) + quoted UTF-8.
    fn put_string_body(&mut self, s: &str) {
        self.buf.put_u8(tag::STRING);
        let length = utf16_len(s);
        if length > 0 {
            self.put_uint(length as u64);
        }
        self.buf.put_u8(tag::QUOTE);
        self.buf.put_slice(s.as_bytes());
        self.buf.put_u8(tag::QUOTE);
    }

    fn put_bytes_body(&mut self, data: &[u8]) {
        self.buf.put_u8(tag::BYTES);
        if !data.is_empty() {
            self.put_uint(data.len() as u64);
        }
        self.buf.put_u8(tag::QUOTE);
        self.buf.put_slice(data);
        self.buf.put_u8(tag::QUOTE);
    }

    fn put_guid_body(&mut self, u: &Uuid) {
        self.buf.put_u8(tag::GUID);
        self.buf.put_u8(tag::OPENBRACE);
        self.buf.put_slice(u.to_string().as_bytes());
        self.buf.put_u8(tag::CLOSEBRACE);
    }

    /// Date-only iff the time of day is exactly zero; time-only iff the date
    /// is 0001-01-01; otherwise both portions. Terminated by `Z` for UTC,
    /// `;` for local.
    fn put_time_body(&mut self, t: &Timestamp) {
        let terminator = if t.utc { tag::UTC } else { tag::SEMICOLON };
        if t.is_date_only() {
            self.put_date(t);
        } else if t.is_time_only() {
            self.put_timeofday(t);
        } else {
            self.put_date(t);
            self.put_timeofday(t);
        }
        self.buf.put_u8(terminator);
    }

    fn put_date(&mut self, t: &Timestamp) {
        let d = t.datetime.date();
        self.buf.put_u8(tag::DATE);
        self.buf.put_slice(
            format!("{:04}{:02}{:02}", d.year(), d.month(), d.day()).as_bytes(),
        );
    }

    fn put_timeofday(&mut self, t: &Timestamp) {
        let time = t.datetime.time();
        self.buf.put_u8(tag::TIME);
        self.buf.put_slice(
            format!("{:02}{:02}{:02}", time.hour(), time.minute(), time.second()).as_bytes(),
        );
        let nsec = time.nanosecond();
        if nsec > 0 {
            self.buf.put_u8(tag::POINT);
            if nsec % 1_000_000 == 0 {
                self.buf
                    .put_slice(format!("{:03}", nsec / 1_000_000).as_bytes());
            } else if nsec % 1_000 == 0 {
                self.buf.put_slice(format!("{:06}", nsec / 1_000).as_bytes());
            } else {
                self.buf.put_slice(format!("{nsec:09}").as_bytes());
            }
        }
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of a string counted in UTF-16 code units: one per BMP codepoint,
/// two per supplementary codepoint. This is the wire contract for the `s`
/// length field and must not be replaced by a byte or codepoint count.
pub(crate) fn utf16_len(s: &str) -> usize {
    s.chars().map(|c| if c as u32 > 0xFFFF { 2 } else { 1 }).sum()
}

fn single_bmp_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if (c as u32) <= 0xFFFF => Some(c),
        _ => None,
    }
}

pub(crate) fn first_letter_to_lower(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            let mut out = String::with_capacity(s.len());
            out.push(c.to_ascii_lowercase());
            out.push_str(chars.as_str());
            out
        }
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::shared;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn encode(v: &Value) -> Vec<u8> {
        let mut w = Writer::new();
        w.serialize(v);
        w.into_bytes().to_vec()
    }

    #[test]
    fn single_digit_integers() {
        assert_eq!(encode(&Value::Int(0)), b"0");
        assert_eq!(encode(&Value::Int(7)), b"7");
        assert_eq!(encode(&Value::Int(9)), b"9");
    }

    #[test]
    fn integer_range_selects_tag() {
        assert_eq!(encode(&Value::Int(-1)), b"i-1;");
        assert_eq!(encode(&Value::Int(1234567)), b"i1234567;");
        assert_eq!(encode(&Value::Int(i64::from(i32::MAX))), b"i2147483647;");
        assert_eq!(
            encode(&Value::Int(i64::from(i32::MAX) + 1)),
            b"l2147483648;"
        );
        assert_eq!(encode(&Value::Int(i64::from(i32::MIN))), b"i-2147483648;");
    }

    #[test]
    fn bignum_always_long() {
        let big: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(
            encode(&Value::Long(big)),
            b"l123456789012345678901234567890;"
        );
        assert_eq!(encode(&Value::Long(BigInt::from(5))), b"l5;");
    }

    #[test]
    fn unsigned_large_uses_long() {
        let mut w = Writer::new();
        w.write_u64(u64::MAX);
        assert_eq!(w.bytes(), b"l18446744073709551615;");
    }

    #[test]
    fn doubles_and_distinguished_floats() {
        assert_eq!(encode(&Value::Double(3.25)), b"d3.25;");
        assert_eq!(encode(&Value::Double(f64::NAN)), b"N");
        assert_eq!(encode(&Value::Double(f64::INFINITY)), b"I+");
        assert_eq!(encode(&Value::Double(f64::NEG_INFINITY)), b"I-");
    }

    #[test]
    fn booleans_and_null() {
        assert_eq!(encode(&Value::Bool(true)), b"t");
        assert_eq!(encode(&Value::Bool(false)), b"f");
        assert_eq!(encode(&Value::Null), b"n");
    }

    #[test]
    fn string_forms() {
        assert_eq!(encode(&Value::from("")), b"e");
        assert_eq!(encode(&Value::from("A")), b"uA");
        assert_eq!(encode(&Value::from("\u{20AC}")), "u\u{20AC}".as_bytes());
        assert_eq!(encode(&Value::from("hello")), b"s5\"hello\"");
    }

    #[test]
    fn supplementary_chars_count_two_units() {
        // One user-perceived char, but two UTF-16 units: not a `u` form.
        assert_eq!(encode(&Value::from("\u{1D11E}")), "s2\"\u{1D11E}\"".as_bytes());
        assert_eq!(encode(&Value::from("A\u{1D11E}B")), "s4\"A\u{1D11E}B\"".as_bytes());
    }

    #[test]
    fn byte_blobs() {
        assert_eq!(encode(&Value::from(vec![1u8, 2, 3])), b"b3\"\x01\x02\x03\"");
        assert_eq!(encode(&Value::from(Vec::<u8>::new())), b"e");
    }

    #[test]
    fn guid_canonical_form() {
        let u = Uuid::parse_str("3f2504e0-4f89-11d3-9a0c-0305e82c3301").unwrap();
        assert_eq!(
            encode(&Value::Guid(u)),
            b"g{3f2504e0-4f89-11d3-9a0c-0305e82c3301}"
        );
    }

    #[test]
    fn date_forms() {
        let midnight = Timestamp::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            true,
        );
        assert_eq!(encode(&Value::Time(midnight)), b"D20240301Z");

        let local = Timestamp::new(midnight.datetime, false);
        assert_eq!(encode(&Value::Time(local)), b"D20240301;");

        let with_millis = Timestamp::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_nano_opt(12, 34, 56, 789_000_000)
                .unwrap(),
            true,
        );
        assert_eq!(encode(&Value::Time(with_millis)), b"D20240301T123456.789Z");

        let with_nanos = Timestamp::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_nano_opt(12, 34, 56, 123_456_789)
                .unwrap(),
            true,
        );
        assert_eq!(
            encode(&Value::Time(with_nanos)),
            b"D20240301T123456.123456789Z"
        );
    }

    #[test]
    fn time_only_form() {
        let t = Timestamp::new(
            NaiveDate::from_ymd_opt(1, 1, 1)
                .unwrap()
                .and_hms_opt(12, 34, 56)
                .unwrap(),
            false,
        );
        assert_eq!(encode(&Value::Time(t)), b"T123456;");
    }

    #[test]
    fn lists_and_maps() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(encode(&list), b"a3{123}");
        assert_eq!(encode(&Value::list(vec![])), b"a{}");

        let map = Value::map(vec![(Value::from("k"), Value::Int(2))]);
        assert_eq!(encode(&map), b"m1{uk2}");
        assert_eq!(encode(&Value::map(vec![])), b"m{}");
    }

    #[test]
    fn shared_string_emits_back_reference() {
        // The list occupies reference slot 0, the string slot 1.
        let s: Arc<str> = Arc::from("abc");
        let list = Value::list(vec![Value::String(s.clone()), Value::String(s)]);
        assert_eq!(encode(&list), b"a2{s3\"abc\"r1;}");
    }

    #[test]
    fn distinct_strings_do_not_alias() {
        let list = Value::list(vec![Value::from("abc"), Value::from("abc")]);
        assert_eq!(encode(&list), b"a2{s3\"abc\"s3\"abc\"}");
    }

    #[test]
    fn cyclic_list_terminates() {
        let handle = shared(Vec::new());
        let list = Value::List(handle.clone());
        handle.write().unwrap().push(list.clone());
        assert_eq!(encode(&list), b"a1{r0;}");
    }

    #[test]
    fn class_then_instances() {
        let class = Arc::new(crate::types::ClassDef::new(
            "Point",
            vec!["x".into(), "y".into()],
        ));
        let p1 = Value::object(class.clone(), vec![Value::Int(1), Value::Int(2)]);
        let p2 = Value::object(class, vec![Value::Int(3), Value::Int(4)]);
        let mut w = Writer::new();
        w.serialize(&p1);
        w.serialize(&p2);
        assert_eq!(
            w.bytes(),
            b"c5\"Point\"2{s1\"x\"s1\"y\"}o0{12}o0{34}".as_slice()
        );
    }

    #[test]
    fn simple_mode_never_emits_refs() {
        let s: Arc<str> = Arc::from("abc");
        let list = Value::list(vec![Value::String(s.clone()), Value::String(s)]);
        let mut w = Writer::new_simple();
        w.serialize(&list);
        let out = w.into_bytes();
        assert_eq!(&out[..], b"a2{s3\"abc\"s3\"abc\"}");
        assert!(!out.contains(&tag::REF));
    }

    #[test]
    fn reset_clears_class_table() {
        let class = Arc::new(crate::types::ClassDef::new("Point", vec!["x".into()]));
        let p = Value::object(class, vec![Value::Int(1)]);
        let mut w = Writer::new();
        w.serialize(&p);
        w.reset();
        w.serialize(&p);
        // Both emissions carry a full class descriptor.
        let out = w.into_bytes();
        assert_eq!(out.iter().filter(|&&b| b == tag::CLASS).count(), 2);
    }

    #[test]
    fn utf16_length_rules() {
        assert_eq!(utf16_len(""), 0);
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("\u{FFFF}"), 1);
        assert_eq!(utf16_len("\u{1D11E}"), 2);
        assert_eq!(utf16_len("A\u{1D11E}B"), 4);
    }

    #[test]
    fn field_name_lowering() {
        assert_eq!(first_letter_to_lower("Name"), "name");
        assert_eq!(first_letter_to_lower("name"), "name");
        assert_eq!(first_letter_to_lower(""), "");
    }
}
