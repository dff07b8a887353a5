//! Serialization capability traits and the record machinery.
//!
//! [`Encodable`]/[`Decodable`] are the typed seams of the codec: primitives
//! and common containers implement them directly, and user records gain them
//! through the [`Record`] trait, which replaces the original runtime
//! reflection walk with a compile-time field table.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use num_bigint::BigInt;
use uuid::Uuid;

use super::reader::Reader;
use super::writer::Writer;
use crate::error::HproseError;
use crate::types::{FromValue, Timestamp, Value};

/// A value that can be emitted by a [`Writer`].
pub trait Encodable {
    fn encode(&self, w: &mut Writer);
}

/// A value that can be read from a [`Reader`].
pub trait Decodable: Sized {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError>;
}

/// A user-defined record with a named schema and positional fields.
///
/// `FIELDS` lists field names in emission order; names are lower-cased on
/// first emission and matched case-insensitively on decode. Missing fields
/// keep the `Default` value, unknown incoming fields are discarded.
pub trait Record: Default {
    const NAME: &'static str;
    const FIELDS: &'static [&'static str];

    /// Emits the field at `index` in the schema order.
    fn encode_field(&self, index: usize, w: &mut Writer);

    /// Assigns a decoded value to the field at `index` in the schema order.
    fn set_field(&mut self, index: usize, value: Value) -> Result<(), HproseError>;
}

// -- Class alias registry --
//
// Maps a record type to the class name used on the wire when it differs from
// `Record::NAME`. Process-wide, never evicted.

static CLASS_ALIASES: OnceLock<RwLock<HashMap<TypeId, String>>> = OnceLock::new();

/// Registers `alias` as the wire class name for `T`.
pub fn register_class_alias<T: Record + 'static>(alias: &str) {
    CLASS_ALIASES
        .get_or_init(Default::default)
        .write()
        .unwrap()
        .insert(TypeId::of::<T>(), alias.to_string());
}

pub(crate) fn class_alias<T: Record + 'static>() -> Option<String> {
    CLASS_ALIASES
        .get_or_init(Default::default)
        .read()
        .unwrap()
        .get(&TypeId::of::<T>())
        .cloned()
}

// -- Field index cache --
//
// Lower-cased field name → position, computed lazily once per destination
// type. Shared process-wide behind a read/write lock; entries are never
// evicted.

type FieldIndex = Arc<HashMap<String, usize>>;

static FIELD_INDEX_CACHE: OnceLock<RwLock<HashMap<TypeId, FieldIndex>>> = OnceLock::new();

pub(crate) fn field_index<T: Record + 'static>() -> FieldIndex {
    let cache = FIELD_INDEX_CACHE.get_or_init(Default::default);
    if let Some(index) = cache.read().unwrap().get(&TypeId::of::<T>()) {
        return index.clone();
    }
    let mut cache = cache.write().unwrap();
    cache
        .entry(TypeId::of::<T>())
        .or_insert_with(|| {
            Arc::new(
                T::FIELDS
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.to_lowercase(), i))
                    .collect(),
            )
        })
        .clone()
}

/// Fills a typed record from a dynamically decoded value. Accepts either an
/// object (schema retained from the stream) or a string-keyed map.
pub(crate) fn record_from_value<T: Record + 'static>(value: Value) -> Result<T, HproseError> {
    let index = field_index::<T>();
    let mut out = T::default();
    match value {
        Value::Object(o) => {
            let (names, values) = {
                let o = o.read().unwrap();
                (o.class.fields.clone(), o.fields.clone())
            };
            for (name, field) in names.iter().zip(values) {
                if let Some(&i) = index.get(&name.to_lowercase()) {
                    out.set_field(i, field)?;
                }
            }
            Ok(out)
        }
        Value::Map(pairs) => {
            let pairs = pairs.read().unwrap().clone();
            for (key, field) in pairs {
                let name = key.to_string_value()?;
                if let Some(&i) = index.get(&name.to_lowercase()) {
                    out.set_field(i, field)?;
                }
            }
            Ok(out)
        }
        other => Err(HproseError::Conversion {
            from: other.to_string(),
            to: T::NAME.to_string(),
        }),
    }
}

// -- Encodable implementations --

macro_rules! encodable_signed {
    ($($t:ty),*) => {$(
        impl Encodable for $t {
            fn encode(&self, w: &mut Writer) {
                w.write_i64(i64::from(*self));
            }
        }
    )*};
}

encodable_signed!(i8, i16, i32, i64, u8, u16, u32);

impl Encodable for u64 {
    fn encode(&self, w: &mut Writer) {
        w.write_u64(*self);
    }
}

impl Encodable for usize {
    fn encode(&self, w: &mut Writer) {
        w.write_u64(*self as u64);
    }
}

impl Encodable for f32 {
    fn encode(&self, w: &mut Writer) {
        w.write_f64(f64::from(*self));
    }
}

impl Encodable for f64 {
    fn encode(&self, w: &mut Writer) {
        w.write_f64(*self);
    }
}

impl Encodable for bool {
    fn encode(&self, w: &mut Writer) {
        w.write_bool(*self);
    }
}

impl Encodable for str {
    fn encode(&self, w: &mut Writer) {
        w.write_string_with_ref(self);
    }
}

impl Encodable for String {
    fn encode(&self, w: &mut Writer) {
        w.write_string_with_ref(self);
    }
}

impl Encodable for BigInt {
    fn encode(&self, w: &mut Writer) {
        w.write_bigint(self);
    }
}

impl Encodable for Uuid {
    fn encode(&self, w: &mut Writer) {
        w.write_guid(self);
    }
}

impl Encodable for Timestamp {
    fn encode(&self, w: &mut Writer) {
        w.write_time(self);
    }
}

impl Encodable for Value {
    fn encode(&self, w: &mut Writer) {
        w.serialize(self);
    }
}

impl Encodable for Vec<u8> {
    fn encode(&self, w: &mut Writer) {
        w.write_bytes(self);
    }
}

macro_rules! encodable_seq {
    ($($elem:ty),*) => {$(
        impl Encodable for Vec<$elem> {
            fn encode(&self, w: &mut Writer) {
                w.write_seq_header(self.len());
                for item in self {
                    item.encode(w);
                }
                w.finish_container();
            }
        }
    )*};
}

encodable_seq!(i32, i64, f64, bool, String, Value);

impl<V: Encodable> Encodable for HashMap<String, V> {
    fn encode(&self, w: &mut Writer) {
        w.write_map_header(self.len());
        for (key, value) in self {
            w.write_string_with_ref(key);
            value.encode(w);
        }
        w.finish_container();
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self, w: &mut Writer) {
        match self {
            Some(v) => v.encode(w),
            None => w.write_null(),
        }
    }
}

// -- Decodable implementations --

macro_rules! decodable_int {
    ($($t:ty),*) => {$(
        impl Decodable for $t {
            fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
                let i = r.read_i64()?.unwrap_or(0);
                <$t>::try_from(i).map_err(|_| HproseError::Conversion {
                    from: i.to_string(),
                    to: stringify!($t).to_string(),
                })
            }
        }
    )*};
}

decodable_int!(i8, i16, i32, u8, u16, u32);

impl Decodable for i64 {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_i64()?.unwrap_or(0))
    }
}

impl Decodable for u64 {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_u64()?.unwrap_or(0))
    }
}

impl Decodable for f64 {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_f64()?.unwrap_or(0.0))
    }
}

impl Decodable for f32 {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_f64()?.unwrap_or(0.0) as f32)
    }
}

impl Decodable for bool {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_bool()?.unwrap_or(false))
    }
}

impl Decodable for String {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_string()?.unwrap_or_default())
    }
}

impl Decodable for BigInt {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_bigint()?.unwrap_or_else(|| BigInt::from(0)))
    }
}

impl Decodable for Uuid {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_guid()?.unwrap_or(Uuid::nil()))
    }
}

impl Decodable for Timestamp {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_time()?.unwrap_or_else(Timestamp::zero))
    }
}

impl Decodable for Vec<u8> {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        Ok(r.read_bytes()?.unwrap_or_default())
    }
}

impl Decodable for Value {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        r.read_value()
    }
}

macro_rules! decodable_via_value {
    ($($t:ty),*) => {$(
        impl Decodable for $t {
            fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
                let v = r.read_value()?;
                FromValue::from_value(v)
            }
        }
    )*};
}

decodable_via_value!(Vec<i32>, Vec<i64>, Vec<f64>, Vec<bool>, Vec<String>, Vec<Value>);

impl<T: FromValue> Decodable for Option<T> {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        let v = r.read_value()?;
        FromValue::from_value(v)
    }
}

impl<V: FromValue> Decodable for HashMap<String, V> {
    fn decode(r: &mut Reader<'_>) -> Result<Self, HproseError> {
        let v = r.read_value()?;
        FromValue::from_value(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Record for Point {
        const NAME: &'static str = "Point";
        const FIELDS: &'static [&'static str] = &["x", "y"];

        fn encode_field(&self, index: usize, w: &mut Writer) {
            match index {
                0 => self.x.encode(w),
                _ => self.y.encode(w),
            }
        }

        fn set_field(&mut self, index: usize, value: Value) -> Result<(), HproseError> {
            match index {
                0 => self.x = FromValue::from_value(value)?,
                _ => self.y = FromValue::from_value(value)?,
            }
            Ok(())
        }
    }

    #[test]
    fn record_encodes_class_then_instances() {
        let mut w = Writer::new();
        w.write_record(&Point { x: 1, y: 2 });
        w.write_record(&Point { x: 3, y: 4 });
        assert_eq!(
            w.bytes(),
            b"c5\"Point\"2{s1\"x\"s1\"y\"}o0{12}o0{34}".as_slice()
        );
    }

    #[test]
    fn record_round_trip() {
        let mut w = Writer::new();
        w.write_record(&Point { x: 7, y: -9 });
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let p: Point = r.read_record().unwrap().unwrap();
        assert_eq!(p, Point { x: 7, y: -9 });
    }

    #[test]
    fn record_field_match_is_case_insensitive() {
        let data = b"c5\"Point\"2{s1\"X\"s1\"Y\"}o0{12}";
        let mut r = Reader::new(data);
        let p: Point = r.read_record().unwrap().unwrap();
        assert_eq!(p, Point { x: 1, y: 2 });
    }

    #[test]
    fn unknown_fields_discarded_missing_left_default() {
        // Class carries an extra "z" field and omits "y".
        let data = b"c5\"Point\"2{s1\"x\"s1\"z\"}o0{19}";
        let mut r = Reader::new(data);
        let p: Point = r.read_record().unwrap().unwrap();
        assert_eq!(p, Point { x: 1, y: 0 });
    }

    #[test]
    fn record_decodes_from_map() {
        let data = b"m2{s1\"y\"5s1\"x\"2}";
        let mut r = Reader::new(data);
        let p: Point = r.read_record().unwrap().unwrap();
        assert_eq!(p, Point { x: 2, y: 5 });
    }

    #[test]
    fn null_record_is_none() {
        let mut r = Reader::new(b"n");
        let p: Option<Point> = r.read_record().unwrap();
        assert!(p.is_none());
    }

    #[derive(Debug, Default, PartialEq)]
    struct Renamed {
        id: i64,
    }

    impl Record for Renamed {
        const NAME: &'static str = "Renamed";
        const FIELDS: &'static [&'static str] = &["id"];

        fn encode_field(&self, _index: usize, w: &mut Writer) {
            self.id.encode(w);
        }

        fn set_field(&mut self, _index: usize, value: Value) -> Result<(), HproseError> {
            self.id = FromValue::from_value(value)?;
            Ok(())
        }
    }

    #[test]
    fn class_alias_changes_wire_name() {
        register_class_alias::<Renamed>("User");
        let mut w = Writer::new();
        w.write_record(&Renamed { id: 3 });
        assert_eq!(w.bytes(), b"c4\"User\"1{s2\"id\"}o0{3}".as_slice());
    }

    #[test]
    fn scalar_encodable_decodable_round_trip() {
        let mut w = Writer::new();
        42i32.encode(&mut w);
        "hi".encode(&mut w);
        true.encode(&mut w);
        3.5f64.encode(&mut w);
        Option::<i64>::None.encode(&mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(i32::decode(&mut r).unwrap(), 42);
        assert_eq!(String::decode(&mut r).unwrap(), "hi");
        assert!(bool::decode(&mut r).unwrap());
        assert_eq!(f64::decode(&mut r).unwrap(), 3.5);
        assert_eq!(Option::<i64>::decode(&mut r).unwrap(), None);
    }

    #[test]
    fn container_encodable_decodable_round_trip() {
        let mut w = Writer::new();
        vec![1i64, 2, 3].encode(&mut w);
        let mut map = HashMap::new();
        map.insert("k".to_string(), 7i64);
        map.encode(&mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(Vec::<i64>::decode(&mut r).unwrap(), vec![1, 2, 3]);
        let decoded: HashMap<String, i64> = Decodable::decode(&mut r).unwrap();
        assert_eq!(decoded["k"], 7);
    }

    #[test]
    fn field_index_is_cached() {
        let a = field_index::<Point>();
        let b = field_index::<Point>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a["x"], 0);
        assert_eq!(a["y"], 1);
    }
}
