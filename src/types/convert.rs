//! Conversions out of [`Value`] into native destinations.
//!
//! These are the "best-effort coercion" rules the reader applies when a
//! back-reference or a dynamically decoded value has to fulfill a typed
//! request: referenced strings re-parse into numbers, numbers stringify,
//! non-zero numerics count as true. Incompatible pairs fail with a typed
//! conversion error.

use std::collections::HashMap;

use num_bigint::BigInt;
use uuid::Uuid;

use crate::error::HproseError;
use crate::types::{Timestamp, Value};

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "big int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Guid(_) => "guid",
            Self::Time(_) => "time",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    fn conversion_error(&self, to: &str) -> HproseError {
        HproseError::Conversion {
            from: self.type_name().to_string(),
            to: to.to_string(),
        }
    }

    pub fn to_i64(&self) -> Result<i64, HproseError> {
        match self {
            Self::Null => Ok(0),
            Self::Bool(b) => Ok(i64::from(*b)),
            Self::Int(i) => Ok(*i),
            Self::Long(i) => i64::try_from(i).map_err(|_| self.conversion_error("i64")),
            Self::Double(f) => Ok(*f as i64),
            Self::String(s) => s
                .parse::<i64>()
                .map_err(|_| self.conversion_error("i64")),
            _ => Err(self.conversion_error("i64")),
        }
    }

    pub fn to_f64(&self) -> Result<f64, HproseError> {
        match self {
            Self::Null => Ok(0.0),
            Self::Bool(b) => Ok(f64::from(u8::from(*b))),
            Self::Int(i) => Ok(*i as f64),
            Self::Long(i) => Ok(bigint_to_f64(i)),
            Self::Double(f) => Ok(*f),
            Self::String(s) => s
                .parse::<f64>()
                .map_err(|_| self.conversion_error("f64")),
            _ => Err(self.conversion_error("f64")),
        }
    }

    pub fn to_bool(&self) -> Result<bool, HproseError> {
        match self {
            Self::Null => Ok(false),
            Self::Bool(b) => Ok(*b),
            Self::Int(i) => Ok(*i != 0),
            Self::Long(i) => Ok(*i != BigInt::from(0)),
            Self::Double(f) => Ok(*f != 0.0 || f.is_nan()),
            Self::String(s) => parse_bool(s).ok_or_else(|| self.conversion_error("bool")),
            _ => Err(self.conversion_error("bool")),
        }
    }

    pub fn to_bigint(&self) -> Result<BigInt, HproseError> {
        match self {
            Self::Null => Ok(BigInt::from(0)),
            Self::Bool(b) => Ok(BigInt::from(u8::from(*b))),
            Self::Int(i) => Ok(BigInt::from(*i)),
            Self::Long(i) => Ok(i.clone()),
            Self::Double(f) => Ok(BigInt::from(*f as i64)),
            Self::String(s) => s
                .parse::<BigInt>()
                .map_err(|_| self.conversion_error("big int")),
            _ => Err(self.conversion_error("big int")),
        }
    }

    /// Stringifies the value. Numbers, booleans, dates, times, and GUIDs all
    /// have canonical text forms; byte blobs must be valid UTF-8.
    pub fn to_string_value(&self) -> Result<String, HproseError> {
        match self {
            Self::Null => Ok(String::new()),
            Self::Bool(b) => Ok(b.to_string()),
            Self::Int(i) => Ok(i.to_string()),
            Self::Long(i) => Ok(i.to_string()),
            Self::Double(f) => Ok(f.to_string()),
            Self::String(s) => Ok(s.to_string()),
            Self::Guid(u) => Ok(u.to_string()),
            Self::Time(t) => Ok(t.to_string()),
            Self::Bytes(b) => String::from_utf8(b.read().unwrap().clone())
                .map_err(|_| HproseError::BadUtf8),
            _ => Err(self.conversion_error("string")),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, HproseError> {
        match self {
            Self::Null => Ok(Vec::new()),
            Self::String(s) => Ok(s.as_bytes().to_vec()),
            Self::Bytes(b) => Ok(b.read().unwrap().clone()),
            Self::Guid(u) => Ok(u.as_bytes().to_vec()),
            Self::List(items) => items
                .read()
                .unwrap()
                .iter()
                .map(|v| {
                    u8::try_from(v.to_i64()?).map_err(|_| self.conversion_error("bytes"))
                })
                .collect(),
            _ => Err(self.conversion_error("bytes")),
        }
    }

    pub fn to_guid(&self) -> Result<Uuid, HproseError> {
        match self {
            Self::Guid(u) => Ok(*u),
            Self::String(s) => Uuid::parse_str(s).map_err(|_| self.conversion_error("guid")),
            Self::Bytes(b) => Uuid::from_slice(&b.read().unwrap())
                .map_err(|_| self.conversion_error("guid")),
            _ => Err(self.conversion_error("guid")),
        }
    }

    pub fn to_time(&self) -> Result<Timestamp, HproseError> {
        match self {
            Self::Null => Ok(Timestamp::zero()),
            Self::Time(t) => Ok(*t),
            Self::String(s) => parse_timestamp(s).ok_or_else(|| self.conversion_error("time")),
            _ => Err(self.conversion_error("time")),
        }
    }
}

/// Boolean text forms accepted by the coercion rules.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Parses the canonical [`Timestamp`] display form back into a timestamp.
pub(crate) fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let (body, utc) = match s.strip_suffix(" UTC") {
        Some(body) => (body, true),
        None => (s, false),
    };
    let dt = chrono::NaiveDateTime::parse_from_str(body, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Some(Timestamp::new(dt, utc))
}

fn bigint_to_f64(i: &BigInt) -> f64 {
    // Good enough for coercion; precision loss is inherent to the request.
    i.to_string().parse::<f64>().unwrap_or(f64::NAN)
}

/// Conversion from a decoded [`Value`] into a typed destination.
///
/// This is the typed half of the reader: containers and records are decoded
/// dynamically first (which keeps the reference table in lock-step with the
/// writer) and then converted through this trait.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, HproseError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        Ok(value)
    }
}

macro_rules! from_value_int {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, HproseError> {
                let i = value.to_i64()?;
                <$t>::try_from(i).map_err(|_| HproseError::Conversion {
                    from: i.to_string(),
                    to: stringify!($t).to_string(),
                })
            }
        }
    )*};
}

from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        value.to_f64()
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        Ok(value.to_f64()? as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        value.to_bool()
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        value.to_string_value()
    }
}

impl FromValue for BigInt {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        value.to_bigint()
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        value.to_guid()
    }
}

impl FromValue for Timestamp {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        value.to_time()
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        value.to_bytes()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => {
                let items = items.read().unwrap().clone();
                items.into_iter().map(T::from_value).collect()
            }
            other => Err(other.conversion_error("list")),
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: Value) -> Result<Self, HproseError> {
        match value {
            Value::Null => Ok(HashMap::new()),
            // A list fulfills a map request with the element index as key.
            Value::List(items) => {
                let items = items.read().unwrap().clone();
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| Ok((i.to_string(), T::from_value(v)?)))
                    .collect()
            }
            Value::Map(pairs) => {
                let pairs = pairs.read().unwrap().clone();
                pairs
                    .into_iter()
                    .map(|(k, v)| Ok((k.to_string_value()?, T::from_value(v)?)))
                    .collect()
            }
            Value::Object(o) => {
                let o = o.read().unwrap();
                o.class
                    .fields
                    .iter()
                    .zip(o.fields.iter())
                    .map(|(k, v)| Ok((k.clone(), T::from_value(v.clone())?)))
                    .collect()
            }
            other => Err(other.conversion_error("map")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercions() {
        assert_eq!(Value::Null.to_i64().unwrap(), 0);
        assert_eq!(Value::Bool(true).to_i64().unwrap(), 1);
        assert_eq!(Value::Double(3.9).to_i64().unwrap(), 3);
        assert_eq!(Value::from("42").to_i64().unwrap(), 42);
        assert!(Value::from("x").to_i64().is_err());
        assert!(Value::list(vec![]).to_i64().is_err());
    }

    #[test]
    fn bool_coercions() {
        assert!(Value::Double(f64::NAN).to_bool().unwrap());
        assert!(Value::Int(-3).to_bool().unwrap());
        assert!(!Value::from("false").to_bool().unwrap());
        assert!(Value::from("t").to_bool().unwrap());
    }

    #[test]
    fn stringify() {
        assert_eq!(Value::Int(12).to_string_value().unwrap(), "12");
        assert_eq!(Value::Bool(false).to_string_value().unwrap(), "false");
        let guid = Uuid::parse_str("3f2504e0-4f89-11d3-9a0c-0305e82c3301").unwrap();
        assert_eq!(
            Value::Guid(guid).to_string_value().unwrap(),
            "3f2504e0-4f89-11d3-9a0c-0305e82c3301"
        );
        assert!(Value::from(vec![0xFFu8, 0xFE]).to_string_value().is_err());
    }

    #[test]
    fn timestamp_text_round_trip() {
        let ts = Timestamp::new(
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_nano_opt(8, 15, 30, 250_000_000)
                .unwrap(),
            true,
        );
        let parsed = parse_timestamp(&ts.to_string()).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn typed_container_conversion() {
        let v = Value::list(vec![Value::Int(1), Value::from("2"), Value::Bool(true)]);
        let ints: Vec<i32> = FromValue::from_value(v).unwrap();
        assert_eq!(ints, vec![1, 2, 1]);

        let m = Value::map(vec![(Value::from("a"), Value::Int(5))]);
        let map: HashMap<String, i64> = FromValue::from_value(m).unwrap();
        assert_eq!(map["a"], 5);
    }

    #[test]
    fn list_fulfills_map_request_by_index() {
        let v = Value::list(vec![Value::from("a"), Value::from("b")]);
        let map: HashMap<String, String> = FromValue::from_value(v).unwrap();
        assert_eq!(map["0"], "a");
        assert_eq!(map["1"], "b");
    }

    #[test]
    fn option_preserves_null() {
        let v: Option<i64> = FromValue::from_value(Value::Null).unwrap();
        assert_eq!(v, None);
        let v: Option<i64> = FromValue::from_value(Value::Int(9)).unwrap();
        assert_eq!(v, Some(9));
    }
}
