//! Hprose value types.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use num_bigint::BigInt;
use uuid::Uuid;

/// Shared, identity-bearing container handle.
///
/// Reference-eligible containers are held behind `Shared` so the writer can
/// answer "have I already emitted this?" by pointer identity, the reader can
/// reconstruct sharing by cloning the handle, and cyclic graphs can be
/// decoded by registering the container before its elements are filled in.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wraps a value in a fresh [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// A point in time with nanosecond precision and an explicit UTC-vs-local
/// flag. The flag survives the wire (`Z` vs `;` terminator); the instant is
/// not converted between zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub datetime: NaiveDateTime,
    pub utc: bool,
}

impl Timestamp {
    pub fn new(datetime: NaiveDateTime, utc: bool) -> Self {
        Self { datetime, utc }
    }

    /// The zero time: 0001-01-01 00:00:00 UTC.
    pub fn zero() -> Self {
        let date = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        Self {
            datetime: date.and_hms_opt(0, 0, 0).unwrap(),
            utc: true,
        }
    }

    /// True when the time-of-day portion is exactly midnight with zero
    /// nanoseconds. Such timestamps are emitted in the date-only form.
    pub fn is_date_only(&self) -> bool {
        let t = self.datetime.time();
        t.hour() == 0 && t.minute() == 0 && t.second() == 0 && t.nanosecond() == 0
    }

    /// True when the date portion is the epoch date 0001-01-01. Such
    /// timestamps are emitted in the time-only form.
    pub fn is_time_only(&self) -> bool {
        self.datetime.date() == NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format("%Y-%m-%d %H:%M:%S%.f"))?;
        if self.utc {
            write!(f, " UTC")?;
        }
        Ok(())
    }
}

/// A record schema: class name plus field names in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub fields: Vec<String>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// A record instance: its schema and positional field values.
#[derive(Debug, Clone)]
pub struct Object {
    pub class: Arc<ClassDef>,
    pub fields: Vec<Value>,
}

/// A value in the Hprose codec.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Long(BigInt),
    Double(f64),
    String(Arc<str>),
    Bytes(Shared<Vec<u8>>),
    Guid(Uuid),
    Time(Timestamp),
    List(Shared<Vec<Value>>),
    Map(Shared<Vec<(Value, Value)>>),
    Object(Shared<Object>),
}

impl Value {
    /// Builds a list value from owned elements.
    pub fn list(items: Vec<Value>) -> Self {
        Self::List(shared(items))
    }

    /// Builds a map value from owned key/value pairs.
    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Self::Map(shared(pairs))
    }

    /// Builds a record value from a schema and field values.
    pub fn object(class: Arc<ClassDef>, fields: Vec<Value>) -> Self {
        Self::Object(shared(Object { class, fields }))
    }

    /// Returns the value as a string reference, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// A stable address identifying the underlying storage of handle-typed
    /// values, used by the writer's reference table. `None` for values
    /// without shared storage; those are never deduplicated.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(Arc::as_ptr(s) as *const u8 as usize),
            Self::Bytes(b) => Some(Arc::as_ptr(b) as usize),
            Self::List(l) => Some(Arc::as_ptr(l) as usize),
            Self::Map(m) => Some(Arc::as_ptr(m) as usize),
            Self::Object(o) => Some(Arc::as_ptr(o) as usize),
            _ => None,
        }
    }

    /// True when two values share the same underlying storage.
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Guid(a), Self::Guid(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => {
                Arc::ptr_eq(a, b) || *a.read().unwrap() == *b.read().unwrap()
            }
            (Self::List(a), Self::List(b)) => {
                Arc::ptr_eq(a, b) || *a.read().unwrap() == *b.read().unwrap()
            }
            (Self::Map(a), Self::Map(b)) => {
                Arc::ptr_eq(a, b) || *a.read().unwrap() == *b.read().unwrap()
            }
            (Self::Object(a), Self::Object(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.read().unwrap(), b.read().unwrap());
                a.class == b.class && a.fields == b.fields
            }
            _ => false,
        }
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Self::Int(i),
            Err(_) => Self::Long(BigInt::from(u)),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s.as_str()))
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Self::Long(i)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(shared(b))
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Guid(u)
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Self::Time(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::list(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(i) => write!(f, "{i}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.read().unwrap().len()),
            Self::Guid(u) => write!(f, "{u}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.read().unwrap().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.read().unwrap().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Object(o) => {
                let o = o.read().unwrap();
                write!(f, "{}{{", o.class.name)?;
                for (i, (name, value)) in o.class.fields.iter().zip(&o.fields).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
