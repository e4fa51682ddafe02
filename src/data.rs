use std::{
    fmt,
    hash::{Hash, Hasher},
};

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::temporal;

/// Physical storage kind of a column, as handed over by the loader.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Integer,
    Float,
    Boolean,
    String,
    DateTime,
    Other,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Integer => "integer",
            StorageType::Float => "float",
            StorageType::Boolean => "boolean",
            StorageType::String => "string",
            StorageType::DateTime => "datetime",
            StorageType::Other => "other",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            StorageType::Integer | StorageType::Float | StorageType::Boolean
        )
    }

    /// Whether `value` may be stored in a column of this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (StorageType::Other, _) => true,
            (StorageType::Integer, Value::Integer(_)) => true,
            (StorageType::Float, Value::Float(_) | Value::Integer(_)) => true,
            (StorageType::Boolean, Value::Boolean(_)) => true,
            (StorageType::String, Value::String(_)) => true,
            (StorageType::DateTime, Value::DateTime(_)) => true,
            _ => false,
        }
    }

    /// Bytes a single cell occupies before any variable-length payload.
    pub(crate) fn fixed_width(&self) -> usize {
        match self {
            StorageType::Integer => std::mem::size_of::<i64>(),
            StorageType::Float => std::mem::size_of::<f64>(),
            StorageType::Boolean => std::mem::size_of::<bool>(),
            StorageType::DateTime => std::mem::size_of::<i64>(),
            StorageType::String | StorageType::Other => std::mem::size_of::<String>(),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::DateTime(dt) => format_timestamp(dt),
        }
    }

    /// Extra heap bytes owned by the value beyond its fixed cell width.
    pub(crate) fn heap_size(&self) -> usize {
        match self {
            Value::String(s) => s.len(),
            _ => 0,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Coerces a cell to `f64`; anything that is not a number becomes missing.
pub fn to_numeric(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::DateTime(_) => return None,
    };
    (!parsed.is_nan()).then_some(parsed)
}

/// Coerces a cell to a timestamp; typed timestamps pass through untouched.
pub fn to_datetime(value: Option<&Value>) -> Option<NaiveDateTime> {
    match value? {
        Value::DateTime(dt) => Some(*dt),
        Value::String(s) => temporal::parse_free_form(s),
        _ => None,
    }
}

/// `YYYY-MM-DD HH:MM:SS`, with a fractional part only when non-zero.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// `YYYY-MM-DD`, for values known to fall at midnight.
pub fn format_date(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// ISO-8601 `YYYY-MM-DDTHH:MM:SS`, with a fractional part only when non-zero.
pub fn format_iso8601(dt: &NaiveDateTime) -> String {
    let mut rendered = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    );
    let nanos = dt.nanosecond() % 1_000_000_000;
    if nanos > 0 {
        if nanos % 1_000 == 0 {
            rendered.push_str(&format!(".{:06}", nanos / 1_000));
        } else {
            rendered.push_str(&format!(".{nanos:09}"));
        }
    }
    rendered
}
