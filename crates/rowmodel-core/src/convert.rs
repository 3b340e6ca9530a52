//! Conversion between the internal, wire and external representations.
//!
//! Every conversion is a `match` on `(FieldType, Representation)`, so adding a field
//! type forces every arm to be revisited. Null short-circuits before the type is
//! consulted: it renders as `NULL` on the wire and as [`Value::Null`] externally for
//! every type, including [`FieldType::Unknown`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::identifiers::quote_string;
use crate::types::{FieldType, Representation};
use crate::value::Value;

/// Wire layout for DateTime literals.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// The slice of field metadata a conversion needs.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<'a> {
    pub name: &'a str,
    pub declared_type: &'a str,
    pub field_type: FieldType,
}

impl<'a> FieldSpec<'a> {
    pub const fn new(name: &'a str, declared_type: &'a str, field_type: FieldType) -> Self {
        Self {
            name,
            declared_type,
            field_type,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::type_error(self.name, self.declared_type, message)
    }

    fn mismatch(&self, value: &Value) -> Error {
        self.error(format!(
            "cannot represent a {} value as {}",
            value.kind(),
            self.field_type.name()
        ))
    }
}

/// Convert an internal value into the requested representation.
///
/// Wire output is always [`Value::Text`] holding the SQL literal.
pub fn render(field: FieldSpec<'_>, repr: Representation, value: &Value) -> Result<Value> {
    match repr {
        Representation::Internal => Ok(value.clone()),
        Representation::Wire => to_wire(field, value).map(Value::Text),
        Representation::External => to_external(field, value),
    }
}

/// Render a value as a SQL literal for the field's type.
pub fn to_wire(field: FieldSpec<'_>, value: &Value) -> Result<String> {
    if value.is_null() {
        return Ok("NULL".to_string());
    }
    match field.field_type {
        FieldType::Binary => Ok(format!("x'{}'", hex(&coerce_bytes(field, value)?))),
        FieldType::DateTime => Ok(format!(
            "'{}'",
            coerce_datetime(field, value)?.format(DATETIME_FORMAT)
        )),
        FieldType::String => Ok(quote_string(&coerce_text(field, value)?)),
        FieldType::Integer => Ok(coerce_int(field, value)?.to_string()),
        FieldType::Float => {
            let v = coerce_float(field, value)?;
            if !v.is_finite() {
                return Err(field.error(format!("{} has no SQL literal", v)));
            }
            Ok(format!("{:.6}", v))
        }
        FieldType::Unknown => Err(field.error("unrecognized column type")),
    }
}

/// Convert a value into its display-oriented form.
pub fn to_external(field: FieldSpec<'_>, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match field.field_type {
        FieldType::Binary => Ok(Value::Text(hex(&coerce_bytes(field, value)?))),
        FieldType::DateTime => coerce_datetime(field, value).map(Value::DateTime),
        FieldType::String => coerce_text(field, value).map(Value::Text),
        FieldType::Integer => coerce_int(field, value).map(Value::Int),
        FieldType::Float => coerce_float(field, value).map(Value::Float),
        FieldType::Unknown => Err(field.error("unrecognized column type")),
    }
}

/// Normalize a value on its way into a record.
///
/// DateTime fields accept free-form date text and Unix seconds; Binary fields accept
/// UUID text (stored as its 16 bytes) and non-negative integers (16-byte big-endian).
/// Other types are stored as given and coerced when rendered.
pub fn normalize(field: FieldSpec<'_>, value: Value) -> Result<Value> {
    match (field.field_type, value) {
        (_, Value::Null) => Ok(Value::Null),
        (FieldType::DateTime, Value::Text(s)) => parse_datetime(&s)
            .map(Value::DateTime)
            .ok_or_else(|| field.error(format!("cannot parse `{}` as a date/time", s))),
        (FieldType::DateTime, Value::Int(secs)) => from_unix(field, secs).map(Value::DateTime),
        (FieldType::DateTime, v @ Value::DateTime(_)) => Ok(v),
        (FieldType::DateTime, v) => Err(field.mismatch(&v)),
        (FieldType::Binary, Value::Text(s)) => Uuid::parse_str(s.trim())
            .map(|id| Value::Bytes(id.as_bytes().to_vec()))
            .map_err(|e| field.error(format!("`{}` is not a UUID literal: {}", s, e))),
        (FieldType::Binary, Value::Int(i)) => {
            if i < 0 {
                return Err(field.error(format!("negative integer {} has no binary form", i)));
            }
            Ok(Value::Bytes((i as u128).to_be_bytes().to_vec()))
        }
        (FieldType::Binary, v @ Value::Bytes(_)) => Ok(v),
        (FieldType::Binary, v) => Err(field.mismatch(&v)),
        (_, v) => Ok(v),
    }
}

/// Parse a date/time written in any of the common layouts.
///
/// Zoned inputs (RFC 3339, RFC 2822) keep their wall-clock time; date-only inputs
/// resolve to midnight.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.naive_local());
    }
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(input, layout).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn from_unix(field: FieldSpec<'_>, secs: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| field.error(format!("timestamp {} is out of range", secs)))
}

fn coerce_int(field: FieldSpec<'_>, value: &Value) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .ok_or_else(|| field.error(format!("`{}` is not an integer", s)))
        }
        other => Err(field.mismatch(other)),
    }
}

fn coerce_float(field: FieldSpec<'_>, value: &Value) -> Result<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| field.error(format!("`{}` is not a number", s))),
        other => Err(field.mismatch(other)),
    }
}

fn coerce_text(field: FieldSpec<'_>, value: &Value) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Int(_) | Value::Float(_) | Value::DateTime(_) => Ok(value.to_string()),
        Value::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
        Value::Null => Err(field.mismatch(value)),
    }
}

fn coerce_datetime(field: FieldSpec<'_>, value: &Value) -> Result<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Text(s) => parse_datetime(s)
            .ok_or_else(|| field.error(format!("cannot parse `{}` as a date/time", s))),
        Value::Int(secs) => from_unix(field, *secs),
        other => Err(field.mismatch(other)),
    }
}

fn coerce_bytes(field: FieldSpec<'_>, value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Text(s) => Ok(s.as_bytes().to_vec()),
        other => Err(field.mismatch(other)),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
