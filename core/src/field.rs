//! Tri-state field model.
//!
//! # Design
//! A CRM PATCH treats an omitted key as "leave unchanged" and an explicit
//! `null` as "clear". `Field<T>` keeps those two apart from a present value,
//! including zero-valued ones (`""`, `false`, `0`), so a record can be
//! decoded, edited and sent back without turning "not sent" into "cleared".
//!
//! Decoding is name-aware: `Field::decode` receives the wire name and the raw
//! fragment (or `None` when the key is missing), which is what lets
//! `FieldDecodeError` point at the offending property.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::FieldDecodeError;

/// A remote field that is absent, explicitly null, or present with a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not sent; omitted from encoded payloads.
    #[default]
    Absent,
    /// Sent as an explicit JSON `null`.
    Null,
    Present(T),
}

pub type StringField = Field<String>;
pub type BoolField = Field<bool>;
pub type IntField = Field<i64>;
pub type NumberField = Field<f64>;
pub type TimeField = Field<DateTime<Utc>>;

pub fn string(value: impl Into<String>) -> StringField {
    Field::Present(value.into())
}

pub fn boolean(value: bool) -> BoolField {
    Field::Present(value)
}

pub fn integer(value: i64) -> IntField {
    Field::Present(value)
}

pub fn number(value: f64) -> NumberField {
    Field::Present(value)
}

pub fn timestamp(value: DateTime<Utc>) -> TimeField {
    Field::Present(value)
}

impl<T> Field<T> {
    pub fn present(value: T) -> Self {
        Field::Present(value)
    }

    /// `None` becomes `Null`, not `Absent`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Null,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// The value, or `None` when the field is absent or null.
    pub fn get(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Present(v) => Field::Present(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Present(v) => Field::Present(f(v)),
        }
    }
}

impl Field<String> {
    pub fn as_deref(&self) -> Option<&str> {
        self.get().map(String::as_str)
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Present(value)
    }
}

/// A primitive that can sit inside a `Field`.
pub trait FieldValue: Sized {
    /// Whether an empty string on the wire means null for this type.
    const BLANK_IS_NULL: bool = true;

    /// Decode a non-null JSON fragment; the error is a human-readable reason.
    fn decode(raw: &Value) -> Result<Self, String>;

    fn encode(&self) -> Value;
}

impl<T: FieldValue> Field<T> {
    /// Decode the fragment found under `name`, or `None` if the key was missing.
    pub fn decode(name: &str, raw: Option<&Value>) -> Result<Self, FieldDecodeError> {
        match raw {
            None => Ok(Field::Absent),
            Some(Value::Null) => Ok(Field::Null),
            Some(Value::String(s)) if T::BLANK_IS_NULL && s.is_empty() => Ok(Field::Null),
            Some(v) => T::decode(v).map(Field::Present).map_err(|reason| FieldDecodeError {
                field: name.to_string(),
                raw: v.to_string(),
                reason,
            }),
        }
    }

    /// `None` means the key must be omitted.
    pub fn encode(&self) -> Option<Value> {
        match self {
            Field::Absent => None,
            Field::Null => Some(Value::Null),
            Field::Present(v) => Some(v.encode()),
        }
    }

    pub fn encode_into(&self, props: &mut Map<String, Value>, name: &str) {
        match self.encode() {
            Some(value) => {
                props.insert(name.to_string(), value);
            }
            None => {
                props.remove(name);
            }
        }
    }
}

/// Remove `name` from `props` and decode it.
pub fn take_field<T: FieldValue>(
    props: &mut Map<String, Value>,
    name: &str,
) -> Result<Field<T>, FieldDecodeError> {
    let raw = props.remove(name);
    Field::decode(name, raw.as_ref())
}

impl<T: FieldValue> Serialize for Field<T> {
    /// Absent fields serialize as null here; containers skip them with
    /// `skip_serializing_if = "Field::is_absent"`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Absent | Field::Null => serializer.serialize_none(),
            Field::Present(v) => v.encode().serialize(serializer),
        }
    }
}

impl<'de, T: FieldValue> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Field::decode("<unnamed>", Some(&raw)).map_err(de::Error::custom)
    }
}

impl FieldValue for String {
    const BLANK_IS_NULL: bool = false;

    fn decode(raw: &Value) -> Result<Self, String> {
        match raw {
            Value::String(s) => Ok(s.clone()),
            _ => Err("expected a string".to_string()),
        }
    }

    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FieldValue for bool {
    fn decode(raw: &Value) -> Result<Self, String> {
        match raw {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err("expected a boolean".to_string()),
            },
            _ => Err("expected a boolean".to_string()),
        }
    }

    fn encode(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for i64 {
    fn decode(raw: &Value) -> Result<Self, String> {
        match raw {
            Value::Number(n) => n.as_i64().ok_or_else(|| "expected an integer".to_string()),
            Value::String(s) => s.parse().map_err(|_| "expected an integer".to_string()),
            _ => Err("expected an integer".to_string()),
        }
    }

    fn encode(&self) -> Value {
        Value::from(*self)
    }
}

impl FieldValue for f64 {
    fn decode(raw: &Value) -> Result<Self, String> {
        match raw {
            Value::Number(n) => n.as_f64().ok_or_else(|| "expected a number".to_string()),
            Value::String(s) => s.parse().map_err(|_| "expected a number".to_string()),
            _ => Err("expected a number".to_string()),
        }
    }

    fn encode(&self) -> Value {
        // NaN and infinities have no JSON form.
        serde_json::Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl FieldValue for DateTime<Utc> {
    fn decode(raw: &Value) -> Result<Self, String> {
        let millis = match raw {
            Value::String(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Ok(dt.with_timezone(&Utc));
                }
                s.parse::<i64>()
                    .map_err(|_| "expected an RFC 3339 timestamp or epoch milliseconds".to_string())?
            }
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| "expected epoch milliseconds".to_string())?,
            _ => return Err("expected a timestamp".to_string()),
        };
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| "timestamp out of range".to_string())
    }

    fn encode(&self) -> Value {
        Value::String(self.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn decode(raw: &Value) -> Result<Self, String> {
        let items = raw.as_array().ok_or_else(|| "expected an array".to_string())?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::decode(item).map_err(|reason| format!("item {i}: {reason}")))
            .collect()
    }

    fn encode(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::encode).collect())
    }
}
