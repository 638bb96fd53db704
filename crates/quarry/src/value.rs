//! Dialect-neutral SQL values.
//!
//! Bindings cross the prepared-statement boundary as [`Value`]s; the driver
//! adapter converts them to whatever its wire protocol expects. Values also
//! serve as model attributes and as column defaults in blueprints.

use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// A SQL value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Str(String),
    /// Binary blob value.
    Bytes(Vec<u8>),
    /// JSON document (json/jsonb columns).
    Json(serde_json::Value),
    /// Timestamp without timezone.
    DateTime(chrono::NaiveDateTime),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as `&str`, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read as `i64`, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Read as `bool`, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Require a text value, with a decode error naming `column` otherwise.
    pub fn expect_str(&self, column: &str) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| Error::decode(column, format!("expected text, got {self:?}")))
    }

    /// Require an integer value, with a decode error naming `column` otherwise.
    pub fn expect_int(&self, column: &str) -> Result<i64> {
        self.as_int()
            .ok_or_else(|| Error::decode(column, format!("expected integer, got {self:?}")))
    }
}

// Values key eager-load dictionaries, so they must be usable in a HashMap.
// Floats are compared and hashed by bit pattern.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Str(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::Json(j) => j.to_string().hash(state),
            Self::DateTime(t) => t.hash(state),
        }
    }
}

/// Conversion into a [`Value`].
pub trait IntoValue {
    /// Converts the value into a [`Value`].
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for i16 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        Value::Json(self)
    }
}

impl IntoValue for chrono::NaiveDateTime {
    fn into_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn values_key_a_map() {
        let mut map: HashMap<Value, &str> = HashMap::new();
        map.insert(Value::Int(1), "one");
        map.insert(Value::Str("a".into()), "a");
        assert_eq!(map.get(&Value::Int(1)), Some(&"one"));
        assert_eq!(map.get(&1_i64.into_value()), Some(&"one"));
        assert_eq!(map.get(&Value::Int(2)), None);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(None::<i64>.into_value(), Value::Null);
        assert_eq!(Some(5_i64).into_value(), Value::Int(5));
    }
}
