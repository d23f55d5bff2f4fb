//! Loosely-typed scalar values stored in configuration leaves.
//!
//! Leaves hold values coming from heterogeneous sources (declared defaults,
//! the persisted JSON document, arbitrary in-process callers), so the value
//! is a tagged scalar union rather than a fixed type. Coercion only happens
//! at the accessor boundary: a read for the wrong type yields the zero value
//! of the requested type, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scalar configuration value.
///
/// `Float` exists because JSON numbers with a fractional part deserialize as
/// floats; integer reads over a float truncate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    /// String view; non-string values read as `""`.
    pub fn as_str(&self) -> &str {
        match self {
            ConfigValue::Str(s) => s,
            _ => "",
        }
    }

    /// Owned string; non-string values read as `""`.
    pub fn as_string(&self) -> String {
        self.as_str().to_string()
    }

    /// Integer view; floats truncate, everything else reads as `0`.
    pub fn as_int(&self) -> i64 {
        match self {
            ConfigValue::Int(n) => *n,
            ConfigValue::Float(f) => *f as i64,
            _ => 0,
        }
    }

    /// Boolean view; non-boolean values read as `false`.
    pub fn as_bool(&self) -> bool {
        match self {
            ConfigValue::Bool(b) => *b,
            _ => false,
        }
    }

    /// Convert into a plain JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Int(n) => Value::Number((*n).into()),
            ConfigValue::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(Value::Null, Value::Number),
            ConfigValue::Str(s) => Value::String(s.clone()),
        }
    }

    /// Extract a scalar from a JSON value.
    ///
    /// Arrays, objects and nulls are not representable as leaf values and
    /// yield `None`.
    pub fn from_json(value: &Value) -> Option<ConfigValue> {
        match value {
            Value::Bool(b) => Some(ConfigValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ConfigValue::Int(i))
                } else {
                    n.as_f64().map(ConfigValue::Float)
                }
            }
            Value::String(s) => Some(ConfigValue::Str(s.clone())),
            Value::Array(_) | Value::Object(_) | Value::Null => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(i64::from(v))
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessor_coercions() {
        assert_eq!(ConfigValue::Str("hello".into()).as_str(), "hello");
        assert_eq!(ConfigValue::Int(8334).as_int(), 8334);
        assert_eq!(ConfigValue::Float(15.9).as_int(), 15);
        assert!(ConfigValue::Bool(true).as_bool());

        // Wrong-type reads fall back to zero values, never error
        assert_eq!(ConfigValue::Int(42).as_str(), "");
        assert_eq!(ConfigValue::Str("42".into()).as_int(), 0);
        assert!(!ConfigValue::Str("true".into()).as_bool());
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            ConfigValue::from_json(&json!(8334)),
            Some(ConfigValue::Int(8334))
        );
        assert_eq!(
            ConfigValue::from_json(&json!(1.5)),
            Some(ConfigValue::Float(1.5))
        );
        assert_eq!(
            ConfigValue::from_json(&json!("grid")),
            Some(ConfigValue::Str("grid".into()))
        );
        assert_eq!(
            ConfigValue::from_json(&json!(false)),
            Some(ConfigValue::Bool(false))
        );
    }

    #[test]
    fn test_from_json_rejects_non_scalars() {
        assert_eq!(ConfigValue::from_json(&json!(null)), None);
        assert_eq!(ConfigValue::from_json(&json!([1, 2])), None);
        assert_eq!(ConfigValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_untagged_roundtrip() {
        let v: ConfigValue = serde_json::from_str("8334").unwrap();
        assert_eq!(v, ConfigValue::Int(8334));
        assert_eq!(serde_json::to_string(&v).unwrap(), "8334");

        let v: ConfigValue = serde_json::from_str("\"emacs\"").unwrap();
        assert_eq!(v, ConfigValue::Str("emacs".into()));
    }
}
