//! Type inference on write and type restoration on read
//!
//! Values are persisted as text. The record's `type` column remembers what
//! the caller wrote so reads hand back the same JSON shape.

use crate::contract::SettingType;
use serde_json::{Number, Value};

use super::path::empty_structure;

impl SettingType {
    /// Infer the semantic type of a value about to be written.
    ///
    /// A write through a nested path always stores a structure, so it infers
    /// as `Array` whatever the leaf is. `Null` never reaches storage (it means
    /// delete) and falls back to `String`.
    pub fn infer(value: &Value, nested: bool) -> Self {
        if nested {
            return SettingType::Array;
        }
        match value {
            Value::Bool(_) => SettingType::Boolean,
            Value::Number(n) if n.is_f64() => SettingType::Float,
            Value::Number(_) => SettingType::Integer,
            Value::Object(_) | Value::Array(_) => SettingType::Array,
            Value::String(_) | Value::Null => SettingType::String,
        }
    }
}

/// Encode a value for the text `value` column.
///
/// Structures become JSON text; scalars keep their plain textual form.
pub fn encode_on_write(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) | Value::Array(_) => Some(value.to_string()),
    }
}

/// Restore a stored raw value according to its recorded type name.
///
/// Unrecognised type names hand the raw text back unchanged.
pub fn coerce_on_read(raw: Option<&str>, type_name: &str) -> Value {
    match type_name.parse::<SettingType>() {
        Ok(ty) => coerce(raw, ty),
        Err(_) => raw.map_or(Value::Null, |r| Value::String(r.to_string())),
    }
}

/// Restore a stored raw value as `ty`
pub fn coerce(raw: Option<&str>, ty: SettingType) -> Value {
    match ty {
        SettingType::Array => raw
            .and_then(|r| serde_json::from_str::<Value>(r).ok())
            .filter(|v| v.is_object() || v.is_array())
            .unwrap_or_else(empty_structure),
        SettingType::String => Value::String(raw.unwrap_or_default().to_string()),
        SettingType::Integer => Value::Number(to_integer(raw.unwrap_or_default())),
        SettingType::Float => Number::from_f64(to_float(raw.unwrap_or_default()))
            .map_or(Value::Null, Value::Number),
        SettingType::Boolean => Value::Bool(to_bool(raw.unwrap_or_default())),
    }
}

fn to_integer(raw: &str) -> Number {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return i.into();
    }
    if let Ok(u) = raw.parse::<u64>() {
        return u.into();
    }
    // Truncates like a numeric cast; unparsable text reads as 0
    let truncated = raw.parse::<f64>().map_or(0, |f| f as i64);
    truncated.into()
}

fn to_float(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}

fn to_bool(raw: &str) -> bool {
    !matches!(raw.trim(), "" | "0" | "false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_scalars() {
        assert_eq!(SettingType::infer(&json!("x"), false), SettingType::String);
        assert_eq!(SettingType::infer(&json!(3), false), SettingType::Integer);
        assert_eq!(SettingType::infer(&json!(-3), false), SettingType::Integer);
        assert_eq!(SettingType::infer(&json!(1.5), false), SettingType::Float);
        assert_eq!(SettingType::infer(&json!(true), false), SettingType::Boolean);
    }

    #[test]
    fn test_infer_structures_and_nested_writes() {
        assert_eq!(SettingType::infer(&json!({"a": 1}), false), SettingType::Array);
        assert_eq!(SettingType::infer(&json!([1, 2]), false), SettingType::Array);
        assert_eq!(SettingType::infer(&json!("gold"), true), SettingType::Array);
        assert_eq!(SettingType::infer(&json!(7), true), SettingType::Array);
    }

    #[test]
    fn test_encode_on_write() {
        assert_eq!(encode_on_write(&json!("hello")), Some("hello".to_string()));
        assert_eq!(encode_on_write(&json!(3)), Some("3".to_string()));
        assert_eq!(encode_on_write(&json!(2.5)), Some("2.5".to_string()));
        assert_eq!(encode_on_write(&json!(false)), Some("false".to_string()));
        assert_eq!(encode_on_write(&json!({"a": [1]})), Some(r#"{"a":[1]}"#.to_string()));
        assert_eq!(encode_on_write(&Value::Null), None);
    }

    #[test]
    fn test_scalar_round_trip() {
        for value in [json!("text"), json!(42), json!(-1), json!(0.25), json!(1.0), json!(true), json!(false)] {
            let ty = SettingType::infer(&value, false);
            let raw = encode_on_write(&value);
            assert_eq!(coerce(raw.as_deref(), ty), value, "round trip of {value}");
        }
    }

    #[test]
    fn test_structure_round_trip() {
        let value = json!({"tier": "gold", "limits": {"seats": 5, "ratio": 0.5}, "tags": ["a", "b"]});
        let raw = encode_on_write(&value);
        assert_eq!(coerce_on_read(raw.as_deref(), "array"), value);
    }

    #[test]
    fn test_array_absent_or_garbage_is_empty_structure() {
        assert_eq!(coerce(None, SettingType::Array), json!({}));
        assert_eq!(coerce(Some("not json"), SettingType::Array), json!({}));
        assert_eq!(coerce(Some("12"), SettingType::Array), json!({}));
    }

    #[test]
    fn test_lenient_scalar_coercion() {
        assert_eq!(coerce(Some(" 12 "), SettingType::Integer), json!(12));
        assert_eq!(coerce(Some("3.9"), SettingType::Integer), json!(3));
        assert_eq!(coerce(Some("abc"), SettingType::Integer), json!(0));
        assert_eq!(coerce(Some("x"), SettingType::Float), json!(0.0));
        assert_eq!(coerce(Some("1"), SettingType::Boolean), json!(true));
        assert_eq!(coerce(Some("0"), SettingType::Boolean), json!(false));
        assert_eq!(coerce(None, SettingType::Boolean), json!(false));
        assert_eq!(coerce(None, SettingType::String), json!(""));
    }

    #[test]
    fn test_unknown_type_passes_raw_through() {
        assert_eq!(coerce_on_read(Some("raw"), "decimal"), json!("raw"));
        assert_eq!(coerce_on_read(None, "decimal"), Value::Null);
    }
}
