//! Lenient field deserializers for form metadata.
//!
//! Form fields arrive from CSV rows and JSON files produced by different
//! tools, so the same field may be a string, a number, or empty.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string or number; empty strings and null become `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value_to_string(&value)))
}

/// Accept an integer or a numeric string; anything else becomes `None`.
pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value_to_int(&value)))
}

/// Render a scalar JSON value as a trimmed, non-empty string.
pub fn value_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Read a scalar JSON value as an integer.
pub fn value_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_conversions() {
        assert_eq!(value_to_string(&json!(" 001 ")), Some("001".to_string()));
        assert_eq!(value_to_string(&json!(3)), Some("3".to_string()));
        assert_eq!(value_to_string(&json!("")), None);
        assert_eq!(value_to_string(&json!(null)), None);
        assert_eq!(value_to_int(&json!("42")), Some(42));
        assert_eq!(value_to_int(&json!(42)), Some(42));
        assert_eq!(value_to_int(&json!("x")), None);
    }
}
