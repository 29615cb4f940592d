//! Loose conversions from wire values.
//!
//! Admin forms submit booleans as `"true"`/`"1"` and send `null` for
//! cleared text inputs. These helpers turn such values into their strict
//! counterparts, or report that the value cannot be interpreted.

use serde_json::Value;

/// Interpret a loosely typed boolean.
///
/// `true`, `1`, `"true"`, `"1"`, `"yes"`, `"on"` are true; `false`, `0`,
/// `null`, `""`, `"false"`, `"0"`, `"no"`, `"off"` are false.
pub fn loose_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => Some(false),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Interpret a loosely typed string. `null` becomes `""`, scalars are
/// rendered; arrays and objects are rejected.
pub fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Like [`loose_string`], but structured values are serialized to JSON
/// text instead of being rejected. Used for free-form `content` bodies
/// that may carry key-value data.
pub fn loose_text_or_json(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => loose_string(other).unwrap_or_default(),
    }
}

/// Interpret a loosely typed integer: JSON integers, integral floats, and
/// numeric strings.
pub fn loose_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_loose_bool_accepts_wire_forms() {
        assert_eq!(loose_bool(&json!(true)), Some(true));
        assert_eq!(loose_bool(&json!("true")), Some(true));
        assert_eq!(loose_bool(&json!(1)), Some(true));
        assert_eq!(loose_bool(&json!("1")), Some(true));
        assert_eq!(loose_bool(&json!("false")), Some(false));
        assert_eq!(loose_bool(&json!(0)), Some(false));
        assert_eq!(loose_bool(&Value::Null), Some(false));
    }

    #[test]
    fn test_loose_bool_rejects_garbage() {
        assert_eq!(loose_bool(&json!("maybe")), None);
        assert_eq!(loose_bool(&json!([true])), None);
    }

    #[test]
    fn test_loose_string_maps_null_to_empty() {
        assert_eq!(loose_string(&Value::Null), Some(String::new()));
        assert_eq!(loose_string(&json!(42)), Some("42".to_string()));
        assert_eq!(loose_string(&json!({"a": 1})), None);
    }

    #[test]
    fn test_structured_content_is_serialized() {
        let text = loose_text_or_json(&json!({"Material": "Rubber"}));
        assert_eq!(text, r#"{"Material":"Rubber"}"#);
        assert_eq!(loose_text_or_json(&Value::Null), "");
    }

    #[test]
    fn test_loose_numbers() {
        assert_eq!(loose_i64(&json!(3)), Some(3));
        assert_eq!(loose_i64(&json!(3.0)), Some(3));
        assert_eq!(loose_i64(&json!("7")), Some(7));
        assert_eq!(loose_i64(&json!(2.5)), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
