// Value semantics shared by the built-in checks

use serde_json::Value;

/// Emptiness in the loose, form-input sense: `null`, `false`, numeric
/// zero, the empty string, `"0"`, and empty containers are all empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Text form of a scalar. `null` and containers have none; checks that
/// need text treat a missing text form exactly like an absent value.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric reading of a value: numbers as-is, numeric strings parsed,
/// booleans as 1/0. Everything else has no numeric reading.
pub fn numeric_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Loose equality: structural equality, numeric cross-comparison when
/// both sides read as numbers, or equal text forms. `null` equals only
/// `null`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    if let (Some(x), Some(y)) = (numeric_of(a), numeric_of(b)) {
        return x == y;
    }
    match (text_of(a), text_of(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Unicode-aware length: scalar values are counted in chars, not bytes.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
