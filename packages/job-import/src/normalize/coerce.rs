//! Lenient coercions for loosely-typed record values.

use serde_json::Value;

/// Tokens read as `true` (case-insensitive). Anything else is `false`.
const TRUTHY: &[&str] = &[
    "true", "yes", "1", "y", "on", // en
    "sì", "si", "vero", // it
    "ja", "wahr", // de
];

/// Trimmed, non-empty text. Numbers are rendered; lists of strings are
/// joined line by line.
pub(crate) fn text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(text)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// A native list or a comma-separated string. Items are trimmed and empty
/// items dropped; an empty result is `None`.
pub(crate) fn list(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };

    (!items.is_empty()).then_some(items)
}

/// A native boolean, a number (non-zero is `true`), or a string checked
/// against the truthy tokens. Blank strings are absent.
pub(crate) fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => {
            let token = s.trim().to_lowercase();
            if token.is_empty() {
                None
            } else {
                Some(TRUTHY.contains(&token.as_str()))
            }
        }
        _ => None,
    }
}

/// A native number or a parseable numeric string. Unparseable input is
/// absent, never zero.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            let normalized = if compact.contains(',') && !compact.contains('.') {
                compact.replace(',', ".")
            } else {
                compact
            };
            normalized.parse::<f64>().ok()
        }
        _ => None,
    };

    parsed.filter(|n| n.is_finite())
}
