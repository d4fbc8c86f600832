//! Untrusted output of an extraction call.

use serde_json::{Map, Value};

/// What the extraction service believes it found on a page.
///
/// Nothing about its shape is guaranteed. Field access is crate-private and
/// only the normalizer reads it; everyone else can preview it or hand it on.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord(Value);

impl StructuredRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Pretty-printed JSON for operator review.
    pub fn preview(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    /// Number of top-level entries (keys or list items).
    pub fn len(&self) -> usize {
        match &self.0 {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn value(&self) -> &Value {
        &self.0
    }

    pub(crate) fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// First present value under any of `keys`. Nulls and blank strings
    /// count as absent.
    ///
    /// A dotted key (`contact.phone`) walks into nested objects.
    pub(crate) fn field(&self, keys: &[&str]) -> Option<&Value> {
        let map = self.as_object()?;
        keys.iter()
            .filter_map(|key| {
                let mut parts = key.split('.');
                let first = map.get(parts.next()?)?;
                parts.try_fold(first, |value, part| value.as_object()?.get(part))
            })
            .find(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
    }
}
