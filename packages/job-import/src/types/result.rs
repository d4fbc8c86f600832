//! Responses from the extraction service.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ImportError, Result};
use crate::types::record::StructuredRecord;

/// Informational metadata about one extraction run. Never used for control flow.
///
/// Fields are read leniently: a value of an unexpected type is kept when it
/// has an obvious text form and dropped otherwise, never failing the parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Diagnostics {
    #[serde(default, deserialize_with = "lenient_text")]
    pub process_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub completed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub cache_hit: bool,
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1" | "hit"
        ),
        _ => false,
    })
}

impl Diagnostics {
    fn is_empty(&self) -> bool {
        self.process_id.is_none()
            && self.started_at.is_none()
            && self.completed_at.is_none()
            && !self.cache_hit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Success,
    Error,
}

/// Outcome of one extraction call.
#[derive(Debug, Clone)]
pub enum ExtractionResult {
    Success {
        diagnostics: Diagnostics,
        record: StructuredRecord,
    },
    Error {
        diagnostics: Diagnostics,
        /// Service-provided classification (`error.type`), if any
        kind: Option<String>,
        message: String,
    },
}

impl ExtractionResult {
    pub fn status(&self) -> ExtractionStatus {
        match self {
            Self::Success { .. } => ExtractionStatus::Success,
            Self::Error { .. } => ExtractionStatus::Error,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Self::Success { diagnostics, .. } | Self::Error { diagnostics, .. } => diagnostics,
        }
    }

    /// The record on success, or the service's error as [`ImportError::Service`].
    pub fn into_record(self) -> Result<StructuredRecord> {
        match self {
            Self::Success { record, .. } => Ok(record),
            Self::Error { kind, message, .. } => Err(ImportError::Service { kind, message }),
        }
    }
}

// Wire envelope

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    status: ExtractionStatus,
    #[serde(default)]
    error: Option<EnvelopeError>,
    #[serde(default)]
    data: Option<EnvelopeData>,
    #[serde(flatten)]
    diagnostics: Diagnostics,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    structured_data: Option<Value>,
    #[serde(flatten)]
    diagnostics: Diagnostics,
}

impl Envelope {
    pub(crate) fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| ImportError::InvalidResponse(e.to_string()))
    }

    /// Service message embedded in an error body.
    pub(crate) fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(|e| e.message.clone())
            .filter(|m| !m.trim().is_empty())
    }

    pub(crate) fn into_result(self) -> Result<ExtractionResult> {
        let (structured, nested) = match self.data {
            Some(data) => (data.structured_data, data.diagnostics),
            None => (None, Diagnostics::default()),
        };

        let diagnostics = if self.diagnostics.is_empty() {
            nested
        } else {
            self.diagnostics
        };

        match self.status {
            ExtractionStatus::Success => {
                let value = structured.filter(|v| !v.is_null()).ok_or_else(|| {
                    ImportError::InvalidResponse(
                        "success response without data.structured_data".to_string(),
                    )
                })?;
                Ok(ExtractionResult::Success {
                    diagnostics,
                    record: StructuredRecord::new(value),
                })
            }
            ExtractionStatus::Error => {
                let (kind, message) = match self.error {
                    Some(err) => (err.kind, err.message),
                    None => (None, None),
                };
                Ok(ExtractionResult::Error {
                    diagnostics,
                    kind,
                    message: message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| "extraction service reported an error".to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_envelope() {
        let body = r#"{
            "status": "success",
            "process_id": "p-1",
            "cache_hit": true,
            "data": {"structured_data": {"title": "Chef"}}
        }"#;

        let result = Envelope::parse(body).unwrap().into_result().unwrap();
        assert_eq!(result.status(), ExtractionStatus::Success);
        assert_eq!(result.diagnostics().process_id.as_deref(), Some("p-1"));
        assert!(result.diagnostics().cache_hit);
        assert!(result.into_record().is_ok());
    }

    #[test]
    fn test_diagnostics_nested_under_data() {
        let body = r#"{
            "status": "success",
            "data": {"process_id": "p-2", "started_at": "2024-03-01T10:00:00Z", "structured_data": []}
        }"#;

        let result = Envelope::parse(body).unwrap().into_result().unwrap();
        assert_eq!(result.diagnostics().process_id.as_deref(), Some("p-2"));
        assert_eq!(
            result.diagnostics().started_at.as_deref(),
            Some("2024-03-01T10:00:00Z")
        );
    }

    #[test]
    fn test_odd_diagnostic_types_do_not_fail_the_parse() {
        let body = r#"{
            "status": "success",
            "process_id": 12345,
            "started_at": {"unix": 1709287200},
            "cache_hit": "yes",
            "data": {"structured_data": {"title": "Cook"}}
        }"#;

        let result = Envelope::parse(body).unwrap().into_result().unwrap();
        assert_eq!(result.diagnostics().process_id.as_deref(), Some("12345"));
        assert_eq!(result.diagnostics().started_at, None);
        assert!(result.diagnostics().cache_hit);
        assert!(result.into_record().is_ok());
    }

    #[test]
    fn test_error_envelope_becomes_service_error() {
        let body = r#"{"status": "error", "error": {"message": "page blocked", "type": "FetchError"}}"#;

        let result = Envelope::parse(body).unwrap().into_result().unwrap();
        assert_eq!(result.status(), ExtractionStatus::Error);

        match result.into_record().unwrap_err() {
            ImportError::Service { kind, message } => {
                assert_eq!(kind.as_deref(), Some("FetchError"));
                assert_eq!(message, "page blocked");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_success_without_data_is_invalid() {
        let err = Envelope::parse(r#"{"status": "success"}"#)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidResponse(_)));
    }

    #[test]
    fn test_garbage_body_is_invalid() {
        assert!(matches!(
            Envelope::parse("<html>oops</html>"),
            Err(ImportError::InvalidResponse(_))
        ));
    }
}
