//! Testing utilities including mock implementations.
//!
//! These let applications exercise the import pipeline without a running
//! extraction service. Every mock records its calls for assertions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ImportError, Result};
use crate::traits::extractor::Extractor;
use crate::traits::sink::{PersistenceSink, SubmitReport};
use crate::traits::transport::{Transport, TransportError, TransportResponse};
use crate::types::request::TemplateRef;
use crate::types::result::Diagnostics;
use crate::types::{ExtractionRequest, ExtractionResult, NormalizedEntity, StructuredRecord};

// =============================================================================
// Transport
// =============================================================================

/// One recorded POST.
#[derive(Debug, Clone)]
pub struct TransportCall {
    pub endpoint: String,
    pub fields: Vec<(String, String)>,
}

impl TransportCall {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted [`Transport`]. Responses are looked up by the `url` form field,
/// falling back to a default.
#[derive(Default, Clone)]
pub struct MockTransport {
    responses: Arc<RwLock<HashMap<String, std::result::Result<TransportResponse, TransportError>>>>,
    default: Option<std::result::Result<TransportResponse, TransportError>>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<TransportCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response for any URL without a specific one.
    pub fn with_default(mut self, response: TransportResponse) -> Self {
        self.default = Some(Ok(response));
        self
    }

    /// Fail every unscripted call.
    pub fn with_error(mut self, error: TransportError) -> Self {
        self.default = Some(Err(error));
        self
    }

    pub fn with_response(self, url: impl Into<String>, response: TransportResponse) -> Self {
        self.responses.write().unwrap().insert(url.into(), Ok(response));
        self
    }

    /// Sleep before answering (for deadline tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(&'static str, String)],
        _deadline: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let call = TransportCall {
            endpoint: endpoint.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        let url = call.field("url").unwrap_or_default().to_string();
        self.calls.write().unwrap().push(call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.responses.read().unwrap().get(&url).cloned();
        scripted
            .or_else(|| self.default.clone())
            .unwrap_or_else(|| Ok(TransportResponse::new(404, "no scripted response")))
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Failure a [`MockExtractor`] can be scripted to raise.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Http(u16, String),
    Network(String),
    Timeout,
    Service(String),
}

impl MockFailure {
    fn to_error(&self) -> ImportError {
        match self {
            Self::Http(status, message) => ImportError::Http {
                status: *status,
                message: message.clone(),
            },
            Self::Network(message) => ImportError::Network(message.clone()),
            Self::Timeout => ImportError::Timeout {
                after: Duration::from_secs(120),
            },
            Self::Service(message) => ImportError::Service {
                kind: None,
                message: message.clone(),
            },
        }
    }
}

/// Record of a call made to the mock extractor.
#[derive(Debug, Clone)]
pub struct MockExtractorCall {
    pub url: String,
    pub template: TemplateRef,
}

/// Scripted [`Extractor`] keyed by page URL.
#[derive(Default, Clone)]
pub struct MockExtractor {
    pages: Arc<RwLock<HashMap<String, std::result::Result<Value, MockFailure>>>>,
    calls: Arc<RwLock<Vec<MockExtractorCall>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page at `url` yields `structured_data`.
    pub fn with_page(self, url: impl Into<String>, structured_data: Value) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), Ok(structured_data));
        self
    }

    /// Page at `url` fails.
    pub fn with_failure(self, url: impl Into<String>, failure: MockFailure) -> Self {
        self.pages.write().unwrap().insert(url.into(), Err(failure));
        self
    }

    pub fn calls(&self) -> Vec<MockExtractorCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn called_urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        request.validate()?;

        self.calls.write().unwrap().push(MockExtractorCall {
            url: request.url().to_string(),
            template: request.template().clone(),
        });

        let scripted = self.pages.read().unwrap().get(request.url()).cloned();
        match scripted {
            Some(Ok(value)) => Ok(ExtractionResult::Success {
                diagnostics: Diagnostics::default(),
                record: StructuredRecord::new(value),
            }),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Err(ImportError::Http {
                status: 404,
                message: format!("no scripted page for {}", request.url()),
            }),
        }
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Sink that rejects every submission.
#[derive(Default)]
pub struct FailingSink {
    attempts: RwLock<usize>,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.read().unwrap()
    }
}

#[async_trait]
impl PersistenceSink for FailingSink {
    async fn submit(&self, _entities: Vec<NormalizedEntity>) -> Result<SubmitReport> {
        *self.attempts.write().unwrap() += 1;
        Err(ImportError::Persistence("store unavailable".to_string()))
    }

    async fn count(&self) -> Result<usize> {
        Ok(0)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A structured record with every required job field.
pub fn job_record(title: &str, location: &str) -> Value {
    json!({
        "title": title,
        "company": "Hotel Adler",
        "location": location,
        "contact_phone": "+39 0473 123456",
        "contact_email": "jobs@adler.example.com",
        "description": "Join our kitchen team for the summer season.",
        "start_date": "2024-05-01",
        "employment_type": "Seasonal"
    })
}

/// A structured record with every required session field.
pub fn session_record(title: &str, location: &str) -> Value {
    json!({
        "title": title,
        "organizer": "Employment Office",
        "location": location,
        "contact_phone": "+39 0471 418600",
        "contact_email": "events@example.com",
        "description": "Hands-on workshop on writing a strong curriculum and preparing for an interview.",
        "start_date": "2024-06-12",
        "format": "Workshop"
    })
}
