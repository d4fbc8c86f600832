//! Extraction service client.
//!
//! One [`ExtractionRequest`] in, one outbound POST, one [`ExtractionResult`]
//! (or a classified [`ImportError`]) out. No retries and no caching here;
//! `use_cache` is only a hint forwarded to the service.
//!
//! # Example
//!
//! ```rust,ignore
//! use job_import::client::{ClientConfig, ExtractionClient, ReqwestTransport};
//! use job_import::types::ExtractionRequest;
//!
//! let client = ExtractionClient::new(
//!     ReqwestTransport::new()?,
//!     ClientConfig::new("https://extractor.example.com/api/extract"),
//! )?;
//!
//! let request = ExtractionRequest::builder("https://jobs.example.com/offer/42").build();
//! let record = client.extract(&request).await?.into_record()?;
//! println!("{}", record.preview());
//! ```

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ImportError, Result};
use crate::traits::extractor::Extractor;
use crate::traits::transport::{Transport, TransportError};
use crate::types::request::{parse_absolute_url, TemplateRef};
use crate::types::result::Envelope;
use crate::types::{ExtractionRequest, ExtractionResult};

pub use http::ReqwestTransport;

/// Longest raw error body quoted back to the operator.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Extraction endpoint settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Deadline attached to every call
    pub deadline: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            deadline: Duration::from_secs(120),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Client for the remote extraction service.
pub struct ExtractionClient<T: Transport> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> ExtractionClient<T> {
    /// Fails if the configured endpoint is not an absolute http(s) URL.
    pub fn new(transport: T, config: ClientConfig) -> Result<Self> {
        parse_absolute_url(&config.endpoint).map_err(|e| {
            ImportError::client(format!("invalid extraction endpoint: {}", e))
        })?;

        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: Transport> Extractor for ExtractionClient<T> {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        // Nothing invalid goes over the wire
        request.validate()?;

        let template = match request.template() {
            TemplateRef::Named(name) => name.as_str(),
            TemplateRef::Inline(_) => "<inline>",
        };
        debug!(
            url = %request.url(),
            template,
            use_cache = request.use_cache(),
            "Requesting extraction"
        );

        let fields = request.form_fields();
        let deadline = self.config.deadline;

        let call = self
            .transport
            .post_form(&self.config.endpoint, &fields, deadline);

        let response = match tokio::time::timeout(deadline, call).await {
            Err(_) | Ok(Err(TransportError::Timeout)) => {
                warn!(url = %request.url(), deadline_secs = deadline.as_secs(), "Extraction timed out");
                return Err(ImportError::Timeout { after: deadline });
            }
            Ok(Err(TransportError::Network(message))) => {
                warn!(url = %request.url(), error = %message, "Extraction service unreachable");
                return Err(ImportError::Network(message));
            }
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            let message = error_message(response.status, &response.body);
            warn!(
                url = %request.url(),
                status = response.status,
                error = %message,
                "Extraction service returned an error status"
            );
            return Err(ImportError::Http {
                status: response.status,
                message,
            });
        }

        let result = Envelope::parse(&response.body)?.into_result()?;

        let diagnostics = result.diagnostics();
        info!(
            url = %request.url(),
            status = ?result.status(),
            process_id = diagnostics.process_id.as_deref().unwrap_or("-"),
            cache_hit = diagnostics.cache_hit,
            "Extraction finished"
        );

        Ok(result)
    }
}

/// Best available message from a non-2xx body.
///
/// Prefers the service's `error.message`, then common `message`/`detail`
/// keys, then the raw text.
fn error_message(status: u16, body: &str) -> String {
    if let Some(message) = Envelope::parse(body).ok().and_then(|e| e.error_message()) {
        return message;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "detail", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.trim().is_empty() {
                    return message.trim().to_string();
                }
            }
        }
    }

    let text = body.trim();
    if text.is_empty() {
        return reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("no response body")
            .to_string();
    }

    text.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
