//! Raw HTTP seam under the extraction client.

use std::time::Duration;

use async_trait::async_trait;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why no response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request went out, nothing came back in time
    Timeout,
    /// DNS, connect or I/O failure
    Network(String),
}

/// Sends one form-encoded POST.
///
/// Implementations must not retry; the client above owns the policy.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(&'static str, String)],
        deadline: Duration,
    ) -> Result<TransportResponse, TransportError>;
}
