//! reqwest-backed [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ImportError, Result};
use crate::traits::transport::{Transport, TransportError, TransportResponse};

const USER_AGENT: &str = concat!("job-import/", env!("CARGO_PKG_VERSION"));

/// Production transport. One request per call, no retries.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ImportError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing client (shared connection pool).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(&'static str, String)],
        deadline: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .timeout(deadline)
            .form(fields)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(TransportResponse { status, body })
    }
}

/// A connect that fails or times out never sent the request, so it is a
/// network failure. Only a sent request that outlives its deadline is a timeout.
fn classify(error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::Network(error.to_string())
    } else if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(error.to_string())
    }
}
