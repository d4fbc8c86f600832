use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use job_import::{BatchConfig, ClientConfig};

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub extraction_endpoint: String,
    pub extraction_timeout: Duration,
    pub import_delay: Duration,
    pub store_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            extraction_endpoint: lookup("EXTRACTION_ENDPOINT")
                .filter(|v| !v.trim().is_empty())
                .context("EXTRACTION_ENDPOINT must be set")?,
            extraction_timeout: Duration::from_secs(
                lookup("EXTRACTION_TIMEOUT_SECS")
                    .unwrap_or_else(|| "120".to_string())
                    .parse()
                    .context("EXTRACTION_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            import_delay: Duration::from_millis(
                lookup("IMPORT_DELAY_MS")
                    .unwrap_or_else(|| "1500".to_string())
                    .parse()
                    .context("IMPORT_DELAY_MS must be a whole number of milliseconds")?,
            ),
            store_path: lookup("IMPORT_STORE_PATH")
                .unwrap_or_else(|| "imports.json".to_string())
                .into(),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.extraction_endpoint.clone()).with_deadline(self.extraction_timeout)
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::default().with_delay(self.import_delay)
    }
}
