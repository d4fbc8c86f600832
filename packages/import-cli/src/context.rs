//! Application context with shared state and utilities

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use job_import::{
    ErrorKind, ExtractionClient, ImportError, JsonFileSink, ReqwestTransport,
};

use crate::config::Config;

/// Application context passed to all commands
pub struct AppContext {
    pub config: Config,
    /// Answer every prompt with its default
    pub assume_yes: bool,
}

impl AppContext {
    pub fn new(config: Config, assume_yes: bool) -> Self {
        Self { config, assume_yes }
    }

    pub fn extraction_client(&self) -> Result<ExtractionClient<ReqwestTransport>> {
        Ok(ExtractionClient::new(
            ReqwestTransport::new()?,
            self.config.client_config(),
        )?)
    }

    pub fn sink(&self) -> JsonFileSink {
        JsonFileSink::new(self.config.store_path.clone())
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.assume_yes {
            return Ok(default);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    pub fn print_header(&self, msg: &str) {
        println!();
        println!("{}", style(msg).bold());
    }

    pub fn print_success(&self, msg: &str) {
        println!("{}", style(msg).green());
    }

    pub fn print_warning(&self, msg: &str) {
        println!("{}", style(msg).yellow());
    }

    pub fn print_error(&self, msg: &str) {
        eprintln!("{}", style(msg).red().bold());
    }

    pub fn print_info(&self, msg: &str) {
        println!("{}", style(msg).cyan());
    }
}

/// Operator-facing wording for an import failure.
pub fn describe(error: &ImportError) -> String {
    let hint = match error.kind() {
        ErrorKind::ClientValidation => "Check the URL and options",
        ErrorKind::Http => "The extraction service rejected the request",
        ErrorKind::Network => "Could not reach the extraction service",
        ErrorKind::Timeout => "The extraction service did not answer in time",
        ErrorKind::Service => "The extraction service could not read the page",
        ErrorKind::RecordValidation => "The extracted record is incomplete",
        ErrorKind::Discovery => "The listing page has no importable links",
        ErrorKind::Persistence => "Could not save the import",
    };
    format!("{}: {}", hint, error)
}
