pub mod batch;
pub mod single;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use job_import::{EntityKind, ExtractionRequest};

/// Extraction options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// What the pages describe (job or session)
    #[arg(long, default_value = "job")]
    pub kind: EntityKind,

    /// Language of the page
    #[arg(long, default_value = "en")]
    pub source_lang: String,

    /// Language of the extracted record
    #[arg(long, default_value = "en")]
    pub target_lang: String,

    /// Named extraction template (defaults to the one for --kind)
    #[arg(long, conflicts_with = "template_file")]
    pub template: Option<String>,

    /// Read an inline template body from this file
    #[arg(long)]
    pub template_file: Option<PathBuf>,

    /// Let the service answer from its cache
    #[arg(long)]
    pub use_cache: bool,

    /// Restrict extraction to part of the page (CSS or XPath)
    #[arg(long)]
    pub selector: Option<String>,
}

impl RequestArgs {
    pub async fn build(&self, url: &str) -> Result<ExtractionRequest> {
        let template = self
            .template
            .clone()
            .unwrap_or_else(|| self.kind.default_template().to_string());

        let mut builder = ExtractionRequest::builder(url)
            .source_language(&self.source_lang)
            .target_language(&self.target_lang)
            .template(template)
            .use_cache(self.use_cache);

        if let Some(path) = &self.template_file {
            let body = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read template file {}", path.display()))?;
            builder = builder.template_content(body);
        }

        if let Some(selector) = &self.selector {
            builder = builder.container_selector(selector);
        }

        Ok(builder.build())
    }
}
