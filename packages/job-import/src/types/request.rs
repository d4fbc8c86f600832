//! Requests sent to the extraction service.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ImportError, Result};

/// Default template for single job pages.
pub const JOB_TEMPLATE: &str = "ExtractJobDataFromWebsite";

/// Default template for single session/event pages.
pub const SESSION_TEMPLATE: &str = "ExtractSessionDataFromWebsite";

/// Default template for listing pages (link discovery).
pub const LISTING_TEMPLATE: &str = "ExtractLinksFromWebsite";

pub const DEFAULT_LANGUAGE: &str = "en";

/// Which template the service should apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateRef {
    /// Identifier of a template known to the service
    Named(String),
    /// Template body supplied by the caller
    Inline(String),
}

/// One extraction call. Immutable once built.
///
/// The URL is kept as given; [`validate`](Self::validate) is run by the
/// client before anything goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    url: String,
    source_language: String,
    target_language: String,
    template: TemplateRef,
    use_cache: bool,
    container_selector: Option<String>,
}

impl ExtractionRequest {
    /// Start building a request for `url` with the job template.
    pub fn builder(url: impl Into<String>) -> ExtractionRequestBuilder {
        ExtractionRequestBuilder {
            url: url.into(),
            source_language: DEFAULT_LANGUAGE.to_string(),
            target_language: DEFAULT_LANGUAGE.to_string(),
            template: None,
            template_content: None,
            use_cache: false,
            container_selector: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn template(&self) -> &TemplateRef {
        &self.template
    }

    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    pub fn container_selector(&self) -> Option<&str> {
        self.container_selector.as_deref()
    }

    /// Same settings, different page. Used to derive per-item requests
    /// from a batch template request.
    pub fn for_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }

    /// Drops the container selector. Selectors describe one page's layout
    /// and do not carry over to the pages it links to.
    pub fn without_container_selector(&self) -> Self {
        Self {
            container_selector: None,
            ..self.clone()
        }
    }

    /// Same settings, different template.
    pub fn with_template(&self, template: TemplateRef) -> Self {
        Self {
            template,
            ..self.clone()
        }
    }

    /// Check everything that must hold before a network call.
    /// Returns the parsed URL.
    pub fn validate(&self) -> Result<Url> {
        let url = parse_absolute_url(&self.url)?;

        if self.source_language.trim().is_empty() {
            return Err(ImportError::client("source_language is required"));
        }
        if self.target_language.trim().is_empty() {
            return Err(ImportError::client("target_language is required"));
        }
        if let TemplateRef::Named(name) = &self.template {
            if name.trim().is_empty() {
                return Err(ImportError::client("template is required"));
            }
        }

        Ok(url)
    }

    /// Form fields in wire order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("url", self.url.trim().to_string()),
            ("source_language", self.source_language.clone()),
            ("target_language", self.target_language.clone()),
            ("use_cache", self.use_cache.to_string()),
        ];

        match &self.template {
            TemplateRef::Named(name) => fields.push(("template", name.clone())),
            TemplateRef::Inline(body) => fields.push(("template_content", body.clone())),
        }

        if let Some(selector) = &self.container_selector {
            fields.push(("container_selector", selector.clone()));
        }

        fields
    }
}

/// Builder for [`ExtractionRequest`].
#[derive(Debug, Clone)]
pub struct ExtractionRequestBuilder {
    url: String,
    source_language: String,
    target_language: String,
    template: Option<String>,
    template_content: Option<String>,
    use_cache: bool,
    container_selector: Option<String>,
}

impl ExtractionRequestBuilder {
    pub fn source_language(mut self, code: impl Into<String>) -> Self {
        self.source_language = code.into();
        self
    }

    pub fn target_language(mut self, code: impl Into<String>) -> Self {
        self.target_language = code.into();
        self
    }

    /// Use a named template.
    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.template = Some(name.into());
        self
    }

    /// Use an inline template body. Takes precedence over [`template`](Self::template).
    pub fn template_content(mut self, body: impl Into<String>) -> Self {
        self.template_content = Some(body.into());
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn container_selector(mut self, selector: impl Into<String>) -> Self {
        self.container_selector = Some(selector.into());
        self
    }

    pub fn build(self) -> ExtractionRequest {
        let template = match (self.template_content, self.template) {
            (Some(body), _) if !body.trim().is_empty() => TemplateRef::Inline(body),
            (_, Some(name)) if !name.trim().is_empty() => TemplateRef::Named(name.trim().to_string()),
            _ => TemplateRef::Named(JOB_TEMPLATE.to_string()),
        };

        let container_selector = self
            .container_selector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        ExtractionRequest {
            url: self.url.trim().to_string(),
            source_language: self.source_language.trim().to_string(),
            target_language: self.target_language.trim().to_string(),
            template,
            use_cache: self.use_cache,
            container_selector,
        }
    }
}

/// Parse `raw` as an absolute http(s) URL.
pub fn parse_absolute_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ImportError::client("url is required"));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ImportError::client(format!("'{}' is not a valid URL: {}", trimmed, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ImportError::client(format!(
                "unsupported URL scheme '{}' in '{}'",
                other, trimmed
            )))
        }
    }

    if url.host_str().is_none() {
        return Err(ImportError::client(format!("'{}' has no host", trimmed)));
    }

    Ok(url)
}
