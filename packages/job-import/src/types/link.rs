//! Links discovered on a listing page.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-item import status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Pending,
    Importing,
    Success,
    Error,
}

impl LinkStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Importing => "importing",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// One link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    pub name: String,
    pub url: String,
    /// Context scraped next to the link, e.g. a category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default)]
    pub status: LinkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LinkDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            hint: None,
            status: LinkStatus::Pending,
            error: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub(crate) fn with_status(&self, status: LinkStatus, error: Option<String>) -> Self {
        Self {
            status,
            error,
            ..self.clone()
        }
    }
}
