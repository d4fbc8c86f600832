//! Typed errors for the import pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can map
//! each failure class to an operator-facing message.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while importing a page.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Request rejected locally, never sent over the wire
    #[error("invalid request: {message}")]
    ClientValidation { message: String },

    /// Extraction service answered with a non-2xx status
    #[error("extraction service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No response reached us (DNS, connect, reset)
    #[error("network error: {0}")]
    Network(String),

    /// Request sent, no response before the deadline
    #[error("extraction request timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    /// 2xx envelope with `status: error`
    #[error("extraction failed: {message}")]
    Service {
        kind: Option<String>,
        message: String,
    },

    /// 2xx body that is not a readable envelope
    #[error("unreadable extraction response: {0}")]
    InvalidResponse(String),

    /// Structured record failed normalization
    #[error("record validation failed: {0}")]
    RecordValidation(#[from] ValidationErrors),

    /// Listing page produced no importable links
    #[error("no links found on {url}")]
    NoLinks { url: String },

    /// Persistence sink rejected the submission
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Coarse classification of an [`ImportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientValidation,
    Http,
    Network,
    Timeout,
    Service,
    RecordValidation,
    Discovery,
    Persistence,
}

impl ImportError {
    pub(crate) fn client(message: impl Into<String>) -> Self {
        Self::ClientValidation {
            message: message.into(),
        }
    }

    /// Classification used by callers to pick a user-facing message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClientValidation { .. } => ErrorKind::ClientValidation,
            Self::Http { .. } => ErrorKind::Http,
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Service { .. } | Self::InvalidResponse(_) => ErrorKind::Service,
            Self::RecordValidation(_) => ErrorKind::RecordValidation,
            Self::NoLinks { .. } => ErrorKind::Discovery,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// HTTP-equivalent status, where one applies.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ClientValidation { .. } => Some(400),
            Self::Http { status, .. } => Some(*status),
            Self::Timeout { .. } => Some(504),
            _ => None,
        }
    }
}

/// One problem found in a structured record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub problem: String,
}

impl FieldError {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            problem: "is missing or blank".to_string(),
        }
    }

    pub fn unresolved(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            problem: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// Every problem found in one record, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the offending fields.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
