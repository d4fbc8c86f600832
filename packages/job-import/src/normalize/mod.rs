//! Field normalizer: the only gate from [`StructuredRecord`] to a domain entity.
//!
//! Validation never short-circuits. Every missing required field and every
//! unresolved classifier is collected, and construction fails once with the
//! complete list so an operator can fix a record in one pass.

mod classify;
mod coerce;
mod job;
mod links;
mod session;

use tracing::debug;

use crate::error::{FieldError, Result, ValidationErrors};
use crate::types::{EntityKind, NormalizedEntity, StructuredRecord};

pub use job::normalize_job;
pub use links::extract_links;
pub use session::normalize_session;

/// Explicit classifier values supplied by the caller, e.g. a category label
/// scraped next to a link. Only used when they name a known value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierHints {
    pub category: Option<String>,
    pub region: Option<String>,
}

impl ClassifierHints {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Normalize `record` as `kind`.
pub fn normalize(
    kind: EntityKind,
    record: &StructuredRecord,
    source_url: &str,
    hints: &ClassifierHints,
) -> Result<NormalizedEntity> {
    let entity = match kind {
        EntityKind::Job => normalize_job(record, source_url, hints).map(NormalizedEntity::from),
        EntityKind::Session => {
            normalize_session(record, source_url, hints).map(NormalizedEntity::from)
        }
    };

    entity.map_err(|errors| {
        debug!(
            source_url,
            kind = %kind,
            problems = errors.len(),
            fields = ?errors.fields(),
            "Record failed validation"
        );
        errors.into()
    })
}

/// Reads fields out of one record while accumulating problems.
struct FieldReader<'a> {
    record: &'a StructuredRecord,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    fn new(record: &'a StructuredRecord) -> Self {
        let mut errors = ValidationErrors::new();
        if record.as_object().is_none() {
            errors.push(FieldError::unresolved("record", "is not a JSON object"));
        }
        Self { record, errors }
    }

    /// Required text; a blank or missing value is recorded as an error.
    fn required(&mut self, field: &'static str, keys: &[&str]) -> String {
        match self.optional_text(keys) {
            Some(value) => value,
            None => {
                self.errors.push(FieldError::missing(field));
                String::new()
            }
        }
    }

    fn optional_text(&self, keys: &[&str]) -> Option<String> {
        self.record.field(keys).and_then(coerce::text)
    }

    fn optional_list(&self, keys: &[&str]) -> Option<Vec<String>> {
        self.record.field(keys).and_then(coerce::list)
    }

    fn optional_bool(&self, keys: &[&str]) -> Option<bool> {
        self.record.field(keys).and_then(coerce::boolean)
    }

    fn optional_number(&self, keys: &[&str]) -> Option<f64> {
        self.record.field(keys).and_then(coerce::number)
    }

    /// Record an unresolved classifier and pass the value through.
    fn classifier<T>(&mut self, field: &'static str, value: Option<T>, detail: String) -> Option<T> {
        if value.is_none() {
            self.errors.push(FieldError::unresolved(field, detail));
        }
        value
    }

    fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    fn finish(self) -> std::result::Result<(), ValidationErrors> {
        self.errors.into_result()
    }
}
