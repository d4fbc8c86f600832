//! Two-step single page import.
//!
//! [`SingleImport::preview`] extracts and returns the untrusted record for a
//! human to look at. Nothing is stored until [`SingleImport::confirm`] is
//! called with that preview.

use tracing::{info, warn};

use crate::error::Result;
use crate::normalize::{normalize, ClassifierHints};
use crate::traits::{Extractor, PersistenceSink};
use crate::types::{EntityKind, ExtractionRequest, NormalizedEntity, StructuredRecord};

/// An extracted record waiting for a decision.
#[derive(Debug, Clone)]
pub struct ImportPreview {
    request: ExtractionRequest,
    record: StructuredRecord,
}

impl ImportPreview {
    pub fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    pub fn record(&self) -> &StructuredRecord {
        &self.record
    }

    /// Pretty-printed record.
    pub fn render(&self) -> String {
        self.record.preview()
    }

    /// Discard without storing anything.
    pub fn reject(self) {
        info!(url = %self.request.url(), "Import preview rejected");
    }
}

/// Single page import against one extractor and one sink.
pub struct SingleImport<E, S> {
    extractor: E,
    sink: S,
}

impl<E: Extractor, S: PersistenceSink> SingleImport<E, S> {
    pub fn new(extractor: E, sink: S) -> Self {
        Self { extractor, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Extract one page. Never persists.
    pub async fn preview(&self, request: ExtractionRequest) -> Result<ImportPreview> {
        let record = self.extractor.extract(&request).await?.into_record()?;

        info!(
            url = %request.url(),
            fields = record.len(),
            "Extracted record for preview"
        );

        Ok(ImportPreview { request, record })
    }

    /// Normalize the previewed record and submit it.
    ///
    /// A validation failure is returned with every problem and leaves the
    /// sink untouched.
    pub async fn confirm(
        &self,
        preview: ImportPreview,
        kind: EntityKind,
        hints: &ClassifierHints,
    ) -> Result<NormalizedEntity> {
        let url = preview.request.url();
        let entity = normalize(kind, &preview.record, url, hints).map_err(|e| {
            warn!(url = %url, error = %e, "Record rejected by normalizer");
            e
        })?;

        let report = self.sink.submit(vec![entity.clone()]).await?;
        info!(
            url = %url,
            kind = %kind,
            id = %entity.id(),
            inserted = report.inserted,
            updated = report.updated,
            "Imported record"
        );

        Ok(entity)
    }
}
