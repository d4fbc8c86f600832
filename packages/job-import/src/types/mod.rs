//! Data types shared across the import pipeline.

pub mod entity;
pub mod link;
pub mod record;
pub mod request;
pub mod result;

pub use entity::{EntityKind, Job, JobCategory, NormalizedEntity, Region, Session, SessionTopic};
pub use link::{LinkDescriptor, LinkStatus};
pub use record::StructuredRecord;
pub use request::{ExtractionRequest, ExtractionRequestBuilder, TemplateRef};
pub use result::{Diagnostics, ExtractionResult, ExtractionStatus};
