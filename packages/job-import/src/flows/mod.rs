//! Import flows built on the client, the normalizer and a sink.
//!
//! - [`single::SingleImport`] - preview one page, persist it on confirmation
//! - [`batch::BatchImporter`] - discover links on a listing page and import them in order

pub mod batch;
pub mod single;

pub use batch::{
    BatchConfig, BatchEvent, BatchImporter, BatchOutcome, BatchPhase, BatchSnapshot, BatchSummary,
};
pub use single::{ImportPreview, SingleImport};
