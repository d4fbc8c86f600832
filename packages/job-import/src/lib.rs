//! Web-Sourced Job and Session Import
//!
//! Turns arbitrary job and event pages into validated directory entries.
//! A remote, LLM-backed extraction service reads the page; this crate
//! validates what comes back and stores it.
//!
//! # Pipeline
//!
//! 1. [`client::ExtractionClient`] sends one form POST per page and returns an
//!    untrusted [`StructuredRecord`]
//! 2. [`normalize`] is the only way from a record to a [`Job`] or [`Session`];
//!    it reports every problem at once
//! 3. A [`PersistenceSink`] upserts entities by source URL
//!
//! [`flows::SingleImport`] runs this for one page with a confirmation step in
//! between. [`flows::BatchImporter`] discovers the links on a listing page and
//! imports them one at a time, publishing a [`BatchSnapshot`] after every
//! step.
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_import::{BatchConfig, BatchImporter, EntityKind, ExtractionRequest, MemorySink};
//! use job_import::testing::MockExtractor;
//! use tokio_util::sync::CancellationToken;
//!
//! let importer = BatchImporter::new(MockExtractor::new(), MemorySink::new(), BatchConfig::default());
//! let listing = ExtractionRequest::builder("https://jobs.example.com/offers").build();
//!
//! let links = importer.discover(&listing).await?;
//! let mut updates = importer.subscribe();
//! let summary = importer
//!     .run(&listing, links, EntityKind::Job, &CancellationToken::new())
//!     .await?;
//! println!("{}", summary.message());
//! ```
//!
//! # Modules
//!
//! - [`client`] - Extraction service client and HTTP transport
//! - [`normalize`] - Record validation, coercion and classification
//! - [`flows`] - Single-page and batch import
//! - [`stores`] - Sink implementations (MemorySink, JsonFileSink)
//! - [`traits`] - Transport, Extractor and PersistenceSink seams
//! - [`types`] - Requests, results, records and entities
//! - [`testing`] - Mock implementations for testing

pub mod client;
pub mod error;
pub mod flows;
pub mod normalize;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ErrorKind, FieldError, ImportError, Result, ValidationErrors};
pub use traits::{
    Extractor, PersistenceSink, SubmitReport, Transport, TransportError, TransportResponse,
};
pub use types::{
    Diagnostics, EntityKind, ExtractionRequest, ExtractionRequestBuilder, ExtractionResult,
    ExtractionStatus, Job, JobCategory, LinkDescriptor, LinkStatus, NormalizedEntity, Region,
    Session, SessionTopic, StructuredRecord, TemplateRef,
};

pub use client::{ClientConfig, ExtractionClient, ReqwestTransport};
pub use flows::{
    BatchConfig, BatchEvent, BatchImporter, BatchOutcome, BatchPhase, BatchSnapshot, BatchSummary,
    ImportPreview, SingleImport,
};
pub use normalize::{normalize, ClassifierHints};
pub use stores::{JsonFileSink, MemorySink};
