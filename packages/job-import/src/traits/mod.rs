//! Trait seams of the pipeline.
//!
//! - [`transport::Transport`] - one form POST to the extraction endpoint
//! - [`extractor::Extractor`] - one page in, one [`ExtractionResult`](crate::types::ExtractionResult) out
//! - [`sink::PersistenceSink`] - where normalized entities go

pub mod extractor;
pub mod sink;
pub mod transport;

pub use extractor::Extractor;
pub use sink::{PersistenceSink, SubmitReport};
pub use transport::{Transport, TransportError, TransportResponse};
