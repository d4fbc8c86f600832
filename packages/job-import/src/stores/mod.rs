//! Persistence sink implementations.
//!
//! - [`MemorySink`] - in-process map, for tests and development
//! - [`JsonFileSink`] - a single JSON file, used by the CLI

mod json_file;
mod memory;

pub use json_file::JsonFileSink;
pub use memory::MemorySink;
