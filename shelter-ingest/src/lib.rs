//! shelter-ingest library interface
//!
//! Imports care logs extracted from handwritten sheets into the shelter
//! record store. Exposed as a library for the binary and integration tests.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;

pub use crate::error::{IngestError, IngestResult, StoreError};
pub use crate::pipeline::{parse_input, ImportPipeline, PreviewEntry};
