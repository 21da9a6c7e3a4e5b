//! # Shelter Common Library
//!
//! Shared code for the shelter tooling binaries:
//! - Error and result types
//! - TOML configuration loading and config-file discovery
//! - Tracing subscriber initialization
//! - Calendar helpers (expected year/month windows)

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
