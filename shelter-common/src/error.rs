//! Common error types for shelter tooling

use thiserror::Error;

/// Common result type for shelter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across shelter crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or command-line parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
