//! Error types for shelter-ingest
//!
//! Only [`IngestError`] escapes a batch run. Everything that can go wrong
//! with a single record is folded into that record's result instead.

use thiserror::Error;

/// Remote record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials refused, or the login call itself failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Connection, DNS, TLS or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the client timeout; the remote side may have applied it
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Remote store declined the request
    #[error("Remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl StoreError {
    /// Classify a reqwest transport error
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StoreError::Timeout(error.to_string())
        } else {
            StoreError::Network(error.to_string())
        }
    }
}

/// Run-level errors: the batch could not be processed at all
#[derive(Debug, Error)]
pub enum IngestError {
    /// Batch credentials rejected; no record was attempted
    #[error("Authentication failed, no records were submitted: {0}")]
    Authentication(String),

    /// Animal catalog could not be fetched; no record was attempted
    #[error("Could not fetch animal catalog: {0}")]
    Catalog(String),

    /// Input document unreadable as a record list
    #[error("Invalid input document: {0}")]
    Input(String),

    #[error(transparent)]
    Common(#[from] shelter_common::Error),
}

/// Result type for batch runs
pub type IngestResult<T> = Result<T, IngestError>;
