//! Validation diagnostics and per-record batch results

use super::observation::ValidatedObservation;
use super::raw::RecordIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum Reason {
    MissingRequired,
    OutOfRange {
        min: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    WrongType { expected: String },
    InvalidEnum { allowed: Vec<String> },
    ImplausibleDate,
    /// Soft diagnostic: recorded, never rejects on its own
    OutsideExpectedWindow { expected: String },
}

impl Reason {
    pub fn code(&self) -> &'static str {
        match self {
            Reason::MissingRequired => "missing-required",
            Reason::OutOfRange { .. } => "out-of-range",
            Reason::WrongType { .. } => "wrong-type",
            Reason::InvalidEnum { .. } => "invalid-enum",
            Reason::ImplausibleDate => "implausible-date",
            Reason::OutsideExpectedWindow { .. } => "outside-expected-window",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::OutOfRange { min, max: Some(max) } => {
                write!(f, "{} (valid {}..={})", self.code(), min, max)
            }
            Reason::OutOfRange { min, max: None } => write!(f, "{} (must be >= {})", self.code(), min),
            Reason::WrongType { expected } => write!(f, "{} (expected {})", self.code(), expected),
            Reason::InvalidEnum { allowed } => {
                write!(f, "{} (one of {})", self.code(), allowed.join(", "))
            }
            Reason::OutsideExpectedWindow { expected } => {
                write!(f, "{} (expected {})", self.code(), expected)
            }
            _ => f.write_str(self.code()),
        }
    }
}

/// Field-level diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    /// Offending value as written (empty when missing)
    pub value: String,
    pub reason: Reason,
}

impl FieldError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, reason: Reason) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "", Reason::MissingRequired)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}: {}", self.field, self.reason)
        } else {
            write!(f, "{}='{}': {}", self.field, self.value, self.reason)
        }
    }
}

/// Result of validating one raw record
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted {
        observation: ValidatedObservation,
        /// Soft diagnostics (e.g. date outside the expected window)
        warnings: Vec<FieldError>,
    },
    Rejected {
        /// Every violated field, not just the first
        errors: Vec<FieldError>,
        /// Soft diagnostics found alongside the errors
        warnings: Vec<FieldError>,
    },
}

/// Pipeline stage at which a record failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Validation,
    Mapping,
    Resolution,
    Registration,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureStage::Validation => "validation",
            FailureStage::Mapping => "mapping",
            FailureStage::Resolution => "resolution",
            FailureStage::Registration => "registration",
        })
    }
}

/// Per-record result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RecordResult {
    Success {
        remote_id: u64,
    },
    Failure {
        stage: FailureStage,
        reason: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        diagnostics: Vec<FieldError>,
    },
}

impl RecordResult {
    pub fn failure(stage: FailureStage, reason: impl Into<String>) -> Self {
        RecordResult::Failure {
            stage,
            reason: reason.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Validation failure carrying the full diagnostic list
    pub fn rejected(diagnostics: Vec<FieldError>) -> Self {
        let reason = diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        RecordResult::Failure {
            stage: FailureStage::Validation,
            reason,
            diagnostics,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RecordResult::Success { .. })
    }
}

/// One entry of the batch accumulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub identity: RecordIdentity,
    pub result: RecordResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldError>,
}

/// Append-only accumulator of one result per input record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Run was cancelled; unattempted records are counted as failures
    pub cancelled: bool,
    entries: Vec<RecordOutcome>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            cancelled: false,
            entries: Vec::new(),
        }
    }

    /// Append the result for the next record
    pub fn push(&mut self, outcome: RecordOutcome) {
        debug_assert_eq!(
            outcome.identity.index,
            self.entries.len(),
            "records must be appended in input order"
        );
        self.entries.push(outcome);
    }

    pub fn entries(&self) -> &[RecordOutcome] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

impl Default for BatchOutcome {
    fn default() -> Self {
        Self::new()
    }
}
