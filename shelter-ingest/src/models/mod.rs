//! Data models for the care-log import pipeline

pub mod catalog;
pub mod observation;
pub mod outcome;
pub mod raw;
pub mod symbols;

pub use catalog::{CatalogEntry, CatalogSnapshot};
pub use observation::{
    CareLogRequest, NoteInput, NormalizedObservation, ProvenanceConfig, ScoreInput, SubjectId,
    SubjectRef, ValidatedObservation,
};
pub use outcome::{
    BatchOutcome, FailureStage, FieldError, Reason, RecordOutcome, RecordResult,
    ValidationOutcome,
};
pub use raw::{RawObservation, RawValue, RecordIdentity};
pub use symbols::{BinaryMark, TimeSlot, TriState};
