//! Typed care-log observations
//!
//! [`ValidatedObservation`] is what the validator accepts: typed and
//! range-checked but still holding shorthand marks and absent fields.
//! [`NormalizedObservation`] is what the mapper emits: every field populated,
//! ready to send once the subject is resolved.

use super::symbols::{BinaryMark, TimeSlot, TriState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Animal reference as written on the sheet (not yet resolved)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectRef {
    Id(u64),
    Name(String),
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectRef::Id(id) => write!(f, "#{}", id),
            SubjectRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Canonical animal id in the remote catalog
pub type SubjectId = u64;

/// Wellness score as written: a shorthand mark or an explicit level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreInput {
    Mark(TriState),
    Level(u8),
}

/// Free-text sub-observation; booleans are kept so the note can say yes/no
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteInput {
    Text(String),
    Flag(bool),
}

/// Record accepted by the schema validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedObservation {
    pub subject: SubjectRef,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub appetite: Option<ScoreInput>,
    pub energy: Option<ScoreInput>,
    pub urination: Option<BinaryMark>,
    pub cleaning: Option<BinaryMark>,
    pub stool: Option<NoteInput>,
    pub vomiting: Option<NoteInput>,
    pub medication: Option<NoteInput>,
    pub memo: Option<NoteInput>,
}

impl ValidatedObservation {
    /// Minimal record: required fields only
    pub fn new(subject: SubjectRef, date: NaiveDate, time_slot: TimeSlot) -> Self {
        Self {
            subject,
            date,
            time_slot,
            appetite: None,
            energy: None,
            urination: None,
            cleaning: None,
            stool: None,
            vomiting: None,
            medication: None,
            memo: None,
        }
    }
}

/// Provenance stamped on every imported record
///
/// Comes from pipeline configuration only; input records cannot set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceConfig {
    pub source_tag: String,
    pub recorder_label: String,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            source_tag: shelter_common::config::DEFAULT_SOURCE_TAG.to_string(),
            recorder_label: shelter_common::config::DEFAULT_RECORDER_LABEL.to_string(),
        }
    }
}

impl From<&shelter_common::config::ProvenanceSection> for ProvenanceConfig {
    fn from(section: &shelter_common::config::ProvenanceSection) -> Self {
        Self {
            source_tag: section.source_tag.clone(),
            recorder_label: section.recorder_label.clone(),
        }
    }
}

/// Validated, mapped, default-filled care log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedObservation {
    pub subject: SubjectRef,
    pub log_date: NaiveDate,
    pub time_slot: TimeSlot,
    /// 1..=5
    pub appetite: u8,
    /// 1..=5
    pub energy: u8,
    pub urination: bool,
    pub cleaning: bool,
    pub memo: String,
    pub source: String,
    pub from_paper: bool,
    pub recorder_name: String,
}

impl NormalizedObservation {
    /// Wire body for the register call, with the resolved animal id
    pub fn to_request(&self, animal_id: SubjectId) -> CareLogRequest<'_> {
        CareLogRequest {
            animal_id,
            log_date: self.log_date,
            time_slot: self.time_slot,
            appetite: self.appetite,
            energy: self.energy,
            urination: self.urination,
            cleaning: self.cleaning,
            memo: &self.memo,
            source: &self.source,
            from_paper: self.from_paper,
            recorder_name: &self.recorder_name,
        }
    }
}

/// Body of `POST <care-logs>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareLogRequest<'a> {
    pub animal_id: SubjectId,
    pub log_date: NaiveDate,
    pub time_slot: TimeSlot,
    pub appetite: u8,
    pub energy: u8,
    pub urination: bool,
    pub cleaning: bool,
    pub memo: &'a str,
    pub source: &'a str,
    pub from_paper: bool,
    pub recorder_name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_substitutes_resolved_id() {
        let observation = NormalizedObservation {
            subject: SubjectRef::Name("Tama".into()),
            log_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            time_slot: TimeSlot::Noon,
            appetite: 5,
            energy: 3,
            urination: true,
            cleaning: false,
            memo: "[stool] soft".into(),
            source: "paper_ocr_import".into(),
            from_paper: true,
            recorder_name: "paper import".into(),
        };

        let body = serde_json::to_value(observation.to_request(42)).unwrap();
        assert_eq!(
            body,
            json!({
                "animal_id": 42,
                "log_date": "2025-11-03",
                "time_slot": "noon",
                "appetite": 5,
                "energy": 3,
                "urination": true,
                "cleaning": false,
                "memo": "[stool] soft",
                "source": "paper_ocr_import",
                "from_paper": true,
                "recorder_name": "paper import"
            })
        );
    }

    #[test]
    fn test_subject_ref_display() {
        assert_eq!(SubjectRef::Id(7).to_string(), "#7");
        assert_eq!(SubjectRef::Name("Mike".into()).to_string(), "'Mike'");
    }
}
