//! Symbol mapper: validated shorthand → normalized care log
//!
//! Pure and infallible. Owns the only default table in the pipeline and
//! stamps provenance from configuration, never from the input.
//!
//! # Memo aggregation
//!
//! Sub-observations without their own column are folded into `memo` in the
//! fixed order of [`NOTE_LABELS`], each as `[label] text`, joined by
//! [`MEMO_SEPARATOR`]. Boolean notes read `yes` / `no`. Empty notes are
//! skipped, so a record with none gets the default empty memo.

use crate::models::{
    NoteInput, NormalizedObservation, ProvenanceConfig, ScoreInput, ValidatedObservation,
};

/// Separator between memo parts
pub const MEMO_SEPARATOR: &str = " / ";

/// Memo labels, in output order
pub const NOTE_LABELS: [&str; 4] = ["stool", "vomiting", "medication", "memo"];

/// Values used for optional fields absent from the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub appetite: u8,
    pub energy: u8,
    pub urination: bool,
    pub cleaning: bool,
    pub memo: &'static str,
}

/// The default table
pub const DEFAULTS: Defaults = Defaults {
    appetite: 3,
    energy: 3,
    urination: false,
    cleaning: false,
    memo: "",
};

/// Maps validated records into normalized care logs
#[derive(Debug, Clone, Default)]
pub struct SymbolMapper {
    provenance: ProvenanceConfig,
}

impl SymbolMapper {
    pub fn new(provenance: ProvenanceConfig) -> Self {
        Self { provenance }
    }

    pub fn map(&self, record: &ValidatedObservation) -> NormalizedObservation {
        NormalizedObservation {
            subject: record.subject.clone(),
            log_date: record.date,
            time_slot: record.time_slot,
            appetite: score(record.appetite, DEFAULTS.appetite),
            energy: score(record.energy, DEFAULTS.energy),
            urination: record.urination.map_or(DEFAULTS.urination, |m| m.as_bool()),
            cleaning: record.cleaning.map_or(DEFAULTS.cleaning, |m| m.as_bool()),
            memo: aggregate_memo([
                record.stool.as_ref(),
                record.vomiting.as_ref(),
                record.medication.as_ref(),
                record.memo.as_ref(),
            ]),
            source: self.provenance.source_tag.clone(),
            from_paper: true,
            recorder_name: self.provenance.recorder_label.clone(),
        }
    }
}

fn score(input: Option<ScoreInput>, default: u8) -> u8 {
    match input {
        Some(ScoreInput::Mark(mark)) => mark.level(),
        Some(ScoreInput::Level(level)) => level,
        None => default,
    }
}

fn aggregate_memo(notes: [Option<&NoteInput>; 4]) -> String {
    let parts: Vec<String> = NOTE_LABELS
        .iter()
        .zip(notes)
        .filter_map(|(label, note)| {
            let text = match note? {
                NoteInput::Text(text) if text.trim().is_empty() => return None,
                NoteInput::Text(text) => text.trim().to_string(),
                NoteInput::Flag(true) => "yes".to_string(),
                NoteInput::Flag(false) => "no".to_string(),
            };
            Some(format!("[{}] {}", label, text))
        })
        .collect();

    if parts.is_empty() {
        DEFAULTS.memo.to_string()
    } else {
        parts.join(MEMO_SEPARATOR)
    }
}
