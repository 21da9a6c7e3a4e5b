//! Schema validator for extracted care-log records
//!
//! Checks one [`RawObservation`] against the input contract and either
//! accepts it as a typed [`ValidatedObservation`] or rejects it with a
//! diagnostic for every violated field. Checks never short-circuit: staff
//! fix a sheet once, not once per error.
//!
//! A date outside the caller's expected month is a soft diagnostic only.
//! Extraction of year-less dates is lossy, so the window is a sanity check,
//! not a gate.

use crate::models::raw::{DATE_KEYS, SUBJECT_KEYS, TIME_SLOT_KEYS};
use crate::models::symbols::{SCORE_MAX, SCORE_MIN};
use crate::models::{
    BinaryMark, FieldError, NoteInput, RawObservation, RawValue, Reason, ScoreInput, SubjectRef,
    TimeSlot, TriState, ValidatedObservation, ValidationOutcome,
};
use chrono::{Datelike, NaiveDate};
use shelter_common::time::YearMonth;

/// Score fields (tri-state mark or level in `SCORE_MIN..=SCORE_MAX`)
pub const SCORE_FIELDS: [&str; 2] = ["appetite", "energy"];

/// Two-state flag fields
pub const FLAG_FIELDS: [&str; 2] = ["urination", "cleaning"];

/// Free-text sub-observations folded into the memo
pub const NOTE_FIELDS: [&str; 4] = ["stool", "vomiting", "medication", "memo"];

/// Provenance keys the extraction step may emit; ignored, never trusted
const IGNORED_FIELDS: [&str; 4] = ["recorder", "recorder_name", "source", "from_paper"];

/// Earliest year accepted for a care log
const MIN_PLAUSIBLE_YEAR: i32 = 2000;

/// Full-date formats, tried in order
const FULL_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// Caller-supplied context for date checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    /// Month the sheet is expected to cover (soft check)
    pub expected_window: Option<YearMonth>,
    /// Year for year-less dates when no window is given; also the upper
    /// plausibility bound (reference year + 1)
    pub reference_year: i32,
}

impl ValidationContext {
    pub fn new(expected_window: Option<YearMonth>, reference_year: i32) -> Self {
        Self {
            expected_window,
            reference_year,
        }
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new(None, shelter_common::time::current_year())
    }
}

/// Stateless validator bound to one batch's context
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    context: ValidationContext,
}

impl SchemaValidator {
    pub fn new(context: ValidationContext) -> Self {
        Self { context }
    }

    /// Validate one record, collecting every diagnostic
    pub fn validate(&self, raw: &RawObservation) -> ValidationOutcome {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let subject = collect(&mut errors, validate_subject(raw));
        let date = collect(&mut errors, self.validate_date(raw, &mut warnings));
        let time_slot = collect(&mut errors, validate_time_slot(raw));

        let [appetite, energy] =
            SCORE_FIELDS.map(|field| collect(&mut errors, validate_score(raw, field)).flatten());
        let [urination, cleaning] =
            FLAG_FIELDS.map(|field| collect(&mut errors, validate_flag(raw, field)).flatten());
        let [stool, vomiting, medication, memo] =
            NOTE_FIELDS.map(|field| collect(&mut errors, validate_note(raw, field)).flatten());

        for key in raw.keys().filter(|k| !is_known_field(k)) {
            tracing::debug!(field = %key, "Ignoring unknown field in extracted record");
        }

        match (subject, date, time_slot) {
            (Some(subject), Some(date), Some(time_slot)) if errors.is_empty() => {
                ValidationOutcome::Accepted {
                    observation: ValidatedObservation {
                        subject,
                        date,
                        time_slot,
                        appetite,
                        energy,
                        urination,
                        cleaning,
                        stool,
                        vomiting,
                        medication,
                        memo,
                    },
                    warnings,
                }
            }
            _ => ValidationOutcome::Rejected { errors, warnings },
        }
    }

    fn validate_date(
        &self,
        raw: &RawObservation,
        warnings: &mut Vec<FieldError>,
    ) -> Result<NaiveDate, FieldError> {
        let Some((key, value)) = raw.first_of(DATE_KEYS) else {
            return Err(FieldError::missing("date"));
        };

        let Some(text) = value.as_text() else {
            return Err(FieldError::new(
                key,
                value.to_string(),
                Reason::WrongType {
                    expected: "date text".into(),
                },
            ));
        };

        let implausible = || FieldError::new(key, text, Reason::ImplausibleDate);
        let date = self.parse_date(text).ok_or_else(implausible)?;

        if date.year() < MIN_PLAUSIBLE_YEAR || date.year() > self.context.reference_year + 1 {
            return Err(implausible());
        }

        if let Some(window) = self.context.expected_window {
            if !window.contains(date) {
                warnings.push(FieldError::new(
                    key,
                    text,
                    Reason::OutsideExpectedWindow {
                        expected: window.to_string(),
                    },
                ));
            }
        }

        Ok(date)
    }

    /// Full dates (`2025-11-03`, `2025/11/3`, `2025年11月3日`) or year-less
    /// `month/day` (`11/3`, `11-3`, `11月3日`)
    fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        if let Some(date) = FULL_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        {
            return Some(date);
        }

        let short = text.replace('月', "/").replace('日', "");
        let (month, day) = short.trim().split_once(['/', '-', '.'])?;
        let month: u32 = month.trim().parse().ok()?;
        let day: u32 = day.trim().parse().ok()?;

        match self.context.expected_window {
            Some(window) => window.nearest_year_for(month, day),
            None => NaiveDate::from_ymd_opt(self.context.reference_year, month, day),
        }
    }
}

/// Push the error (if any) and hand back the value
fn collect<T>(errors: &mut Vec<FieldError>, result: Result<T, FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

fn is_known_field(key: &str) -> bool {
    SUBJECT_KEYS.contains(&key)
        || DATE_KEYS.contains(&key)
        || TIME_SLOT_KEYS.contains(&key)
        || SCORE_FIELDS.contains(&key)
        || FLAG_FIELDS.contains(&key)
        || NOTE_FIELDS.contains(&key)
        || IGNORED_FIELDS.contains(&key)
}

/// Present and non-blank optional field
fn optional<'a>(raw: &'a RawObservation, field: &str) -> Option<&'a RawValue> {
    raw.get(field).filter(|v| !v.is_blank())
}

fn validate_subject(raw: &RawObservation) -> Result<SubjectRef, FieldError> {
    let Some((key, value)) = raw.first_of(SUBJECT_KEYS) else {
        return Err(FieldError::missing("subject"));
    };

    let not_positive = |shown: String| {
        FieldError::new(key, shown, Reason::OutOfRange { min: 1, max: None })
    };
    let wrong_type = || {
        FieldError::new(
            key,
            value.to_string(),
            Reason::WrongType {
                expected: "positive integer id or name".into(),
            },
        )
    };

    match value {
        RawValue::Integer(id) if *id > 0 => Ok(SubjectRef::Id(*id as u64)),
        RawValue::Integer(id) => Err(not_positive(id.to_string())),
        RawValue::Text(_) => {
            let text = value.as_text().unwrap_or_default();
            let digits = text.strip_prefix('#').unwrap_or(text);
            let numeric = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());

            if numeric && key != "animal_name" {
                match digits.parse::<u64>() {
                    Ok(0) => Err(not_positive(text.to_string())),
                    Ok(id) => Ok(SubjectRef::Id(id)),
                    Err(_) => Err(wrong_type()),
                }
            } else {
                Ok(SubjectRef::Name(text.to_string()))
            }
        }
        _ => Err(wrong_type()),
    }
}

fn validate_time_slot(raw: &RawObservation) -> Result<TimeSlot, FieldError> {
    let Some((key, value)) = raw.first_of(TIME_SLOT_KEYS) else {
        return Err(FieldError::missing("time_slot"));
    };

    value
        .as_text()
        .and_then(TimeSlot::from_word)
        .ok_or_else(|| {
            FieldError::new(
                key,
                value.to_string(),
                Reason::InvalidEnum {
                    allowed: TimeSlot::CANONICAL.iter().map(|s| s.to_string()).collect(),
                },
            )
        })
}

fn validate_score(raw: &RawObservation, field: &str) -> Result<Option<ScoreInput>, FieldError> {
    let Some(value) = optional(raw, field) else {
        return Ok(None);
    };

    let level = |n: i64| {
        if (SCORE_MIN as i64..=SCORE_MAX as i64).contains(&n) {
            Ok(Some(ScoreInput::Level(n as u8)))
        } else {
            Err(FieldError::new(
                field,
                n.to_string(),
                Reason::OutOfRange {
                    min: SCORE_MIN as i64,
                    max: Some(SCORE_MAX as i64),
                },
            ))
        }
    };
    let wrong_type = || {
        FieldError::new(
            field,
            value.to_string(),
            Reason::WrongType {
                expected: format!("○/△/× or integer {}-{}", SCORE_MIN, SCORE_MAX),
            },
        )
    };

    match value {
        RawValue::Integer(n) => level(*n),
        RawValue::Float(x) if x.is_finite() && x.fract() == 0.0 => level(*x as i64),
        RawValue::Text(_) => {
            let text = value.as_text().unwrap_or_default();
            if let Some(mark) = TriState::from_token(text) {
                Ok(Some(ScoreInput::Mark(mark)))
            } else if let Ok(n) = text.parse::<i64>() {
                level(n)
            } else {
                Err(wrong_type())
            }
        }
        _ => Err(wrong_type()),
    }
}

fn validate_flag(raw: &RawObservation, field: &str) -> Result<Option<BinaryMark>, FieldError> {
    let Some(value) = optional(raw, field) else {
        return Ok(None);
    };

    let mark = match value {
        RawValue::Bool(b) => Some(BinaryMark::from_bool(*b)),
        RawValue::Integer(0) => Some(BinaryMark::No),
        RawValue::Integer(1) => Some(BinaryMark::Yes),
        RawValue::Text(_) => value.as_text().and_then(BinaryMark::from_token),
        _ => None,
    };

    mark.map(Some).ok_or_else(|| {
        FieldError::new(
            field,
            value.to_string(),
            Reason::WrongType {
                expected: "two-state mark (○/×, yes/no, true/false)".into(),
            },
        )
    })
}

fn validate_note(raw: &RawObservation, field: &str) -> Result<Option<NoteInput>, FieldError> {
    let Some(value) = optional(raw, field) else {
        return Ok(None);
    };

    match value {
        RawValue::Text(_) => Ok(value.as_text().map(|t| NoteInput::Text(t.to_string()))),
        RawValue::Bool(b) => Ok(Some(NoteInput::Flag(*b))),
        RawValue::Integer(_) | RawValue::Float(_) => Ok(Some(NoteInput::Text(value.to_string()))),
        _ => Err(FieldError::new(
            field,
            value.to_string(),
            Reason::WrongType {
                expected: "text".into(),
            },
        )),
    }
}
