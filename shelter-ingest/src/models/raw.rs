//! Raw extraction payload
//!
//! The extraction step hands us an arbitrary JSON document. It is parsed as
//! `serde_json::Value` and converted eagerly into [`RawObservation`] (a flat
//! map of [`RawValue`]) when validation begins. Nothing downstream of the
//! validator sees either form.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Loosely typed field value as produced by the extraction step
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects; kept as compact JSON for diagnostics
    Nested(String),
}

impl RawValue {
    /// Text content trimmed, `None` for non-text values
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s.trim()),
            _ => None,
        }
    }

    /// Null or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Short type name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "number",
            RawValue::Text(_) => "text",
            RawValue::Nested(_) => "nested",
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RawValue::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => RawValue::Nested(nested.to_string()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => write!(f, "null"),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Integer(i) => write!(f, "{}", i),
            RawValue::Float(x) => write!(f, "{}", x),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Nested(json) => write!(f, "{}", json),
        }
    }
}

/// One untrusted record: field name to loosely typed value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    fields: BTreeMap<String, RawValue>,
}

impl RawObservation {
    /// Convert one element of the input document
    ///
    /// Returns `Err(value)` when the element is not a JSON object; the caller
    /// turns that into a rejection rather than dropping the element.
    pub fn from_json(value: Value) -> Result<Self, RawValue> {
        match value {
            Value::Object(map) => Ok(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k.trim().to_lowercase(), RawValue::from(v)))
                    .collect(),
            }),
            other => Err(RawValue::from(other)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    /// First present, non-blank value among `keys`, with the key it was found under
    pub fn first_of<'a>(&'a self, keys: &[&'a str]) -> Option<(&'a str, &'a RawValue)> {
        keys.iter()
            .find_map(|k| self.fields.get(*k).filter(|v| !v.is_blank()).map(|v| (*k, v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field keys accepted for the subject reference, in lookup order
pub const SUBJECT_KEYS: &[&str] = &["subject", "animal_id", "animal_name", "animal"];

/// Field keys accepted for the record date
pub const DATE_KEYS: &[&str] = &["date", "log_date"];

/// Field keys accepted for the time slot
pub const TIME_SLOT_KEYS: &[&str] = &["time_slot", "time", "slot"];

/// Where a record came from, as written on the source sheet
///
/// Captured before validation so rejected records can still be located.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordIdentity {
    /// Zero-based position in the input document
    pub index: usize,
    pub subject: String,
    pub date: String,
    pub time_slot: String,
}

impl RecordIdentity {
    const MISSING: &'static str = "<missing>";

    pub fn capture(index: usize, raw: &RawObservation) -> Self {
        let pick = |keys: &[&str]| {
            raw.first_of(keys)
                .map(|(_, v)| v.to_string().trim().to_string())
                .unwrap_or_else(|| Self::MISSING.to_string())
        };
        Self {
            index,
            subject: pick(SUBJECT_KEYS),
            date: pick(DATE_KEYS),
            time_slot: pick(TIME_SLOT_KEYS),
        }
    }

    /// Identity for an element that was not a record object at all
    pub fn unreadable(index: usize) -> Self {
        Self {
            index,
            subject: Self::MISSING.to_string(),
            date: Self::MISSING.to_string(),
            time_slot: Self::MISSING.to_string(),
        }
    }
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} subject={} date={} slot={}",
            self.index, self.subject, self.date, self.time_slot
        )
    }
}

/// Top-level shape of the extraction output
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Wrapped { records: Vec<Value> },
    Bare(Vec<Value>),
}

/// Parse the extraction output into its ordered record elements
///
/// Accepts a bare array or an object with a `records` array; any other
/// top-level keys are ignored.
pub fn parse_document(text: &str) -> Result<Vec<Value>, serde_json::Error> {
    let doc: InputDocument = serde_json::from_str(text)?;
    Ok(match doc {
        InputDocument::Wrapped { records } => records,
        InputDocument::Bare(records) => records,
    })
}
