//! Paper-log shorthand tables
//!
//! Staff write marks rather than values on the care sheets. The validator
//! uses these tables to recognize tokens; the mapper uses them to convert
//! recognized tokens into stored values. Each table exists exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed interval shared by every wellness score
pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 5;

/// Good / neutral / poor mark written against a wellness score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    Good,
    Neutral,
    Poor,
}

/// Tri-state tokens as they appear on the sheets (compared case-insensitively)
const TRI_STATE_TOKENS: &[(&str, TriState)] = &[
    ("○", TriState::Good),
    ("◯", TriState::Good),
    ("〇", TriState::Good),
    ("o", TriState::Good),
    ("good", TriState::Good),
    ("△", TriState::Neutral),
    ("▲", TriState::Neutral),
    ("fair", TriState::Neutral),
    ("neutral", TriState::Neutral),
    ("×", TriState::Poor),
    ("✕", TriState::Poor),
    ("x", TriState::Poor),
    ("poor", TriState::Poor),
];

/// Stored score level for each tri-state mark
const TRI_STATE_LEVELS: &[(TriState, u8)] = &[
    (TriState::Good, 5),
    (TriState::Neutral, 3),
    (TriState::Poor, 1),
];

impl TriState {
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        TRI_STATE_TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, mark)| *mark)
    }

    /// Score level this mark stands for
    pub fn level(self) -> u8 {
        TRI_STATE_LEVELS
            .iter()
            .find(|(mark, _)| *mark == self)
            .map(|(_, level)| *level)
            .unwrap_or(SCORE_MIN + (SCORE_MAX - SCORE_MIN) / 2)
    }
}

/// Two-state mark (checked / unchecked)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryMark {
    Yes,
    No,
}

const BINARY_TOKENS: &[(&str, BinaryMark)] = &[
    ("○", BinaryMark::Yes),
    ("◯", BinaryMark::Yes),
    ("〇", BinaryMark::Yes),
    ("✓", BinaryMark::Yes),
    ("✔", BinaryMark::Yes),
    ("o", BinaryMark::Yes),
    ("yes", BinaryMark::Yes),
    ("y", BinaryMark::Yes),
    ("true", BinaryMark::Yes),
    ("1", BinaryMark::Yes),
    ("あり", BinaryMark::Yes),
    ("有", BinaryMark::Yes),
    ("×", BinaryMark::No),
    ("✕", BinaryMark::No),
    ("x", BinaryMark::No),
    ("no", BinaryMark::No),
    ("n", BinaryMark::No),
    ("false", BinaryMark::No),
    ("0", BinaryMark::No),
    ("なし", BinaryMark::No),
    ("無", BinaryMark::No),
    ("-", BinaryMark::No),
];

impl BinaryMark {
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        BINARY_TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, mark)| *mark)
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            BinaryMark::Yes
        } else {
            BinaryMark::No
        }
    }

    pub fn as_bool(self) -> bool {
        matches!(self, BinaryMark::Yes)
    }
}

/// Care round of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Noon,
    Evening,
}

/// Time-of-day words accepted for each slot
const TIME_SLOT_WORDS: &[(&str, TimeSlot)] = &[
    ("morning", TimeSlot::Morning),
    ("am", TimeSlot::Morning),
    ("朝", TimeSlot::Morning),
    ("noon", TimeSlot::Noon),
    ("midday", TimeSlot::Noon),
    ("昼", TimeSlot::Noon),
    ("evening", TimeSlot::Evening),
    ("pm", TimeSlot::Evening),
    ("night", TimeSlot::Evening),
    ("夕", TimeSlot::Evening),
    ("夜", TimeSlot::Evening),
];

impl TimeSlot {
    /// Canonical tokens, in slot order
    pub const CANONICAL: [&'static str; 3] = ["morning", "noon", "evening"];

    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.trim().to_lowercase();
        TIME_SLOT_WORDS
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, slot)| *slot)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Noon => "noon",
            TimeSlot::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
