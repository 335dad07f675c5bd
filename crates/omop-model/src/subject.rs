use std::fmt;

use serde::{Serialize, Serializer};

/// Subject identifier as it appears on a normalized record.
///
/// Laboratory sources always resolve to `Numeric` (with 0 standing in for
/// anything unusable, which can never match the reference population).
/// Cognitive-assessment sources carry free-form institute file numbers and
/// keep non-numeric text as-is; such records are dropped later by the
/// validity filter rather than rejected at normalization time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectId {
    Numeric(i64),
    Text(String),
}

impl SubjectId {
    /// Convert a free-form institute file number. Digit-only text (and
    /// float-looking text such as `"1024.0"`, an Excel artifact) becomes
    /// numeric; everything else is kept verbatim.
    pub fn from_source(raw: &str) -> Self {
        let trimmed = raw.trim();
        match parse_numeric(trimmed) {
            Some(id) => Self::Numeric(id),
            None => Self::Text(trimmed.to_string()),
        }
    }

    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            Self::Numeric(id) => Some(*id),
            Self::Text(_) => None,
        }
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::Numeric(0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for SubjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(id) => serializer.serialize_i64(*id),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Clean up a laboratory subject-identifier cell.
///
/// Spreadsheet exports render these as integers, float-formatted text, or
/// leftovers from blank rows. Anything that is not a plain non-negative
/// integer or `N.0`-style float collapses to 0, an illegal subject id that
/// never matches a row of the reference population.
pub fn lab_subject_id(raw: &str) -> i64 {
    let trimmed = raw.trim();
    parse_numeric(trimmed).unwrap_or(0)
}

fn parse_numeric(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }
    // Float-formatted integer text ("1024.0"): digits with a single dot.
    if text.bytes().filter(|&b| b == b'.').count() == 1
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    {
        return text.parse::<f64>().ok().map(|v| v as i64);
    }
    None
}
