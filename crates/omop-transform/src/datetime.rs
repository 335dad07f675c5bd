//! Date and duration parsing for the two source families.
//!
//! Laboratory collection dates are strictly `month/day/year` with no
//! fallback: a deviation means the export format changed and the run must
//! stop. The assessment-date reference dataset is operator-maintained and
//! has drifted through several `m/d/y`-family formats, so it gets a
//! lenient multi-format parser.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// chrono's `%Y` also matches two-digit years, turning `3/1/24` into year
/// 0024. Anything below this floor is a truncated year, not a real date.
const MIN_FOUR_DIGIT_YEAR: i32 = 1000;

/// Strict laboratory collection-date format, four-digit year required.
pub fn parse_lab_collection_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%m/%d/%Y")
        .ok()
        .filter(|date| date.year() >= MIN_FOUR_DIGIT_YEAR)
}

const FLEXIBLE_DATE_FORMATS: &[&str] = &[
    "%m-%d-%Y", "%m/%d/%Y", "%m-%d-%y", "%m/%d/%y", "%Y-%m-%d", "%Y/%m/%d", "%y-%m-%d",
    "%y/%m/%d",
];

/// Lenient parser for the assessment-date dataset: first matching format
/// wins, `None` when nothing matches.
pub fn parse_flexible_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    FLEXIBLE_DATE_FORMATS.iter().find_map(|format| {
        let date = NaiveDate::parse_from_str(text, format).ok()?;
        // A `%Y` format swallowing a two-digit year must lose to the `%y`
        // formats further down the list.
        (date.year() >= MIN_FOUR_DIGIT_YEAR).then_some(date)
    })
}

/// A date at midnight, the datetime convention for records whose source
/// carries no time component.
pub fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*min(?:s)?\.?\s*(\d+)\s*sec(?:s)?\.?\s*$")
        .expect("duration regex")
});

/// Parse `"<N> min(s) <N> sec(s)"` to total seconds. The grammar is
/// deliberately narrow; anything else is `None` and the caller aborts the
/// run.
pub fn parse_duration_seconds(text: &str) -> Option<i64> {
    let captures = DURATION_RE.captures(text)?;
    let minutes: i64 = captures.get(1)?.as_str().parse().ok()?;
    let seconds: i64 = captures.get(2)?.as_str().parse().ok()?;
    Some(minutes * 60 + seconds)
}
