//! Reference-range resolution.
//!
//! Laboratory sources never record patient sex, so every sex-dependent
//! normal range must collapse to a single interval: look up both sexes for
//! the subject's age and take the superinterval. Ranges live either in
//! dedicated lookup tables (one workbook sheet per panel) or as free text
//! in the mapping table; a handful of named tests carry text that fits no
//! grammar and get their own strategies.

use omop_ingest::CsvTable;
use omop_model::Interval;

use crate::error::TransformError;

/// Sex code of a normal-range row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "M" => Some(Self::M),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

/// Convert a coded age (`"90d"`, `"3m"`, `"2y"`) to fractional years.
pub fn age_code_years(code: &str) -> Option<f64> {
    let code = code.trim();
    let number = code.get(..code.len().checked_sub(1)?)?;
    let value: f64 = number.trim().parse().ok()?;
    match code.as_bytes().last()? {
        b'd' => Some(value / 365.25),
        b'm' => Some(value / 12.0),
        b'y' => Some(value),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct NormalRangeRow {
    sex: Sex,
    age_low_years: f64,
    age_high_years: f64,
    interval: Interval,
}

/// Sex/age-banded normal ranges for one named panel, converted to
/// fractional years once at load time.
#[derive(Debug, Clone)]
pub struct NormalRangeTable {
    rows: Vec<NormalRangeRow>,
}

impl NormalRangeTable {
    /// Required columns: `Sex`, `Age_Low`, `Age_High`, `Range_Low`,
    /// `Range_High`. Rows whose sex is neither M nor F are dropped
    /// (header repeats and annotation rows in the workbook); bad age
    /// codes or non-numeric bounds on a kept row fail the load.
    pub fn from_table(table: &CsvTable) -> Result<Self, TransformError> {
        for column in ["Sex", "Age_Low", "Age_High", "Range_Low", "Range_High"] {
            if !table.has_column(column) {
                return Err(TransformError::MissingSourceColumn {
                    column: column.to_string(),
                });
            }
        }
        let mut rows = Vec::new();
        for row in 0..table.row_count() {
            let Some(sex) = Sex::parse(table.cell(row, "Sex").unwrap_or("")) else {
                continue;
            };
            let field = |column: &str| table.cell(row, column).unwrap_or("").to_string();
            let age_low = age_code_years(&field("Age_Low")).ok_or_else(|| {
                TransformError::InvalidRangeRow {
                    row,
                    message: format!("bad age code '{}'", field("Age_Low")),
                }
            })?;
            let age_high = age_code_years(&field("Age_High")).ok_or_else(|| {
                TransformError::InvalidRangeRow {
                    row,
                    message: format!("bad age code '{}'", field("Age_High")),
                }
            })?;
            let bound = |column: &str| -> Result<f64, TransformError> {
                field(column)
                    .trim()
                    .parse()
                    .map_err(|_| TransformError::InvalidRangeRow {
                        row,
                        message: format!("non-numeric bound '{}'", field(column)),
                    })
            };
            rows.push(NormalRangeRow {
                sex,
                age_low_years: age_low,
                age_high_years: age_high,
                interval: Interval::new(bound("Range_Low")?, bound("Range_High")?),
            });
        }
        Ok(Self { rows })
    }

    /// The unique row whose sex matches and whose inclusive age band
    /// contains `age_years`. Zero or multiple matches means the table is
    /// unusable for this subject and the caller must treat the lookup as
    /// failed.
    pub fn lookup(&self, age_years: f64, sex: Sex) -> Option<Interval> {
        let mut matches = self.rows.iter().filter(|row| {
            row.sex == sex && age_years >= row.age_low_years && age_years <= row.age_high_years
        });
        let hit = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(hit.interval)
    }

    /// Superinterval of the female and male ranges for this age; `None`
    /// when either sex fails to resolve.
    pub fn sexless_range(&self, age_years: f64) -> Option<Interval> {
        let female = self.lookup(age_years, Sex::F)?;
        let male = self.lookup(age_years, Sex::M)?;
        Some(female.superinterval(male))
    }
}

/// The two panels backed by dedicated lookup tables.
#[derive(Debug, Clone)]
pub struct RangeTables {
    pub nt_probnp: NormalRangeTable,
    pub alkaline_phosphatase: NormalRangeTable,
}

/// Parse one textual interval clause.
///
/// `low-high` splits on the hyphen; one-sided forms put `0.0` on the
/// unbounded side (`<=X`/`<X` become `(0, X)`, `>=X`/`>X` become
/// `(X, 0)`). That zero is a long-standing convention of the destination
/// tables, not a bug.
pub fn parse_interval_text(text: &str) -> Option<Interval> {
    let text = text.trim();
    if text.contains('-') {
        let (low, high) = text.split_once('-')?;
        return Some(Interval::new(
            low.trim().parse().ok()?,
            high.trim().parse().ok()?,
        ));
    }
    if let Some(rest) = text.strip_prefix("<=") {
        return Some(Interval::new(0.0, rest.trim().parse().ok()?));
    }
    if let Some(rest) = text.strip_prefix(">=") {
        return Some(Interval::new(rest.trim().parse().ok()?, 0.0));
    }
    if let Some(rest) = text.strip_prefix('<') {
        return Some(Interval::new(0.0, rest.trim().parse().ok()?));
    }
    if let Some(rest) = text.strip_prefix('>') {
        return Some(Interval::new(rest.trim().parse().ok()?, 0.0));
    }
    None
}

/// How a test's reference interval is resolved. Dispatch is by exact
/// display name: these tests carry reference text that fits no grammar,
/// or live in external lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStrategy {
    /// Age/sex lookup table, superinterval of both sexes.
    NtProBnp,
    /// Age/sex lookup table, superinterval of both sexes.
    AlkalinePhosphatase,
    /// `Female: <11; Male <16`: upper bounds only, take the larger.
    TroponinT,
    /// Thresholds are age-banded for males and fixed for females; the
    /// source text spells this out in prose, so the bands are hard-coded.
    AltGpt,
    /// `Female: 0.38-1.02, Male: 0.51-1.18`: superinterval of the two.
    Creatinine,
    /// The general textual grammar.
    Generic,
}

impl RangeStrategy {
    pub fn for_test(display_name: &str) -> Self {
        match display_name {
            "NT-proBNP" => Self::NtProBnp,
            "Alkaline Phosphatase" => Self::AlkalinePhosphatase,
            "Troponin-T" => Self::TroponinT,
            "ALT (GPT)" => Self::AltGpt,
            "Creatinine" => Self::Creatinine,
            _ => Self::Generic,
        }
    }
}

/// Resolve a test's reference interval to a single sexless interval.
///
/// Empty or absent text always yields [`Interval::UNKNOWN`] regardless of
/// strategy. `None` means the range genuinely failed to resolve (a
/// per-record rejection); the generic grammar never fails, it degrades to
/// `UNKNOWN`.
pub fn resolve_reference_interval(
    display_name: &str,
    text: Option<&str>,
    age_years: f64,
    tables: &RangeTables,
) -> Option<Interval> {
    let text = text.map(str::trim).unwrap_or("");
    if text.is_empty() {
        return Some(Interval::UNKNOWN);
    }
    match RangeStrategy::for_test(display_name) {
        RangeStrategy::NtProBnp => tables.nt_probnp.sexless_range(age_years),
        RangeStrategy::AlkalinePhosphatase => {
            tables.alkaline_phosphatase.sexless_range(age_years)
        }
        RangeStrategy::TroponinT => troponin_interval(text),
        RangeStrategy::AltGpt => Some(alt_gpt_interval(age_years)),
        RangeStrategy::Creatinine => sex_clause_superinterval(text, ','),
        RangeStrategy::Generic => Some(generic_interval(text)),
    }
}

/// Upper bounds only: last token of each `;`-separated clause is a
/// `<N`-style threshold; keep the larger, lower bound zero.
fn troponin_interval(text: &str) -> Option<Interval> {
    let (female, male) = text.split_once(';')?;
    let female_high = parse_interval_text(last_token(female)?)?.high;
    let male_high = parse_interval_text(last_token(male)?)?.high;
    Some(Interval::new(0.0, female_high.max(male_high)))
}

/// Female 7-33 at any age; male 10-64 through age 49, 10-48 after.
fn alt_gpt_interval(age_years: f64) -> Interval {
    let female = Interval::new(7.0, 33.0);
    let male = if age_years <= 49.0 {
        Interval::new(10.0, 64.0)
    } else {
        Interval::new(10.0, 48.0)
    };
    female.superinterval(male)
}

/// Two sex clauses whose last tokens are full intervals; superinterval of
/// the pair, `None` when either side fails to parse.
fn sex_clause_superinterval(text: &str, separator: char) -> Option<Interval> {
    let (first, second) = text.split_once(separator)?;
    let first = parse_interval_text(last_token(first)?)?;
    let second = parse_interval_text(last_token(second)?)?;
    Some(first.superinterval(second))
}

fn last_token(clause: &str) -> Option<&str> {
    clause.split_whitespace().last()
}

/// The general grammar for reference text embedded in the mapping table.
/// Unrecognized shapes mean "no normal range known", never an error.
fn generic_interval(text: &str) -> Interval {
    if text.contains(';') || text.contains(',') {
        return multi_clause_interval(text);
    }
    if text.starts_with('<') || text.starts_with('>') || text.contains('-') {
        return parse_interval_text(text).unwrap_or(Interval::UNKNOWN);
    }
    Interval::UNKNOWN
}

fn multi_clause_interval(text: &str) -> Interval {
    let clauses: Vec<&str> = text
        .split([';', ','])
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .collect();

    // Sex-labelled clauses combine via the superinterval; a single
    // parseable sex stands alone.
    let female = sex_clause(&clauses, "Female:");
    let male = sex_clause(&clauses, "Male:");
    if clauses.iter().any(|c| c.contains("Female:") || c.contains("Male:")) {
        return match (female, male) {
            (Some(f), Some(m)) => f.superinterval(m),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => Interval::UNKNOWN,
        };
    }

    // Sex-free `>`/`<` clause pair: one side gives the lower bound, the
    // other the upper.
    if let [first, second] = clauses.as_slice() {
        let pair = if first.contains('>') && second.contains('<') {
            parse_interval_text(first).zip(parse_interval_text(second))
        } else if first.contains('<') && second.contains('>') {
            parse_interval_text(second).zip(parse_interval_text(first))
        } else {
            None
        };
        if let Some((lower, upper)) = pair {
            return Interval::new(lower.low, upper.high);
        }
    }
    Interval::UNKNOWN
}

fn sex_clause(clauses: &[&str], label: &str) -> Option<Interval> {
    let clause = clauses.iter().find(|clause| {
        clause.contains(label) && !(label == "Male:" && clause.contains("Female:"))
    })?;
    parse_interval_text(clause.rsplit(':').next()?.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_codes_convert_to_fractional_years() {
        assert_eq!(age_code_years("2y"), Some(2.0));
        assert_eq!(age_code_years("6m"), Some(0.5));
        let days = age_code_years("365.25d").expect("days");
        assert!((days - 1.0).abs() < 1e-9);
        assert_eq!(age_code_years("adult"), None);
        assert_eq!(age_code_years(""), None);
    }

    #[test]
    fn strategy_dispatch_is_exact_name_match() {
        assert_eq!(RangeStrategy::for_test("NT-proBNP"), RangeStrategy::NtProBnp);
        assert_eq!(RangeStrategy::for_test("ALT (GPT)"), RangeStrategy::AltGpt);
        // Near-misses fall through to the grammar.
        assert_eq!(RangeStrategy::for_test("nt-probnp"), RangeStrategy::Generic);
        assert_eq!(RangeStrategy::for_test("Glucose"), RangeStrategy::Generic);
    }

    #[test]
    fn troponin_takes_larger_threshold() {
        assert_eq!(
            troponin_interval("Female: <11; Male <16"),
            Some(Interval::new(0.0, 16.0))
        );
    }

    #[test]
    fn alt_gpt_bands_by_age() {
        assert_eq!(alt_gpt_interval(40.0), Interval::new(7.0, 64.0));
        assert_eq!(alt_gpt_interval(60.0), Interval::new(7.0, 48.0));
    }
}
