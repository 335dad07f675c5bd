//! Per-run lookup structures, built once during pipeline setup and passed
//! immutably into every normalization call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use omop_ingest::CsvTable;
use omop_map::MappingEntry;
use omop_model::SubjectId;
use tracing::warn;

use crate::datetime::parse_flexible_date;
use crate::error::TransformError;
use crate::ranges::RangeTables;

/// Subject ages derived from the reference population's birth years at
/// year granularity: current calendar year minus year of birth.
#[derive(Debug, Clone)]
pub struct AgeLookup {
    birth_years: BTreeMap<i64, i32>,
    current_year: i32,
}

impl AgeLookup {
    pub fn new(birth_years: BTreeMap<i64, i32>, current_year: i32) -> Self {
        Self {
            birth_years,
            current_year,
        }
    }

    pub fn age_in_years(&self, subject: i64) -> Option<i32> {
        self.birth_years
            .get(&subject)
            .map(|birth_year| self.current_year - birth_year)
    }

    pub fn len(&self) -> usize {
        self.birth_years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.birth_years.is_empty()
    }
}

/// A subject's earliest qualifying clinical visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitInfo {
    pub visit_occurrence_id: i64,
    pub start_date: NaiveDate,
}

/// Subject-keyed map to the earliest known visit, used to override a lab
/// row's nominal collection date with the canonical visit date.
#[derive(Debug, Clone, Default)]
pub struct VisitLookup {
    earliest: BTreeMap<i64, VisitInfo>,
}

impl VisitLookup {
    /// Build from `(person_id, visit_occurrence_id, start_date)` rows,
    /// keeping the earliest start date per subject.
    pub fn from_rows(rows: impl IntoIterator<Item = (i64, i64, NaiveDate)>) -> Self {
        let mut earliest: BTreeMap<i64, VisitInfo> = BTreeMap::new();
        for (person_id, visit_occurrence_id, start_date) in rows {
            let info = VisitInfo {
                visit_occurrence_id,
                start_date,
            };
            earliest
                .entry(person_id)
                .and_modify(|current| {
                    if start_date < current.start_date {
                        *current = info;
                    }
                })
                .or_insert(info);
        }
        Self { earliest }
    }

    pub fn earliest_visit(&self, subject: i64) -> Option<VisitInfo> {
        self.earliest.get(&subject).copied()
    }
}

/// Subject-keyed physical-assessment dates from the survey export. Keys
/// are the study identifier rendered as text, which is how the export
/// writes them.
#[derive(Debug, Clone, Default)]
pub struct AssessmentDates {
    dates: BTreeMap<String, NaiveDate>,
}

impl AssessmentDates {
    /// Read `key_column` → `date_column` pairs. Rows with blank keys or
    /// unparseable dates are warned about and dropped; the dataset is
    /// operator-maintained and partial coverage is normal.
    pub fn from_table(
        table: &CsvTable,
        key_column: &str,
        date_column: &str,
    ) -> Result<Self, TransformError> {
        for column in [key_column, date_column] {
            if !table.has_column(column) {
                return Err(TransformError::MissingSourceColumn {
                    column: column.to_string(),
                });
            }
        }
        let mut dates = BTreeMap::new();
        for row in 0..table.row_count() {
            let key = table.cell(row, key_column).unwrap_or("").trim().to_string();
            if key.is_empty() {
                continue;
            }
            let raw_date = table.cell(row, date_column).unwrap_or("");
            match parse_flexible_date(raw_date) {
                Some(date) => {
                    dates.insert(key, date);
                }
                None => {
                    warn!(subject = %key, value = raw_date, "unparseable assessment date, skipping row");
                }
            }
        }
        Ok(Self { dates })
    }

    pub fn date_for(&self, subject: &SubjectId) -> Option<NaiveDate> {
        self.dates.get(&subject.to_string()).copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Mapping row whose concept id is the "automated instrument" record type.
pub const AUTOMATED_TYPE_SOURCE_FIELD: &str = "assessment_type_digital";
/// Mapping row whose concept id is the "manually transcribed" record type.
pub const TRANSCRIBED_TYPE_SOURCE_FIELD: &str = "assessment_type_paper";

/// The two record-type concept ids for the assessment pipeline, resolved
/// once per run from the mapping table's own rows. Both must exist before
/// any normalization starts.
#[derive(Debug, Clone, Copy)]
pub struct TypeConcepts {
    pub automated: i64,
    pub transcribed: i64,
}

impl TypeConcepts {
    pub fn resolve(mappings: &[MappingEntry]) -> Result<Self, TransformError> {
        let find = |source_field: &str| {
            mappings
                .iter()
                .find(|entry| entry.source_field == source_field)
                .map(|entry| entry.concept_id)
                .ok_or_else(|| TransformError::MissingTypeConcept {
                    source_field: source_field.to_string(),
                })
        };
        Ok(Self {
            automated: find(AUTOMATED_TYPE_SOURCE_FIELD)?,
            transcribed: find(TRANSCRIBED_TYPE_SOURCE_FIELD)?,
        })
    }
}

/// Everything the laboratory normalizer needs per record.
#[derive(Debug)]
pub struct LabContext<'a> {
    pub mappings: &'a [MappingEntry],
    pub ages: &'a AgeLookup,
    pub visits: &'a VisitLookup,
    pub range_tables: &'a RangeTables,
}

/// Everything the cognitive-assessment normalizer needs per record.
#[derive(Debug)]
pub struct AssessmentContext<'a> {
    pub mappings: &'a [MappingEntry],
    pub dates: &'a AssessmentDates,
    pub type_concepts: TypeConcepts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_is_current_year_minus_birth_year() {
        let ages = AgeLookup::new(BTreeMap::from([(1024, 1960)]), 2026);
        assert_eq!(ages.age_in_years(1024), Some(66));
        assert_eq!(ages.age_in_years(9999), None);
    }

    #[test]
    fn visit_lookup_keeps_earliest_start() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let visits = VisitLookup::from_rows([
            (1024, 7, day(9)),
            (1024, 3, day(2)),
            (1024, 9, day(20)),
            (2048, 4, day(5)),
        ]);
        assert_eq!(
            visits.earliest_visit(1024),
            Some(VisitInfo {
                visit_occurrence_id: 3,
                start_date: day(2)
            })
        );
        assert_eq!(visits.earliest_visit(4096), None);
    }
}
