//! Laboratory normalizer: workbook sheet rows to measurement records.

use omop_ingest::CsvTable;
use omop_map::{MappingEntry, normalize_test_name};
use omop_model::concepts::LAB_TYPE_CONCEPT_ID;
use omop_model::{MeasurementRecord, Operator, SubjectId};
use omop_model::subject::lab_subject_id;
use tracing::{debug, warn};

use crate::context::LabContext;
use crate::datetime::{at_midnight, parse_lab_collection_date};
use crate::error::{RejectReason, TransformError};
use crate::ranges::resolve_reference_interval;

/// Subject-identifier column of every laboratory sheet.
pub const SUBJECT_COLUMN: &str = "Participant ID";
/// Nominal collection-date column of every laboratory sheet.
pub const COLLECTION_DATE_COLUMN: &str = "Date of Collection";

/// The four specimen sheets of a laboratory workbook and the banner rows
/// to skip above each sheet's header.
pub const LAB_SHEETS: &[(&str, usize)] = &[
    ("EDTA Plasma", 2),
    ("Serum", 1),
    ("Whole blood", 1),
    ("Urine", 1),
];

/// Result of normalizing one sheet: provisional records (identifier 0)
/// plus the count of per-record rejections.
#[derive(Debug, Default)]
pub struct SheetOutcome {
    pub records: Vec<MeasurementRecord>,
    pub rejected: usize,
}

enum Normalized {
    Accepted(Box<MeasurementRecord>),
    Rejected(RejectReason),
}

/// Normalize every row of one specimen sheet.
///
/// Every mapping entry is tried against every column of every row, a full
/// cross-product join on normalized display names. That is fine for these
/// batch sources (tens of columns, hundreds of rows); index the mapping
/// side before pointing this at anything high-cardinality.
pub fn process_lab_sheet(
    table: &CsvTable,
    ctx: &LabContext<'_>,
) -> Result<SheetOutcome, TransformError> {
    for column in [SUBJECT_COLUMN, COLLECTION_DATE_COLUMN] {
        if !table.has_column(column) {
            return Err(TransformError::MissingSourceColumn {
                column: column.to_string(),
            });
        }
    }
    let mut outcome = SheetOutcome::default();
    for row in 0..table.row_count() {
        // Spreadsheet blank-row leftovers have an empty subject cell.
        if table.cell(row, SUBJECT_COLUMN).unwrap_or("").is_empty() {
            continue;
        }
        for entry in ctx.mappings {
            let target = normalize_test_name(&entry.source_field);
            for column in &table.headers {
                if normalize_test_name(column) != target {
                    continue;
                }
                // Not every panel is drawn for every subject; an empty
                // result cell is not an error.
                if table.cell(row, column).unwrap_or("").trim().is_empty() {
                    debug!(column = %column, "blank result cell, skipping");
                    continue;
                }
                match create_measurement(table, row, column, entry, ctx)? {
                    Normalized::Accepted(record) => outcome.records.push(*record),
                    Normalized::Rejected(reason) => {
                        debug!(?reason, column = %column, "lab record rejected");
                        outcome.rejected += 1;
                    }
                }
            }
        }
    }
    Ok(outcome)
}

fn create_measurement(
    table: &CsvTable,
    row: usize,
    column: &str,
    entry: &MappingEntry,
    ctx: &LabContext<'_>,
) -> Result<Normalized, TransformError> {
    let subject = lab_subject_id(table.cell(row, SUBJECT_COLUMN).unwrap_or(""));
    let Some(age_years) = ctx.ages.age_in_years(subject) else {
        warn!(
            subject,
            "no age on file in the reference population, rejecting record"
        );
        return Ok(Normalized::Rejected(RejectReason::NoAgeOnFile));
    };

    let mut record = MeasurementRecord {
        person_id: SubjectId::Numeric(subject),
        measurement_concept_id: entry.concept_id,
        measurement_type_concept_id: LAB_TYPE_CONCEPT_ID,
        measurement_source_value: column.to_string(),
        unit_source_value: entry.units.clone().unwrap_or_default(),
        ..MeasurementRecord::default()
    };

    // Strictly month/day/year; any other shape means the export format
    // changed and the run must stop.
    let raw_date = table.cell(row, COLLECTION_DATE_COLUMN).unwrap_or("");
    let collection_date = parse_lab_collection_date(raw_date).ok_or_else(|| {
        TransformError::InvalidCollectionDate {
            subject: subject.to_string(),
            value: raw_date.to_string(),
        }
    })?;
    record.measurement_date = Some(collection_date);
    record.measurement_datetime = Some(at_midnight(collection_date));
    record.measurement_time = Some(at_midnight(collection_date).time());

    // A leading `<` marks a below-detection-limit result.
    let raw_value = table.cell(row, column).unwrap_or("").trim().to_string();
    record.value_source_value = raw_value.clone();
    let (operator, number_text) = match raw_value.strip_prefix('<') {
        Some(rest) => (Operator::LessThan, rest.trim()),
        None => (Operator::Equals, raw_value.as_str()),
    };
    record.operator_concept_id = operator.concept_id();
    record.value_as_number =
        number_text
            .parse()
            .map_err(|_| TransformError::InvalidValue {
                subject: subject.to_string(),
                field: column.to_string(),
                value: raw_value.clone(),
            })?;

    let Some(interval) = resolve_reference_interval(
        &entry.source_field,
        entry.reference_interval.as_deref(),
        f64::from(age_years),
        ctx.range_tables,
    ) else {
        warn!(
            subject,
            test = %entry.source_field,
            age_years,
            "reference range did not resolve for this age, rejecting record"
        );
        return Ok(Normalized::Rejected(RejectReason::RangeResolutionFailed));
    };
    record.range_low = interval.low;
    record.range_high = interval.high;

    // Canonicalize the collection date to the earliest known visit when
    // one exists; the nominal date otherwise stands.
    match ctx.visits.earliest_visit(subject) {
        Some(visit) => {
            record.visit_occurrence_id = visit.visit_occurrence_id;
            record.measurement_date = Some(visit.start_date);
            record.measurement_datetime = Some(at_midnight(visit.start_date));
            record.measurement_time = Some(at_midnight(visit.start_date).time());
        }
        None => {
            debug!(
                subject,
                "no qualifying visit on file, keeping the sheet's collection date"
            );
        }
    }

    Ok(Normalized::Accepted(Box::new(record)))
}
