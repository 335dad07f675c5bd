//! Cognitive-assessment normalizer: delimited survey exports to
//! measurement and observation records, routed per field by the mapping
//! table's target domain.

use chrono::NaiveDate;
use omop_ingest::CsvTable;
use omop_map::MappingEntry;
use omop_model::{
    Interval, MeasurementRecord, ObservationRecord, SourceDataType, SubjectId, TargetDomain,
};
use tracing::{debug, warn};

use crate::context::AssessmentContext;
use crate::datetime::{at_midnight, parse_duration_seconds};
use crate::error::TransformError;

/// Subject-identifier column of the assessment exports.
pub const SUBJECT_COLUMN: &str = "Institute File number";

/// Case-insensitive filename marker for manually transcribed (paper-based)
/// exports.
pub const PAPER_MARKER: &str = "paper";

/// Result of normalizing one export: provisional records (identifier 0)
/// plus the skip counters.
#[derive(Debug, Default)]
pub struct AssessmentOutcome {
    pub measurements: Vec<MeasurementRecord>,
    pub observations: Vec<ObservationRecord>,
    /// Mapped fields whose source cell was null or blank.
    pub skipped: usize,
    /// Rows whose subject has no physical-assessment date on file.
    pub missing_date: usize,
}

/// Normalize every row of one assessment export. `source_name` is the
/// export's file name; it decides the record-type concept (paper-based
/// exports were transcribed by hand, everything else came straight off
/// the instrument).
pub fn process_assessment_table(
    table: &CsvTable,
    source_name: &str,
    ctx: &AssessmentContext<'_>,
) -> Result<AssessmentOutcome, TransformError> {
    if !table.has_column(SUBJECT_COLUMN) {
        return Err(TransformError::MissingSourceColumn {
            column: SUBJECT_COLUMN.to_string(),
        });
    }
    let type_concept_id = if source_name.to_lowercase().contains(PAPER_MARKER) {
        ctx.type_concepts.transcribed
    } else {
        ctx.type_concepts.automated
    };
    debug!(source = source_name, type_concept_id, "normalizing assessment export");

    let mut outcome = AssessmentOutcome::default();
    for row in 0..table.row_count() {
        let raw_subject = table.cell(row, SUBJECT_COLUMN).unwrap_or("").trim();
        if raw_subject.is_empty() {
            continue;
        }
        let subject = SubjectId::from_source(raw_subject);
        let date = ctx.dates.date_for(&subject);
        if date.is_none() {
            warn!(subject = %subject, "no physical-assessment date on file, emitting records without dates");
            outcome.missing_date += 1;
        }
        for entry in ctx.mappings {
            if !table.has_column(&entry.source_field) {
                continue;
            }
            let raw_value = table
                .cell(row, &entry.source_field)
                .unwrap_or("")
                .trim()
                .to_string();
            // Unanswered fields are normal in these exports.
            if raw_value.is_empty() {
                outcome.skipped += 1;
                continue;
            }
            match entry.target_domain {
                Some(TargetDomain::Measurement) => {
                    outcome.measurements.push(create_measurement(
                        &subject,
                        date,
                        &raw_value,
                        entry,
                        type_concept_id,
                    )?);
                }
                Some(TargetDomain::Observation) => {
                    outcome.observations.push(create_observation(
                        &subject,
                        date,
                        &raw_value,
                        entry,
                        type_concept_id,
                    )?);
                }
                None => {
                    debug!(field = %entry.source_field, "mapping entry has no routable domain, skipping");
                }
            }
        }
    }
    Ok(outcome)
}

fn numeric_value(
    subject: &SubjectId,
    raw_value: &str,
    entry: &MappingEntry,
) -> Result<f64, TransformError> {
    match entry.data_type {
        SourceDataType::TimeDuration => parse_duration_seconds(raw_value)
            .map(|seconds| seconds as f64)
            .ok_or_else(|| TransformError::InvalidDuration {
                subject: subject.to_string(),
                field: entry.source_field.clone(),
                value: raw_value.to_string(),
            }),
        _ => raw_value
            .parse()
            .map_err(|_| TransformError::InvalidValue {
                subject: subject.to_string(),
                field: entry.source_field.clone(),
                value: raw_value.to_string(),
            }),
    }
}

fn create_measurement(
    subject: &SubjectId,
    date: Option<NaiveDate>,
    raw_value: &str,
    entry: &MappingEntry,
    type_concept_id: i64,
) -> Result<MeasurementRecord, TransformError> {
    let range = parse_value_range(entry.value_range.as_deref());
    let value_as_number = match entry.data_type {
        SourceDataType::Integer | SourceDataType::Decimal | SourceDataType::TimeDuration => {
            numeric_value(subject, raw_value, entry)?
        }
        _ => 0.0,
    };
    Ok(MeasurementRecord {
        person_id: subject.clone(),
        measurement_concept_id: entry.concept_id,
        measurement_date: date,
        measurement_datetime: date.map(at_midnight),
        measurement_time: date.map(|d| at_midnight(d).time()),
        measurement_type_concept_id: type_concept_id,
        value_as_number,
        range_low: range.low,
        range_high: range.high,
        measurement_source_value: entry.source_field.clone(),
        value_source_value: raw_value.to_string(),
        ..MeasurementRecord::default()
    })
}

fn create_observation(
    subject: &SubjectId,
    date: Option<NaiveDate>,
    raw_value: &str,
    entry: &MappingEntry,
    type_concept_id: i64,
) -> Result<ObservationRecord, TransformError> {
    let value_as_number = match entry.data_type {
        SourceDataType::Integer | SourceDataType::Decimal | SourceDataType::TimeDuration => {
            numeric_value(subject, raw_value, entry)?
        }
        _ => 0.0,
    };
    Ok(ObservationRecord {
        person_id: subject.clone(),
        observation_concept_id: entry.concept_id,
        observation_date: date,
        observation_datetime: date.map(at_midnight),
        observation_type_concept_id: type_concept_id,
        value_as_number,
        value_as_string: raw_value.to_string(),
        observation_source_value: entry.source_field.clone(),
        value_source_value: raw_value.to_string(),
        ..ObservationRecord::default()
    })
}

/// Narrow parser for the mapping table's `Value Range` column: blank or
/// anything that is not `low-high` means "no range known". The textual
/// inequality grammar of the laboratory resolver does not apply here.
fn parse_value_range(text: Option<&str>) -> Interval {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Interval::UNKNOWN;
    };
    if let Some((low, high)) = text.split_once('-') {
        if let (Ok(low), Ok(high)) = (low.trim().parse(), high.trim().parse()) {
            return Interval::new(low, high);
        }
    }
    Interval::UNKNOWN
}
