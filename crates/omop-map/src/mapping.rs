use omop_ingest::CsvTable;
use omop_model::{SourceDataType, TargetDomain};
use tracing::{debug, info};

use crate::error::MapError;

/// Ready-to-map flag column shared by both mapping tables.
const READY_COLUMN: &str = "Map to OMOP?";
const READY_VALUE: &str = "Yes";
const CONCEPT_ID_COLUMN: &str = "TARGET_CONCEPT_ID";

/// Source-field column of the laboratory mapping table.
pub const LAB_NAME_COLUMN: &str = "Name";
/// Source-field column of the cognitive-assessment mapping table.
pub const ASSESSMENT_FIELD_COLUMN: &str = "Assessment Fieldname";

const LAB_REQUIRED_COLUMNS: &[&str] = &[
    LAB_NAME_COLUMN,
    "Data Type",
    "Reference Interval",
    "Units",
    "TARGET_CONCEPT_ID",
    "TARGET_CONCEPT_NAME",
    "TARGET_DOMAIN_ID",
    "TARGET_VOCABULARY_ID",
    "TARGET_CONCEPT_CLASS_ID",
    "TARGET_CONCEPT_CODE",
];

const ASSESSMENT_REQUIRED_COLUMNS: &[&str] = &[
    ASSESSMENT_FIELD_COLUMN,
    "Data Type",
    "Value Range",
    "TARGET_CONCEPT_ID",
    "TARGET_CONCEPT_NAME",
    "TARGET_DOMAIN_ID",
];

/// One curated mapping row, kept only when flagged ready with a usable
/// target concept. Duplicates by source field are preserved; every entry
/// is attempted against every source column.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    /// Display name (labs) or file field name (assessments) to match
    /// against source columns.
    pub source_field: String,
    pub data_type: SourceDataType,
    pub concept_id: i64,
    pub concept_name: String,
    pub target_domain: Option<TargetDomain>,
    /// Free-text reference interval (laboratory table only).
    pub reference_interval: Option<String>,
    /// Source units text (laboratory table only).
    pub units: Option<String>,
    /// Narrow `low-high` value range (assessment table only).
    pub value_range: Option<String>,
}

/// Load the laboratory mapping table: rows flagged ready with a non-null
/// target concept id, coerced to integer.
pub fn load_lab_mappings(table: &CsvTable) -> Result<Vec<MappingEntry>, MapError> {
    require_columns(table, LAB_REQUIRED_COLUMNS)?;
    let mut entries = Vec::new();
    for row in 0..table.row_count() {
        let Some(concept_id) = ready_concept_id(table, row)? else {
            continue;
        };
        entries.push(MappingEntry {
            source_field: cell(table, row, LAB_NAME_COLUMN),
            data_type: SourceDataType::parse(&cell(table, row, "Data Type")),
            concept_id,
            concept_name: cell(table, row, "TARGET_CONCEPT_NAME"),
            target_domain: TargetDomain::parse(&cell(table, row, "TARGET_DOMAIN_ID")),
            reference_interval: optional(cell(table, row, "Reference Interval")),
            units: optional(cell(table, row, "Units")),
            value_range: None,
        });
    }
    info!(entry_count = entries.len(), "loaded laboratory mappings");
    for entry in &entries {
        debug!(
            source_field = %entry.source_field,
            concept_id = entry.concept_id,
            concept_name = %entry.concept_name,
            "lab mapping"
        );
    }
    Ok(entries)
}

/// Load the cognitive-assessment mapping table. Same filtering rules as
/// the laboratory variant; carries a value range instead of a reference
/// interval and no units.
pub fn load_assessment_mappings(table: &CsvTable) -> Result<Vec<MappingEntry>, MapError> {
    require_columns(table, ASSESSMENT_REQUIRED_COLUMNS)?;
    let mut entries = Vec::new();
    for row in 0..table.row_count() {
        let Some(concept_id) = ready_concept_id(table, row)? else {
            continue;
        };
        entries.push(MappingEntry {
            source_field: cell(table, row, ASSESSMENT_FIELD_COLUMN),
            data_type: SourceDataType::parse(&cell(table, row, "Data Type")),
            concept_id,
            concept_name: cell(table, row, "TARGET_CONCEPT_NAME"),
            target_domain: TargetDomain::parse(&cell(table, row, "TARGET_DOMAIN_ID")),
            reference_interval: None,
            units: None,
            value_range: optional(cell(table, row, "Value Range")),
        });
    }
    info!(entry_count = entries.len(), "loaded assessment mappings");
    Ok(entries)
}

fn require_columns(table: &CsvTable, columns: &[&str]) -> Result<(), MapError> {
    for column in columns.iter().chain([&READY_COLUMN]) {
        if !table.has_column(column) {
            return Err(MapError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Returns the coerced concept id for a ready-to-map row, `None` for rows
/// the filter excludes. A non-numeric id on a row that passed the filter
/// is fatal: the filter should have excluded it, so the export is
/// inconsistent.
fn ready_concept_id(table: &CsvTable, row: usize) -> Result<Option<i64>, MapError> {
    if table.cell(row, READY_COLUMN).unwrap_or("") != READY_VALUE {
        return Ok(None);
    }
    let raw = table.cell(row, CONCEPT_ID_COLUMN).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(None);
    }
    coerce_concept_id(raw)
        .ok_or_else(|| MapError::InvalidConceptId {
            row,
            value: raw.to_string(),
        })
        .map(Some)
}

/// Concept ids arrive as integers or float-formatted integers
/// ("3004501.0"), depending on how the curation spreadsheet was exported.
fn coerce_concept_id(raw: &str) -> Option<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }
    let value: f64 = raw.parse().ok()?;
    if value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

fn cell(table: &CsvTable, row: usize, column: &str) -> String {
    table.cell(row, column).unwrap_or("").to_string()
}

fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
