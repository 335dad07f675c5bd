use thiserror::Error;

/// Mapping-table load failures. All of these abort the run: a malformed
/// mapping table means the curation export is bad and must be fixed, not
/// worked around row by row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("mapping table is missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("mapping row {row}: target concept id '{value}' is not an integer")]
    InvalidConceptId { row: usize, value: String },
}
