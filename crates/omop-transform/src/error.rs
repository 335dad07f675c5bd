use thiserror::Error;

/// Fatal normalization errors. Any of these aborts the whole run: they
/// mean a data-format assumption no longer holds and someone has to look
/// at the source files, not that one record was bad.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("source table is missing column '{column}'")]
    MissingSourceColumn { column: String },
    #[error("subject {subject}: value '{value}' in '{field}' is not numeric")]
    InvalidValue {
        subject: String,
        field: String,
        value: String,
    },
    #[error("subject {subject}: collection date '{value}' is not month/day/year")]
    InvalidCollectionDate { subject: String, value: String },
    #[error("subject {subject}: duration '{value}' in '{field}' does not match '<N> min(s) <N> sec(s)'")]
    InvalidDuration {
        subject: String,
        field: String,
        value: String,
    },
    #[error("normal-range table row {row}: {message}")]
    InvalidRangeRow { row: usize, message: String },
    #[error("type concept row '{source_field}' not found in the mapping table")]
    MissingTypeConcept { source_field: String },
}

/// Why a single record was dropped while the run continued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The subject has no birth year in the reference population.
    NoAgeOnFile,
    /// A sex-banded reference range could not be resolved for the
    /// subject's age.
    RangeResolutionFailed,
}
