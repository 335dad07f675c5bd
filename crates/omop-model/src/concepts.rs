//! Standard vocabulary concept identifiers used by every pipeline.
//!
//! The cognitive-assessment type concepts (automated vs. manually
//! transcribed) are deliberately not listed here: they are resolved at run
//! start from the mapping table itself (see `omop-transform`).

/// Measurement type: laboratory result.
pub const LAB_TYPE_CONCEPT_ID: i64 = 32856;

/// Operator concept: `=`.
pub const EQUALS_CONCEPT_ID: i64 = 4172703;

/// Operator concept: `<`.
pub const LESS_THAN_CONCEPT_ID: i64 = 4171756;
