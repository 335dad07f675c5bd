//! Normalization of raw instrument rows into destination-table records.
//!
//! Two variants share this crate: the laboratory normalizer (workbook
//! sheets, sex-banded reference ranges, visit-date canonicalization) and
//! the cognitive-assessment normalizer (delimited exports, per-field
//! domain dispatch, duration parsing). Both emit provisional records that
//! still need the validity filter and an identifier.

pub mod assessment;
pub mod context;
pub mod datetime;
pub mod error;
pub mod filter;
pub mod labs;
pub mod ranges;

pub use assessment::{AssessmentOutcome, process_assessment_table};
pub use context::{
    AgeLookup, AssessmentContext, AssessmentDates, LabContext, TypeConcepts, VisitInfo,
    VisitLookup,
};
pub use error::{RejectReason, TransformError};
pub use filter::ValidityFilter;
pub use labs::{LAB_SHEETS, SheetOutcome, process_lab_sheet};
pub use ranges::{NormalRangeTable, RangeTables, Sex};
