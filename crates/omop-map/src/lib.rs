//! Curated mapping tables: source instrument fields to standard concepts.

pub mod error;
pub mod mapping;
pub mod normalize;

pub use error::MapError;
pub use mapping::{
    ASSESSMENT_FIELD_COLUMN, LAB_NAME_COLUMN, MappingEntry, load_assessment_mappings,
    load_lab_mappings,
};
pub use normalize::normalize_test_name;
