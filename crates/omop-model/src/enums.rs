use serde::{Deserialize, Serialize};

use crate::concepts::{EQUALS_CONCEPT_ID, LESS_THAN_CONCEPT_ID};

/// Destination table for a mapped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetDomain {
    Measurement,
    Observation,
}

impl TargetDomain {
    /// Parse a `TARGET_DOMAIN_ID` cell. Domains other than the two
    /// destination tables yield `None`; their rows are never materialized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Measurement" => Some(Self::Measurement),
            "Observation" => Some(Self::Observation),
            _ => None,
        }
    }
}

/// Expected shape of a source value, as declared in the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceDataType {
    Integer,
    Decimal,
    Text,
    Date,
    TimeDuration,
}

impl SourceDataType {
    /// Lenient parse of the free-text `Data Type` column. Unrecognized
    /// declarations degrade to `Text`, which never triggers numeric or
    /// duration coercion.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "integer" | "int" => Self::Integer,
            "decimal" | "float" | "numeric" => Self::Decimal,
            "date" => Self::Date,
            "time duration" | "timeduration" | "duration" => Self::TimeDuration,
            _ => Self::Text,
        }
    }
}

/// Comparison operator attached to a measurement value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Equals,
    LessThan,
}

impl Operator {
    pub fn concept_id(self) -> i64 {
        match self {
            Self::Equals => EQUALS_CONCEPT_ID,
            Self::LessThan => LESS_THAN_CONCEPT_ID,
        }
    }
}
