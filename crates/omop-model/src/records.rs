//! Destination-table record structs, field-for-field with OMOP CDM 5.4.
//!
//! Records are constructed by the normalizers with identifier 0 and only
//! receive a real identifier after passing the validity filter. Fields no
//! upstream mapping populates yet (provider, visit detail, event linkage)
//! stay at their zeroed defaults so the append writes complete rows.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::subject::SubjectId;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub measurement_id: i64,
    pub person_id: SubjectId,
    pub measurement_concept_id: i64,
    pub measurement_date: Option<NaiveDate>,
    pub measurement_datetime: Option<NaiveDateTime>,
    pub measurement_time: Option<NaiveTime>,
    pub measurement_type_concept_id: i64,
    pub operator_concept_id: i64,
    pub value_as_number: f64,
    pub value_as_concept_id: i64,
    pub unit_concept_id: i64,
    pub range_low: f64,
    pub range_high: f64,
    pub provider_id: i64,
    pub visit_occurrence_id: i64,
    pub visit_detail_id: i64,
    pub measurement_source_value: String,
    pub measurement_source_concept_id: i64,
    pub unit_source_value: String,
    pub unit_source_concept_id: i64,
    pub value_source_value: String,
    pub measurement_event_id: i64,
    pub meas_event_field_concept_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub observation_id: i64,
    pub person_id: SubjectId,
    pub observation_concept_id: i64,
    pub observation_date: Option<NaiveDate>,
    pub observation_datetime: Option<NaiveDateTime>,
    pub observation_type_concept_id: i64,
    pub value_as_number: f64,
    pub value_as_string: String,
    pub value_as_concept_id: i64,
    pub qualifier_concept_id: i64,
    pub unit_concept_id: i64,
    pub provider_id: i64,
    pub visit_occurrence_id: i64,
    pub visit_detail_id: i64,
    pub observation_source_value: String,
    pub observation_source_concept_id: i64,
    pub unit_source_value: String,
    pub qualifier_source_value: String,
    pub value_source_value: String,
    pub observation_event_id: i64,
    pub obs_event_field_concept_id: i64,
}
