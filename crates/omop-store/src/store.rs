use chrono::NaiveDate;
use omop_model::{MeasurementRecord, ObservationRecord};

use crate::error::Result;

/// One row of the person table, reduced to what the pipelines use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonRow {
    pub person_id: i64,
    pub year_of_birth: i32,
}

/// One row of the visit-occurrence table, reduced to what the pipelines
/// use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitRow {
    pub person_id: i64,
    pub visit_occurrence_id: i64,
    pub visit_concept_id: i64,
    pub visit_start_date: NaiveDate,
}

/// Everything a pipeline run needs from the destination store.
///
/// Reads happen once during setup; appends happen once at the end of a
/// run. Implementations are single-writer and need not be thread-safe.
pub trait OmopStore {
    /// All registered subjects with their birth years.
    fn persons(&self) -> Result<Vec<PersonRow>>;

    /// All visits with the given visit concept, any subject.
    fn visits(&self, visit_concept_id: i64) -> Result<Vec<VisitRow>>;

    /// Current maximum measurement identifier, `None` when the table is
    /// empty or absent.
    fn max_measurement_id(&self) -> Result<Option<i64>>;

    /// Current maximum observation identifier, `None` when the table is
    /// empty or absent.
    fn max_observation_id(&self) -> Result<Option<i64>>;

    fn append_measurements(&mut self, records: &[MeasurementRecord]) -> Result<()>;

    fn append_observations(&mut self, records: &[ObservationRecord]) -> Result<()>;

    /// Row count of the measurement table, used to verify an append.
    fn measurement_count(&self) -> Result<u64>;

    /// Row count of the observation table, used to verify an append.
    fn observation_count(&self) -> Result<u64>;
}
