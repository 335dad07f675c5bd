//! In-memory store for dry runs and tests.

use omop_model::{MeasurementRecord, ObservationRecord};

use crate::error::Result;
use crate::store::{OmopStore, PersonRow, VisitRow};

/// Holds the destination tables as plain vectors. A dry run appends here
/// instead of the real store so counts and diagnostics still line up.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub persons: Vec<PersonRow>,
    pub visits: Vec<VisitRow>,
    pub measurements: Vec<MeasurementRecord>,
    pub observations: Vec<ObservationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the snapshot tables read during pipeline setup.
    pub fn with_snapshot(persons: Vec<PersonRow>, visits: Vec<VisitRow>) -> Self {
        Self {
            persons,
            visits,
            ..Self::default()
        }
    }
}

impl OmopStore for MemoryStore {
    fn persons(&self) -> Result<Vec<PersonRow>> {
        Ok(self.persons.clone())
    }

    fn visits(&self, visit_concept_id: i64) -> Result<Vec<VisitRow>> {
        Ok(self
            .visits
            .iter()
            .filter(|visit| visit.visit_concept_id == visit_concept_id)
            .copied()
            .collect())
    }

    fn max_measurement_id(&self) -> Result<Option<i64>> {
        Ok(self
            .measurements
            .iter()
            .map(|record| record.measurement_id)
            .max())
    }

    fn max_observation_id(&self) -> Result<Option<i64>> {
        Ok(self
            .observations
            .iter()
            .map(|record| record.observation_id)
            .max())
    }

    fn append_measurements(&mut self, records: &[MeasurementRecord]) -> Result<()> {
        self.measurements.extend_from_slice(records);
        Ok(())
    }

    fn append_observations(&mut self, records: &[ObservationRecord]) -> Result<()> {
        self.observations.extend_from_slice(records);
        Ok(())
    }

    fn measurement_count(&self) -> Result<u64> {
        Ok(self.measurements.len() as u64)
    }

    fn observation_count(&self) -> Result<u64> {
        Ok(self.observations.len() as u64)
    }
}
