//! Membership filter against the reference population.

use std::collections::BTreeSet;

use omop_model::{MeasurementRecord, ObservationRecord, SubjectId};
use tracing::warn;

/// Drops records whose subject is not in the destination store's person
/// table. Text identifiers never pass: only subjects already registered
/// under a numeric study identifier can receive clinical records.
#[derive(Debug, Clone, Default)]
pub struct ValidityFilter {
    known_subjects: BTreeSet<i64>,
}

impl ValidityFilter {
    pub fn new(known_subjects: BTreeSet<i64>) -> Self {
        Self { known_subjects }
    }

    pub fn accepts(&self, subject: &SubjectId) -> bool {
        subject
            .as_numeric()
            .is_some_and(|id| self.known_subjects.contains(&id))
    }

    /// Keep only measurements with a registered subject; returns the kept
    /// records and the number dropped.
    pub fn retain_measurements(
        &self,
        records: Vec<MeasurementRecord>,
    ) -> (Vec<MeasurementRecord>, usize) {
        let before = records.len();
        let kept: Vec<_> = records
            .into_iter()
            .filter(|record| {
                let ok = self.accepts(&record.person_id);
                if !ok {
                    warn!(subject = %record.person_id, "subject not in the reference population, dropping measurement");
                }
                ok
            })
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    /// Keep only observations with a registered subject; returns the kept
    /// records and the number dropped.
    pub fn retain_observations(
        &self,
        records: Vec<ObservationRecord>,
    ) -> (Vec<ObservationRecord>, usize) {
        let before = records.len();
        let kept: Vec<_> = records
            .into_iter()
            .filter(|record| {
                let ok = self.accepts(&record.person_id);
                if !ok {
                    warn!(subject = %record.person_id, "subject not in the reference population, dropping observation");
                }
                ok
            })
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }
}
