use std::fs;

use chrono::NaiveDate;
use omop_model::{MeasurementRecord, ObservationRecord, SubjectId};
use omop_store::{CsvStore, OmopStore, PersonRow, StoreError, VisitRow};

fn seed_snapshot(dir: &std::path::Path) {
    fs::write(
        dir.join("person.csv"),
        "person_id,gender_concept_id,year_of_birth\n1024,0,1960\n2048,0,1980\n",
    )
    .unwrap();
    fs::write(
        dir.join("visit_occurrence.csv"),
        "visit_occurrence_id,person_id,visit_concept_id,visit_start_date\n\
         501,1024,9202,2024-02-20\n\
         502,1024,9201,2024-01-02\n\
         503,2048,9202,2024-03-11\n",
    )
    .unwrap();
}

fn measurement(id: i64, person: i64) -> MeasurementRecord {
    MeasurementRecord {
        measurement_id: id,
        person_id: SubjectId::Numeric(person),
        measurement_concept_id: 3004501,
        measurement_date: NaiveDate::from_ymd_opt(2024, 2, 20),
        value_as_number: 92.5,
        ..MeasurementRecord::default()
    }
}

#[test]
fn reads_the_person_and_visit_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    seed_snapshot(dir.path());
    let store = CsvStore::open(dir.path()).unwrap();

    let persons = store.persons().unwrap();
    assert_eq!(
        persons,
        vec![
            PersonRow {
                person_id: 1024,
                year_of_birth: 1960
            },
            PersonRow {
                person_id: 2048,
                year_of_birth: 1980
            },
        ]
    );

    let visits = store.visits(9202).unwrap();
    assert_eq!(visits.len(), 2);
    assert_eq!(
        visits[0],
        VisitRow {
            person_id: 1024,
            visit_occurrence_id: 501,
            visit_concept_id: 9202,
            visit_start_date: NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
        }
    );
}

#[test]
fn absent_destination_tables_read_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    seed_snapshot(dir.path());
    let store = CsvStore::open(dir.path()).unwrap();

    assert_eq!(store.max_measurement_id().unwrap(), None);
    assert_eq!(store.max_observation_id().unwrap(), None);
    assert_eq!(store.measurement_count().unwrap(), 0);
}

#[test]
fn appends_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    seed_snapshot(dir.path());
    let mut store = CsvStore::open(dir.path()).unwrap();

    store
        .append_measurements(&[measurement(1, 1024), measurement(2, 2048)])
        .unwrap();
    store.append_measurements(&[measurement(3, 1024)]).unwrap();

    let reopened = CsvStore::open(dir.path()).unwrap();
    assert_eq!(reopened.measurement_count().unwrap(), 3);
    assert_eq!(reopened.max_measurement_id().unwrap(), Some(3));

    // One header row only, even across two appends.
    let contents = fs::read_to_string(dir.path().join("measurement.csv")).unwrap();
    assert_eq!(contents.matches("measurement_id").count(), 1);
}

#[test]
fn observations_append_independently() {
    let dir = tempfile::tempdir().unwrap();
    seed_snapshot(dir.path());
    let mut store = CsvStore::open(dir.path()).unwrap();

    let record = ObservationRecord {
        observation_id: 7,
        person_id: SubjectId::Numeric(2048),
        observation_concept_id: 4022103,
        value_as_string: "University".to_string(),
        ..ObservationRecord::default()
    };
    store.append_observations(&[record]).unwrap();
    assert_eq!(store.observation_count().unwrap(), 1);
    assert_eq!(store.max_observation_id().unwrap(), Some(7));
    assert_eq!(store.measurement_count().unwrap(), 0);
}

#[test]
fn missing_directory_is_an_error() {
    let err = CsvStore::open("/nonexistent/omop-tables").unwrap_err();
    assert!(matches!(err, StoreError::MissingDirectory(_)));
}
