use std::collections::BTreeMap;

use chrono::NaiveDate;
use omop_ingest::CsvTable;
use omop_map::MappingEntry;
use omop_model::concepts::{EQUALS_CONCEPT_ID, LAB_TYPE_CONCEPT_ID, LESS_THAN_CONCEPT_ID};
use omop_model::{SourceDataType, SubjectId, TargetDomain};
use omop_transform::ranges::{NormalRangeTable, RangeTables};
use omop_transform::{AgeLookup, LabContext, TransformError, VisitLookup, process_lab_sheet};

fn table(headers: &[&str], rows: &[&[&str]]) -> CsvTable {
    CsvTable::new(
        headers.iter().map(|h| (*h).to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| (*c).to_string()).collect())
            .collect(),
    )
}

fn lab_entry(source_field: &str, concept_id: i64, interval: Option<&str>) -> MappingEntry {
    MappingEntry {
        source_field: source_field.to_string(),
        data_type: SourceDataType::Decimal,
        concept_id,
        concept_name: source_field.to_string(),
        target_domain: Some(TargetDomain::Measurement),
        reference_interval: interval.map(str::to_string),
        units: Some("mg/dL".to_string()),
        value_range: None,
    }
}

fn range_tables() -> RangeTables {
    let bands = table(
        &["Sex", "Age_Low", "Age_High", "Range_Low", "Range_High"],
        &[
            &["F", "18y", "75y", "0", "130"],
            &["M", "18y", "75y", "0", "85"],
        ],
    );
    RangeTables {
        nt_probnp: NormalRangeTable::from_table(&bands).expect("range table"),
        alkaline_phosphatase: NormalRangeTable::from_table(&bands).expect("range table"),
    }
}

fn ages() -> AgeLookup {
    AgeLookup::new(BTreeMap::from([(1024, 1960), (2048, 1980)]), 2026)
}

#[test]
fn normalizes_matched_columns_and_overrides_the_visit_date() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "Glucose (fasting)"],
        &[&["1024", "03/01/2024", "92.5"]],
    );
    let mappings = vec![lab_entry("Glucose", 3004501, Some("70-99"))];
    let visits = VisitLookup::from_rows([(
        1024,
        501,
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
    )]);
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &visits,
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("sheet normalizes");
    assert_eq!(outcome.rejected, 0);
    assert_eq!(outcome.records.len(), 1);

    let record = &outcome.records[0];
    assert_eq!(record.measurement_id, 0);
    assert_eq!(record.person_id, SubjectId::Numeric(1024));
    assert_eq!(record.measurement_concept_id, 3004501);
    assert_eq!(record.measurement_type_concept_id, LAB_TYPE_CONCEPT_ID);
    assert_eq!(record.operator_concept_id, EQUALS_CONCEPT_ID);
    assert_eq!(record.value_as_number, 92.5);
    assert_eq!(record.range_low, 70.0);
    assert_eq!(record.range_high, 99.0);
    assert_eq!(record.unit_source_value, "mg/dL");
    assert_eq!(record.measurement_source_value, "Glucose (fasting)");
    assert_eq!(record.value_source_value, "92.5");
    // The earliest visit wins over the sheet's collection date.
    assert_eq!(record.visit_occurrence_id, 501);
    assert_eq!(record.measurement_date, NaiveDate::from_ymd_opt(2024, 2, 20));
}

#[test]
fn keeps_the_collection_date_without_a_visit() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "Glucose"],
        &[&["2048", "03/01/2024", "88"]],
    );
    let mappings = vec![lab_entry("Glucose", 3004501, Some("70-99"))];
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("sheet normalizes");
    let record = &outcome.records[0];
    assert_eq!(record.visit_occurrence_id, 0);
    assert_eq!(record.measurement_date, NaiveDate::from_ymd_opt(2024, 3, 1));
}

#[test]
fn below_detection_limit_values_set_the_less_than_operator() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "Troponin-T"],
        &[&["1024", "03/01/2024", "< 2"]],
    );
    let mappings = vec![lab_entry(
        "Troponin-T",
        3033745,
        Some("Female: <11; Male <16"),
    )];
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("sheet normalizes");
    let record = &outcome.records[0];
    assert_eq!(record.operator_concept_id, LESS_THAN_CONCEPT_ID);
    assert_eq!(record.value_as_number, 2.0);
    assert_eq!(record.value_source_value, "< 2");
    assert_eq!(record.range_high, 16.0);
}

#[test]
fn panels_not_drawn_for_a_subject_are_skipped() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "Glucose", "Cholesterol"],
        &[&["1024", "03/01/2024", "92.5", ""]],
    );
    let mappings = vec![
        lab_entry("Glucose", 3004501, Some("70-99")),
        lab_entry("Cholesterol", 3027114, Some("125-200")),
    ];
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("blank cells are not fatal");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.rejected, 0);
    assert_eq!(outcome.records[0].measurement_source_value, "Glucose");
}

#[test]
fn upper_bound_intervals_pair_with_detection_limit_values() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "CRP"],
        &[&["1024", "03/01/2024", "<2"]],
    );
    let mappings = vec![lab_entry("CRP", 3020460, Some("<=5"))];
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("sheet normalizes");
    let record = &outcome.records[0];
    assert_eq!(record.operator_concept_id, LESS_THAN_CONCEPT_ID);
    assert_eq!(record.value_as_number, 2.0);
    assert_eq!(record.range_low, 0.0);
    assert_eq!(record.range_high, 5.0);
}

#[test]
fn unknown_subjects_are_counted_not_fatal() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "Glucose"],
        &[
            &["9999", "03/01/2024", "90"],
            &["1024", "03/01/2024", "91"],
        ],
    );
    let mappings = vec![lab_entry("Glucose", 3004501, Some("70-99"))];
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("sheet normalizes");
    assert_eq!(outcome.rejected, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].person_id, SubjectId::Numeric(1024));
}

#[test]
fn unresolvable_lookup_ranges_reject_the_record() {
    // Subject 1024 is 66; the test bands stop at 75, so NT-proBNP resolves.
    // Shrink the bands instead by aging the subject out.
    let sheet = table(
        &["Participant ID", "Date of Collection", "NT-proBNP"],
        &[&["1024", "03/01/2024", "125"]],
    );
    let mappings = vec![lab_entry("NT-proBNP", 3029187, Some("see table"))];
    let old = AgeLookup::new(BTreeMap::from([(1024, 1940)]), 2026);
    let ctx = LabContext {
        mappings: &mappings,
        ages: &old,
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("sheet normalizes");
    assert_eq!(outcome.rejected, 1);
    assert!(outcome.records.is_empty());
}

#[test]
fn blank_subject_rows_are_spreadsheet_leftovers() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "Glucose"],
        &[&["", "", ""], &["1024", "03/01/2024", "90"]],
    );
    let mappings = vec![lab_entry("Glucose", 3004501, Some("70-99"))];
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let outcome = process_lab_sheet(&sheet, &ctx).expect("sheet normalizes");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.rejected, 0);
}

#[test]
fn malformed_collection_dates_abort_the_run() {
    let sheet = table(
        &["Participant ID", "Date of Collection", "Glucose"],
        &[&["1024", "2024-03-01", "90"]],
    );
    let mappings = vec![lab_entry("Glucose", 3004501, Some("70-99"))];
    let ctx = LabContext {
        mappings: &mappings,
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let err = process_lab_sheet(&sheet, &ctx).expect_err("strict date format");
    assert!(matches!(err, TransformError::InvalidCollectionDate { .. }));
}

#[test]
fn missing_key_columns_abort_the_run() {
    let sheet = table(&["Subject", "Glucose"], &[&["1024", "90"]]);
    let ctx = LabContext {
        mappings: &[],
        ages: &ages(),
        visits: &VisitLookup::default(),
        range_tables: &range_tables(),
    };

    let err = process_lab_sheet(&sheet, &ctx).expect_err("missing columns");
    assert!(matches!(err, TransformError::MissingSourceColumn { .. }));
}
