//! Pipeline orchestrators with explicit stages.
//!
//! Both pipelines run the same shape: load the mapping and reference
//! tables, snapshot the destination store (ages, visits, known subjects,
//! maximum identifiers), normalize every source row, drop records that
//! fail the validity filter, allocate identifiers, and append the batch.
//! Allocation runs after filtering so rejected records never consume an
//! identifier.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::Datelike;
use omop_ingest::{CsvTable, read_csv_table, read_sheet, resolve_source_paths};
use omop_map::{MappingEntry, load_assessment_mappings, load_lab_mappings};
use omop_model::{IdTracker, MeasurementRecord, ObservationRecord};
use omop_store::OmopStore;
use omop_transform::{
    AgeLookup, AssessmentContext, AssessmentDates, LAB_SHEETS, LabContext, NormalRangeTable,
    RangeTables, TypeConcepts, ValidityFilter, VisitLookup, process_assessment_table,
    process_lab_sheet,
};
use tracing::{info, info_span, warn};

use crate::config::{AssessmentConfig, LabsConfig};

/// Aggregate counts of one laboratory run.
#[derive(Debug, Default)]
pub struct LabsReport {
    pub sources: usize,
    pub sheets: usize,
    pub normalized: usize,
    pub rejected: usize,
    pub filtered_out: usize,
    pub appended: usize,
    /// Row-count check after the append; `None` on a diagnostic-only run.
    pub verified: Option<bool>,
    pub elapsed_ms: u128,
}

/// Aggregate counts of one cognitive-assessment run.
#[derive(Debug, Default)]
pub struct AssessmentReport {
    pub sources: usize,
    pub measurements: usize,
    pub observations: usize,
    pub skipped: usize,
    pub missing_date: usize,
    pub filtered_out: usize,
    pub appended_measurements: usize,
    pub appended_observations: usize,
    pub elapsed_ms: u128,
}

/// Run the laboratory pipeline from its configuration.
pub fn run_labs<S: OmopStore>(config: &LabsConfig, store: &mut S) -> Result<LabsReport> {
    let span = info_span!("labs_run");
    let _guard = span.enter();

    let mapping_table = read_csv_table(&config.mapping_file)
        .with_context(|| format!("read mapping table {}", config.mapping_file.display()))?;
    let mappings = load_lab_mappings(&mapping_table).context("load laboratory mappings")?;

    let range_tables = RangeTables {
        nt_probnp: load_range_sheet(config, &config.nt_probnp_sheet)?,
        alkaline_phosphatase: load_range_sheet(config, &config.alkaline_phosphatase_sheet)?,
    };

    let paths = resolve_source_paths(&config.source_files);
    if paths.is_empty() {
        bail!("no source workbooks found in '{}'", config.source_files);
    }
    let mut sheets = Vec::new();
    for path in &paths {
        for (sheet, skip_rows) in LAB_SHEETS {
            let table = read_sheet(path, sheet, *skip_rows)
                .with_context(|| format!("read sheet '{sheet}' of {}", path.display()))?;
            sheets.push(table);
        }
    }

    let mut report = run_labs_on_sheets(
        &sheets,
        &mappings,
        &range_tables,
        config.visit_concept_id,
        config.write,
        store,
    )?;
    report.sources = paths.len();
    Ok(report)
}

/// Laboratory pipeline over already-read sheets. Split out so tests can
/// drive it without writing workbook files.
pub fn run_labs_on_sheets<S: OmopStore>(
    sheets: &[CsvTable],
    mappings: &[MappingEntry],
    range_tables: &RangeTables,
    visit_concept_id: i64,
    write: bool,
    store: &mut S,
) -> Result<LabsReport> {
    let started = Instant::now();
    let (ages, filter) = population_snapshot(store)?;
    let visits = visit_snapshot(store, visit_concept_id)?;
    let ctx = LabContext {
        mappings,
        ages: &ages,
        visits: &visits,
        range_tables,
    };

    let mut report = LabsReport {
        sheets: sheets.len(),
        ..LabsReport::default()
    };
    let mut records = Vec::new();
    for sheet in sheets {
        let outcome = process_lab_sheet(sheet, &ctx).context("normalize laboratory sheet")?;
        report.normalized += outcome.records.len();
        report.rejected += outcome.rejected;
        records.extend(outcome.records);
    }

    let (mut kept, dropped) = filter.retain_measurements(records);
    report.filtered_out = dropped;

    let mut tracker = IdTracker::new(store.max_measurement_id().context("seed allocator")?);
    assign_measurement_ids(&mut kept, &mut tracker);

    if write {
        let before = store.measurement_count().context("count before append")?;
        store
            .append_measurements(&kept)
            .context("append measurements")?;
        let after = store.measurement_count().context("count after append")?;
        let verified = after == before + kept.len() as u64;
        if !verified {
            warn!(before, after, appended = kept.len(), "append count mismatch");
        }
        report.appended = kept.len();
        report.verified = Some(verified);
    } else {
        info!(ready = kept.len(), "diagnostic run, nothing appended");
    }

    report.elapsed_ms = started.elapsed().as_millis();
    info!(
        normalized = report.normalized,
        rejected = report.rejected,
        filtered_out = report.filtered_out,
        appended = report.appended,
        duration_ms = report.elapsed_ms as u64,
        "laboratory run finished"
    );
    Ok(report)
}

/// Run the cognitive-assessment pipeline from its configuration.
pub fn run_assessment<S: OmopStore>(
    config: &AssessmentConfig,
    store: &mut S,
) -> Result<AssessmentReport> {
    let span = info_span!("assessment_run");
    let _guard = span.enter();

    let mapping_table = read_csv_table(&config.mapping_file)
        .with_context(|| format!("read mapping table {}", config.mapping_file.display()))?;
    let mappings = load_assessment_mappings(&mapping_table).context("load assessment mappings")?;

    let dates_table = read_csv_table(&config.dates_file)
        .with_context(|| format!("read assessment dates {}", config.dates_file.display()))?;
    let dates = AssessmentDates::from_table(
        &dates_table,
        &config.dates_key_column,
        &config.dates_date_column,
    )
    .context("load assessment dates")?;

    let paths = resolve_source_paths(&config.source_files);
    if paths.is_empty() {
        bail!("no source exports found in '{}'", config.source_files);
    }
    let mut tables = Vec::new();
    for path in &paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = read_csv_table(path)
            .with_context(|| format!("read export {}", path.display()))?;
        tables.push((name, table));
    }

    let mut report = run_assessment_on_tables(&tables, &mappings, &dates, config.write, store)?;
    report.sources = paths.len();
    Ok(report)
}

/// Assessment pipeline over already-read exports, keyed by file name so
/// the paper marker still applies.
pub fn run_assessment_on_tables<S: OmopStore>(
    tables: &[(String, CsvTable)],
    mappings: &[MappingEntry],
    dates: &AssessmentDates,
    write: bool,
    store: &mut S,
) -> Result<AssessmentReport> {
    let started = Instant::now();
    let type_concepts = TypeConcepts::resolve(mappings).context("resolve type concepts")?;
    let (_, filter) = population_snapshot(store)?;
    let ctx = AssessmentContext {
        mappings,
        dates,
        type_concepts,
    };

    let mut report = AssessmentReport::default();
    let mut measurements = Vec::new();
    let mut observations = Vec::new();
    for (name, table) in tables {
        let outcome = process_assessment_table(table, name, &ctx)
            .with_context(|| format!("normalize export '{name}'"))?;
        report.skipped += outcome.skipped;
        report.missing_date += outcome.missing_date;
        measurements.extend(outcome.measurements);
        observations.extend(outcome.observations);
    }
    report.measurements = measurements.len();
    report.observations = observations.len();

    let (mut kept_measurements, dropped_m) = filter.retain_measurements(measurements);
    let (mut kept_observations, dropped_o) = filter.retain_observations(observations);
    report.filtered_out = dropped_m + dropped_o;

    let mut measurement_ids =
        IdTracker::new(store.max_measurement_id().context("seed measurement allocator")?);
    assign_measurement_ids(&mut kept_measurements, &mut measurement_ids);
    let mut observation_ids =
        IdTracker::new(store.max_observation_id().context("seed observation allocator")?);
    assign_observation_ids(&mut kept_observations, &mut observation_ids);

    if write {
        // Two independent appends; a failure between them leaves the
        // measurement rows in place.
        store
            .append_measurements(&kept_measurements)
            .context("append measurements")?;
        store
            .append_observations(&kept_observations)
            .context("append observations")?;
        report.appended_measurements = kept_measurements.len();
        report.appended_observations = kept_observations.len();
    } else {
        info!(
            measurements = kept_measurements.len(),
            observations = kept_observations.len(),
            "diagnostic run, nothing appended"
        );
    }

    report.elapsed_ms = started.elapsed().as_millis();
    info!(
        measurements = report.measurements,
        observations = report.observations,
        skipped = report.skipped,
        missing_date = report.missing_date,
        filtered_out = report.filtered_out,
        duration_ms = report.elapsed_ms as u64,
        "assessment run finished"
    );
    Ok(report)
}

fn load_range_sheet(config: &LabsConfig, sheet: &str) -> Result<NormalRangeTable> {
    let table = read_sheet(&config.data_dictionary_file, sheet, 0).with_context(|| {
        format!(
            "read range sheet '{sheet}' of {}",
            config.data_dictionary_file.display()
        )
    })?;
    NormalRangeTable::from_table(&table)
        .with_context(|| format!("load range sheet '{sheet}'"))
}

/// Age lookup and validity filter from one pass over the person table.
fn population_snapshot<S: OmopStore>(store: &S) -> Result<(AgeLookup, ValidityFilter)> {
    let persons = store.persons().context("read person table")?;
    let mut birth_years = BTreeMap::new();
    let mut subjects = BTreeSet::new();
    for person in &persons {
        birth_years.insert(person.person_id, person.year_of_birth);
        subjects.insert(person.person_id);
    }
    let current_year = chrono::Local::now().year();
    info!(subjects = subjects.len(), current_year, "population snapshot");
    Ok((
        AgeLookup::new(birth_years, current_year),
        ValidityFilter::new(subjects),
    ))
}

fn visit_snapshot<S: OmopStore>(store: &S, visit_concept_id: i64) -> Result<VisitLookup> {
    let visits = store.visits(visit_concept_id).context("read visit table")?;
    info!(visits = visits.len(), visit_concept_id, "visit snapshot");
    Ok(VisitLookup::from_rows(visits.into_iter().map(|visit| {
        (
            visit.person_id,
            visit.visit_occurrence_id,
            visit.visit_start_date,
        )
    })))
}

fn assign_measurement_ids(records: &mut [MeasurementRecord], tracker: &mut IdTracker) {
    for record in records {
        record.measurement_id = tracker.next_id();
    }
}

fn assign_observation_ids(records: &mut [ObservationRecord], tracker: &mut IdTracker) {
    for record in records {
        record.observation_id = tracker.next_id();
    }
}
