//! CSV-backed destination store: one CDM-shaped file per table in a
//! single directory.

use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use omop_model::{MeasurementRecord, ObservationRecord};
use serde::Serialize;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::store::{OmopStore, PersonRow, VisitRow};

pub const PERSON_TABLE: &str = "person.csv";
pub const VISIT_TABLE: &str = "visit_occurrence.csv";
pub const MEASUREMENT_TABLE: &str = "measurement.csv";
pub const OBSERVATION_TABLE: &str = "observation.csv";

/// A directory of destination tables. Appends go straight to the end of
/// the table file; there is no transaction layer, matching the
/// single-writer batch contract of [`OmopStore`].
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(StoreError::MissingDirectory(dir));
        }
        Ok(Self { dir })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(table)
    }

    fn max_id(&self, table: &str, id_column: &str) -> Result<Option<i64>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = ReaderBuilder::new().from_path(&path)?;
        let column = require_column(table, reader.headers()?, id_column)?;
        let mut max = None;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let id = parse_cell::<i64>(table, row, record.get(column).unwrap_or(""))?;
            max = Some(max.map_or(id, |current: i64| current.max(id)));
        }
        Ok(max)
    }

    fn row_count(&self, table: &str) -> Result<u64> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(0);
        }
        let mut reader = ReaderBuilder::new().from_path(&path)?;
        let mut count = 0;
        for record in reader.records() {
            record?;
            count += 1;
        }
        Ok(count)
    }

    fn append<T: Serialize>(&self, table: &str, records: &[T]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let path = self.table_path(table);
        let write_header = !path.exists() || std::fs::metadata(&path)?.len() == 0;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        info!(table, appended = records.len(), "appended records");
        Ok(())
    }
}

impl OmopStore for CsvStore {
    fn persons(&self) -> Result<Vec<PersonRow>> {
        let table = PERSON_TABLE;
        let mut reader = ReaderBuilder::new().from_path(self.table_path(table))?;
        let headers = reader.headers()?.clone();
        let id = require_column(table, &headers, "person_id")?;
        let birth_year = require_column(table, &headers, "year_of_birth")?;
        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            rows.push(PersonRow {
                person_id: parse_cell(table, row, record.get(id).unwrap_or(""))?,
                year_of_birth: parse_cell(table, row, record.get(birth_year).unwrap_or(""))?,
            });
        }
        Ok(rows)
    }

    fn visits(&self, visit_concept_id: i64) -> Result<Vec<VisitRow>> {
        let table = VISIT_TABLE;
        let mut reader = ReaderBuilder::new().from_path(self.table_path(table))?;
        let headers = reader.headers()?.clone();
        let person = require_column(table, &headers, "person_id")?;
        let visit = require_column(table, &headers, "visit_occurrence_id")?;
        let concept = require_column(table, &headers, "visit_concept_id")?;
        let start = require_column(table, &headers, "visit_start_date")?;
        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let row_concept: i64 = parse_cell(table, row, record.get(concept).unwrap_or(""))?;
            if row_concept != visit_concept_id {
                continue;
            }
            rows.push(VisitRow {
                person_id: parse_cell(table, row, record.get(person).unwrap_or(""))?,
                visit_occurrence_id: parse_cell(table, row, record.get(visit).unwrap_or(""))?,
                visit_concept_id: row_concept,
                visit_start_date: parse_date(table, row, record.get(start).unwrap_or(""))?,
            });
        }
        Ok(rows)
    }

    fn max_measurement_id(&self) -> Result<Option<i64>> {
        self.max_id(MEASUREMENT_TABLE, "measurement_id")
    }

    fn max_observation_id(&self) -> Result<Option<i64>> {
        self.max_id(OBSERVATION_TABLE, "observation_id")
    }

    fn append_measurements(&mut self, records: &[MeasurementRecord]) -> Result<()> {
        self.append(MEASUREMENT_TABLE, records)
    }

    fn append_observations(&mut self, records: &[ObservationRecord]) -> Result<()> {
        self.append(OBSERVATION_TABLE, records)
    }

    fn measurement_count(&self) -> Result<u64> {
        self.row_count(MEASUREMENT_TABLE)
    }

    fn observation_count(&self) -> Result<u64> {
        self.row_count(OBSERVATION_TABLE)
    }
}

fn require_column(table: &str, headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| StoreError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
}

fn parse_cell<T: std::str::FromStr>(table: &str, row: usize, cell: &str) -> Result<T> {
    cell.trim()
        .parse()
        .map_err(|_| StoreError::InvalidCell {
            table: table.to_string(),
            row,
            message: format!("unparseable value '{}'", cell.trim()),
        })
}

fn parse_date(table: &str, row: usize, cell: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), "%Y-%m-%d").map_err(|_| StoreError::InvalidCell {
        table: table.to_string(),
        row,
        message: format!("unparseable date '{}'", cell.trim()),
    })
}
