use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// An in-memory table of trimmed string cells with named columns.
///
/// Sources are small (hundreds of subjects), so whole-table reads are fine
/// and keep the normalizers free of reader plumbing.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell by row index and column name. `None` when the column does not
    /// exist; a short row reads as empty cells.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        Some(
            self.rows
                .get(row)
                .and_then(|cells| cells.get(col))
                .map_or("", String::as_str),
        )
    }

    /// Append another table's rows; the headers must match exactly.
    /// Used to union per-site exports of the same instrument.
    pub fn union(&mut self, other: CsvTable) -> Result<()> {
        if self.headers.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.headers != other.headers {
            return Err(IngestError::HeaderMismatch {
                left: self.headers.clone(),
                right: other.headers,
            });
        }
        self.rows.extend(other.rows);
        Ok(())
    }
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a delimited text file into a [`CsvTable`].
///
/// The first record is the header row; fully blank records are dropped and
/// short records are padded so every row has one cell per header.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if headers.is_empty() {
            headers = record.iter().map(normalize_cell).collect();
            continue;
        }
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(normalize_cell(record.get(idx).unwrap_or("")));
        }
        rows.push(row);
    }
    Ok(CsvTable { headers, rows })
}
