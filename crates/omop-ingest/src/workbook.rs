use std::path::Path;

use calamine::{Data, Reader, Xlsx, XlsxError, open_workbook};

use crate::csv_table::{CsvTable, normalize_cell};
use crate::error::{IngestError, Result};

/// Read one named sheet of an xlsx workbook into a [`CsvTable`].
///
/// `skip_rows` leading rows are discarded before the header row; the lab
/// workbook carries banner rows above some sheets' headers. Cells are
/// rendered as text the same way the delimited readers see them: dates in
/// `month/day/year`, integral floats without a trailing `.0`.
pub fn read_sheet(path: &Path, sheet: &str, skip_rows: usize) -> Result<CsvTable> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|error: XlsxError| IngestError::Workbook {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(IngestError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|error| IngestError::Workbook {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    let mut rows = range.rows().skip(skip_rows);
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };
    let mut data = Vec::new();
    for row in rows {
        let mut cells = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            cells.push(row.get(idx).map_or(String::new(), cell_to_string));
        }
        if cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        data.push(cells);
    }
    Ok(CsvTable::new(headers, data))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => normalize_cell(text),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => {
            // Excel renders integral identifiers as floats; keep them
            // looking like the integers they are.
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.format("%m/%d/%Y").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(text) | Data::DurationIso(text) => normalize_cell(text),
        Data::Error(error) => format!("{error:?}"),
    }
}
