//! Reading tabular source data: delimited text files and workbook sheets.
//!
//! Everything is surfaced as a [`CsvTable`] of trimmed string cells; type
//! coercion is the normalizers' job, not the reader's.

pub mod csv_table;
pub mod error;
pub mod sources;
pub mod workbook;

pub use csv_table::{CsvTable, read_csv_table};
pub use error::IngestError;
pub use sources::resolve_source_paths;
pub use workbook::read_sheet;
