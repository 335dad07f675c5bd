use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{table}: missing column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("{table} row {row}: {message}")]
    InvalidCell {
        table: String,
        row: usize,
        message: String,
    },
    #[error("store directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, StoreError>;
