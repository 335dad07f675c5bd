//! Run configuration, one JSON file per pipeline.
//!
//! These mirror the operator-edited parameter files the pipelines have
//! always run from: where the destination tables live, where the mapping
//! and reference tables are, which source files to pick up, and whether
//! the run actually writes or just reports.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Visit concept for in-person study visits, the default qualifying
/// concept for collection-date canonicalization.
const DEFAULT_VISIT_CONCEPT_ID: i64 = 9202;

/// Laboratory pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LabsConfig {
    /// Directory holding the destination tables.
    pub store_dir: PathBuf,
    /// Semicolon-separated list of source workbook paths.
    pub source_files: String,
    /// Vocabulary mapping table (CSV).
    pub mapping_file: PathBuf,
    /// Data-dictionary workbook carrying the range sheets.
    pub data_dictionary_file: PathBuf,
    #[serde(default = "default_nt_probnp_sheet")]
    pub nt_probnp_sheet: String,
    #[serde(default = "default_alkaline_phosphatase_sheet")]
    pub alkaline_phosphatase_sheet: String,
    #[serde(default = "default_visit_concept_id")]
    pub visit_concept_id: i64,
    /// When false the run is diagnostic-only and nothing is appended.
    #[serde(default = "default_write")]
    pub write: bool,
}

/// Cognitive-assessment pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentConfig {
    /// Directory holding the destination tables.
    pub store_dir: PathBuf,
    /// Semicolon-separated list of source export paths.
    pub source_files: String,
    /// Vocabulary mapping table (CSV).
    pub mapping_file: PathBuf,
    /// Subject-keyed physical-assessment date dataset (CSV).
    pub dates_file: PathBuf,
    #[serde(default = "default_dates_key_column")]
    pub dates_key_column: String,
    #[serde(default = "default_dates_date_column")]
    pub dates_date_column: String,
    /// When false the run is diagnostic-only and nothing is appended.
    #[serde(default = "default_write")]
    pub write: bool,
}

impl LabsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        info!(
            store_dir = %config.store_dir.display(),
            source_files = %config.source_files,
            mapping_file = %config.mapping_file.display(),
            data_dictionary = %config.data_dictionary_file.display(),
            visit_concept_id = config.visit_concept_id,
            write = config.write,
            "loaded labs configuration"
        );
        Ok(config)
    }
}

impl AssessmentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        info!(
            store_dir = %config.store_dir.display(),
            source_files = %config.source_files,
            mapping_file = %config.mapping_file.display(),
            dates_file = %config.dates_file.display(),
            write = config.write,
            "loaded assessment configuration"
        );
        Ok(config)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parse configuration {}", path.display()))
}

fn default_nt_probnp_sheet() -> String {
    "NT-proBNP Ranges".to_string()
}

fn default_alkaline_phosphatase_sheet() -> String {
    "Alkaline Phosphatase Ranges".to_string()
}

fn default_visit_concept_id() -> i64 {
    DEFAULT_VISIT_CONCEPT_ID
}

fn default_write() -> bool {
    true
}

fn default_dates_key_column() -> String {
    "Study ID".to_string()
}

fn default_dates_date_column() -> String {
    "Physical Assessment Date".to_string()
}
