use anyhow::Result;
use omop_cli::config::{AssessmentConfig, LabsConfig};
use omop_cli::pipeline::{AssessmentReport, LabsReport, run_assessment, run_labs};
use omop_store::CsvStore;
use tracing::info;

use crate::cli::RunArgs;

pub fn run_labs_command(args: &RunArgs) -> Result<LabsReport> {
    let mut config = LabsConfig::load(&args.config)?;
    if args.dry_run {
        info!("dry run requested, persistence disabled");
        config.write = false;
    }
    let mut store = CsvStore::open(&config.store_dir)?;
    run_labs(&config, &mut store)
}

pub fn run_assessment_command(args: &RunArgs) -> Result<AssessmentReport> {
    let mut config = AssessmentConfig::load(&args.config)?;
    if args.dry_run {
        info!("dry run requested, persistence disabled");
        config.write = false;
    }
    let mut store = CsvStore::open(&config.store_dir)?;
    run_assessment(&config, &mut store)
}
