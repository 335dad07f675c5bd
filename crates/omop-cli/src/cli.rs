//! CLI argument definitions for the instrument ETL runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "omop-etl",
    version,
    about = "Batch ETL from clinical instrument exports to OMOP CDM tables",
    long_about = "Load laboratory workbook exports and cognitive-assessment \
                  survey exports, map them through curated vocabulary tables, \
                  and append the resulting measurement and observation records \
                  to the destination store."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the laboratory pipeline.
    Labs(RunArgs),

    /// Run the cognitive-assessment pipeline.
    Assessment(RunArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the pipeline's JSON configuration file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Normalize and report without appending to the destination tables.
    ///
    /// Overrides the configuration's persistence flag.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
