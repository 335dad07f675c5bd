//! Library surface of the ETL runner: run configuration, logging setup,
//! and the two pipeline entry points. The binary in `main.rs` is a thin
//! argument-parsing shell over these.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod summary;
