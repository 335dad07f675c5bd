//! Destination-table access for the instrument ETL pipelines.
//!
//! The pipelines touch the destination store in exactly four ways: read
//! the person table to seed ages and the validity filter, read the visit
//! table for date canonicalization, read the current maximum record
//! identifiers to seed allocation, and append the finished batch. The
//! [`OmopStore`] trait captures that surface; [`CsvStore`] backs it with
//! a directory of CDM-shaped CSV files and [`MemoryStore`] backs dry
//! runs and tests.

pub mod csv_store;
pub mod error;
pub mod memory;
pub mod store;

pub use csv_store::CsvStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{OmopStore, PersonRow, VisitRow};
