//! Typed access to Latch Registry records.
//!
//! This crate provides:
//!
//! - [`query_records_by_name`]: resolve record names across all tables
//! - [`Record::fetch`]: load a record's values, with linked records resolved to names
//! - [`validate_source_table`]: check that a record comes from an expected table
//! - [`LatchRecordModel`] and [`BoundModel`]: convert records into typed structs
//!
//! Every helper talks to the platform through [`RegistrySource`], which is
//! implemented for [`fglatch_api::LatchClient`].

pub mod error;
pub mod model;
pub mod query;
pub mod record;
pub mod source;
pub mod table;

#[cfg(test)]
mod testing;

pub use error::{LookupFailure, RegistryError};
pub use model::{BoundModel, LatchRecordModel, model_from_record};
pub use query::{RecordNames, query_records_by_name};
pub use record::{LinkedRecord, Record, RecordRef, RecordValue};
pub use source::RegistrySource;
pub use table::{safe_table_name, validate_source_table};
