use std::fmt;

use fglatch_api::ClientError;
use fglatch_types::{RecordId, RecordName, TableId};
use thiserror::Error;

/// Errors produced while reading or validating Registry records.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The table does not exist or is not accessible to the current user.
    #[error("Could not retrieve table id={table_id}")]
    TableNotFound { table_id: TableId },

    /// A record was checked against a table it does not belong to.
    #[error(
        "Records must come from the table {expected_name} (id={expected_id}).\nRecord {record_name} (id={record_id}) originated from table {actual_name} (id={actual_id})."
    )]
    WrongSourceTable {
        expected_name: String,
        expected_id: TableId,
        record_name: RecordName,
        record_id: RecordId,
        actual_name: String,
        actual_id: TableId,
    },

    /// A record cell holds a value the Registry itself marks as invalid.
    #[error("Record {record_name} (id={record_id}) has an invalid value in column '{field}'")]
    InvalidValue {
        record_name: RecordName,
        record_id: RecordId,
        field: String,
    },

    /// Record values do not match the model's schema.
    #[error("record does not match model schema: {0}")]
    Schema(#[source] serde_json::Error),

    /// A GraphQL response could not be decoded into the expected shape.
    #[error("malformed registry response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("No record found with id: {id}")]
    RecordNotFound { id: RecordId },

    /// One or more queried names did not resolve to exactly one record.
    #[error("Could not find unique records for queried names\n{}", join_failures(.0))]
    Lookup(Vec<LookupFailure>),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Why a single queried name could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    NotFound { name: RecordName },
    /// Names are unique within a table, but not across tables.
    Duplicate { name: RecordName, count: usize },
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "No record found with name: {name}"),
            Self::Duplicate { name, count } => write!(f, "Duplicate record name: {name} (n={count})"),
        }
    }
}

fn join_failures(failures: &[LookupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
