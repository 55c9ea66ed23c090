//! Table name resolution and source-table validation.

use fglatch_types::TableId;
use tracing::{debug, warn};

use crate::{Record, RegistryError, RegistrySource};

/// Best-effort lookup of a table's display name.
///
/// Returns `None` if the table does not exist or is inaccessible, so callers
/// can substitute a placeholder instead of aborting.
pub async fn safe_table_name<S: RegistrySource + ?Sized>(source: &S, table_id: &TableId) -> Option<String> {
    match source.table_display_name(table_id).await {
        Ok(name) => Some(name),
        Err(error) => {
            debug!(%table_id, %error, "could not resolve table display name");
            None
        }
    }
}

/// Fail unless `record` originates from the table `expected_table_id`.
///
/// The expected table must be resolvable; otherwise this fails with
/// [`RegistryError::TableNotFound`] before the record is inspected.
pub async fn validate_source_table<S: RegistrySource + ?Sized>(
    source: &S,
    record: &Record,
    expected_table_id: &TableId,
) -> Result<(), RegistryError> {
    let Some(expected_name) = safe_table_name(source, expected_table_id).await else {
        return Err(RegistryError::TableNotFound {
            table_id: expected_table_id.clone(),
        });
    };
    check_source_table(source, record, expected_table_id, &expected_name).await
}

/// Compare a record's table against an already-resolved expected table.
pub(crate) async fn check_source_table<S: RegistrySource + ?Sized>(
    source: &S,
    record: &Record,
    expected_table_id: &TableId,
    expected_name: &str,
) -> Result<(), RegistryError> {
    if &record.table_id == expected_table_id {
        return Ok(());
    }

    let actual_name = match safe_table_name(source, &record.table_id).await {
        Some(name) => name,
        None => {
            warn!(
                table_id = %record.table_id,
                record_id = %record.id,
                "source table of record is not accessible; reporting its ID instead of its name"
            );
            record.table_id.to_string()
        }
    };

    Err(RegistryError::WrongSourceTable {
        expected_name: expected_name.to_string(),
        expected_id: expected_table_id.clone(),
        record_name: record.name.clone(),
        record_id: record.id.clone(),
        actual_name,
        actual_id: record.table_id.clone(),
    })
}
