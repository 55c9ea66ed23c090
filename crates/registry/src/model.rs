//! Typed models over Registry tables.
//!
//! Implement [`LatchRecordModel`] for a `Deserialize` struct to describe a
//! table's schema, bind it once with [`BoundModel::bind`], and convert records:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct SampleRecord {
//!     id: RecordId,
//!     name: RecordName,
//!     sample_name: String,
//!     concentration: f64,
//! }
//!
//! impl LatchRecordModel for SampleRecord {
//!     const TABLE_ID: &'static str = "11839";
//!     fn id(&self) -> &RecordId { &self.id }
//!     fn name(&self) -> &RecordName { &self.name }
//! }
//!
//! let samples = BoundModel::<SampleRecord>::bind(&client).await?;
//! let records = query_records_by_name(&client, "sample_001").await?;
//! let sample = samples.fetch(&client, &records["sample_001"].id).await?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use fglatch_types::{RecordId, RecordName, TableId};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::table::check_source_table;
use crate::{Record, RegistryError, RegistrySource, validate_source_table};

/// Schema of the records in one Registry table.
///
/// Models receive every column of the record plus the reserved keys `name`
/// and `id`. Linked-record columns arrive as the linked record's name.
pub trait LatchRecordModel: DeserializeOwned {
    /// ID of the table the model's records must come from.
    const TABLE_ID: &'static str;

    fn id(&self) -> &RecordId;

    fn name(&self) -> &RecordName;

    fn table_id() -> TableId {
        TableId::new(Self::TABLE_ID)
    }
}

/// A model whose table has been resolved against the Registry.
///
/// Binding resolves the table's display name once; it is reused for every
/// record converted afterwards.
pub struct BoundModel<M> {
    table_id: TableId,
    table_name: String,
    _model: PhantomData<fn() -> M>,
}

impl<M: LatchRecordModel> BoundModel<M> {
    /// Resolve the model's table, failing if it does not exist or is inaccessible.
    pub async fn bind<S: RegistrySource + ?Sized>(source: &S) -> Result<Self, RegistryError> {
        let table_id = M::table_id();
        let table_name = source.table_display_name(&table_id).await?;
        debug!(%table_id, %table_name, "bound record model");
        Ok(Self {
            table_id,
            table_name,
            _model: PhantomData,
        })
    }

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Validate that `record` belongs to this model's table and convert it.
    pub async fn from_record<S: RegistrySource + ?Sized>(&self, source: &S, record: &Record) -> Result<M, RegistryError> {
        check_source_table(source, record, &self.table_id, &self.table_name).await?;
        build_model(record)
    }

    /// Fetch a record by ID and convert it.
    pub async fn fetch<S: RegistrySource + ?Sized>(&self, source: &S, id: &RecordId) -> Result<M, RegistryError> {
        let record = Record::fetch(source, id).await?;
        self.from_record(source, &record).await
    }
}

impl<M> Clone for BoundModel<M> {
    fn clone(&self) -> Self {
        Self {
            table_id: self.table_id.clone(),
            table_name: self.table_name.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for BoundModel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundModel")
            .field("table_id", &self.table_id)
            .field("table_name", &self.table_name)
            .finish()
    }
}

/// Validate and convert a record without binding the model first.
///
/// The model's table name is resolved on every call; prefer [`BoundModel`]
/// when converting many records.
pub async fn model_from_record<M, S>(source: &S, record: &Record) -> Result<M, RegistryError>
where
    M: LatchRecordModel,
    S: RegistrySource + ?Sized,
{
    validate_source_table(source, record, &M::table_id()).await?;
    build_model(record)
}

fn build_model<M: LatchRecordModel>(record: &Record) -> Result<M, RegistryError> {
    let values = record.to_model_values()?;
    serde_json::from_value(Value::Object(values)).map_err(RegistryError::Schema)
}
