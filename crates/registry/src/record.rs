//! Registry records and their cell values.
//!
//! Cells are stored by Latch as tagged JSON: `{"valid": true, "value": ..}`
//! for values that passed the column's type check, and
//! `{"valid": false, "rawValue": ..}` for values that did not. A value of the
//! form `{"sampleId": ..}` is a link to another record.

use std::collections::HashMap;

use fglatch_types::{RecordId, RecordName, TableId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{RegistryError, RegistrySource};

const RECORD_BY_ID_QUERY: &str = r#"
query RecordById($id: BigInt!) {
    catalogSample(id: $id) {
        id
        name
        experimentId
        catalogSampleColumnDataBySampleId {
            nodes {
                key
                data
            }
        }
    }
}
"#;

const RECORD_NAMES_BY_ID_QUERY: &str = r#"
query RecordNamesById($ids: [BigInt!]) {
    catalogSamples(filter: {id: {in: $ids}}) {
        nodes {
            id
            name
        }
    }
}
"#;

/// The ID and name of a record, as returned by bulk queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: RecordId,
    pub name: RecordName,
}

impl RecordRef {
    /// Load the full record, including its values.
    pub async fn fetch<S: RegistrySource + ?Sized>(&self, source: &S) -> Result<Record, RegistryError> {
        Record::fetch(source, &self.id).await
    }
}

/// A link from one record's cell to another record.
pub type LinkedRecord = RecordRef;

/// The value of a single record cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Value(Value),
    Link(LinkedRecord),
    /// A cell the Registry marks as invalid for its column type; holds the raw input.
    Invalid(Value),
}

/// A record fetched from a Registry table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub name: RecordName,
    pub table_id: TableId,
    pub values: IndexMap<String, RecordValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CatalogSamplesResponse {
    pub catalog_samples: CatalogSamples,
}

#[derive(Deserialize)]
pub(crate) struct CatalogSamples {
    pub nodes: Vec<RecordRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordByIdResponse {
    catalog_sample: Option<RecordNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordNode {
    id: RecordId,
    name: RecordName,
    experiment_id: TableId,
    catalog_sample_column_data_by_sample_id: ColumnDataNodes,
}

#[derive(Deserialize)]
struct ColumnDataNodes {
    nodes: Vec<ColumnData>,
}

#[derive(Deserialize)]
struct ColumnData {
    key: String,
    data: Value,
}

enum Cell {
    Value(Value),
    Link(RecordId),
    Invalid(Value),
}

impl Record {
    /// Fetch a record by ID, resolving the names of any linked records.
    ///
    /// Links are resolved one level deep with a single batched query.
    pub async fn fetch<S: RegistrySource + ?Sized>(source: &S, id: &RecordId) -> Result<Self, RegistryError> {
        let data = source.graphql(RECORD_BY_ID_QUERY, json!({ "id": id })).await?;
        let response: RecordByIdResponse = serde_json::from_value(data).map_err(RegistryError::MalformedResponse)?;
        let node = response
            .catalog_sample
            .ok_or_else(|| RegistryError::RecordNotFound { id: id.clone() })?;

        let cells: Vec<(String, Cell)> = node
            .catalog_sample_column_data_by_sample_id
            .nodes
            .into_iter()
            .map(|column| (column.key, decode_cell(column.data)))
            .collect();

        let link_ids: Vec<&RecordId> = cells
            .iter()
            .filter_map(|(_, cell)| match cell {
                Cell::Link(id) => Some(id),
                _ => None,
            })
            .collect();
        let link_names = resolve_names(source, &link_ids).await?;

        let mut values = IndexMap::with_capacity(cells.len());
        for (key, cell) in cells {
            let value = match cell {
                Cell::Value(value) => RecordValue::Value(value),
                Cell::Invalid(raw) => RecordValue::Invalid(raw),
                Cell::Link(link_id) => {
                    let name = link_names
                        .get(&link_id)
                        .cloned()
                        .ok_or_else(|| RegistryError::RecordNotFound { id: link_id.clone() })?;
                    RecordValue::Link(LinkedRecord { id: link_id, name })
                }
            };
            values.insert(key, value);
        }

        debug!(record_id = %node.id, columns = values.len(), "fetched record");
        Ok(Self {
            id: node.id,
            name: node.name,
            table_id: node.experiment_id,
            values,
        })
    }

    pub fn get(&self, column: &str) -> Option<&RecordValue> {
        self.values.get(column)
    }

    pub fn to_ref(&self) -> RecordRef {
        RecordRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// The record's values as a JSON object, with links replaced by the linked record's name.
    ///
    /// The record's own `name` and `id` are inserted last, overriding any columns
    /// of the same name.
    pub fn to_model_values(&self) -> Result<Map<String, Value>, RegistryError> {
        let mut values = Map::with_capacity(self.values.len() + 2);
        for (key, value) in &self.values {
            let value = match value {
                RecordValue::Value(value) => value.clone(),
                RecordValue::Link(linked) => Value::String(linked.name.to_string()),
                RecordValue::Invalid(_) => {
                    return Err(RegistryError::InvalidValue {
                        record_name: self.name.clone(),
                        record_id: self.id.clone(),
                        field: key.clone(),
                    });
                }
            };
            values.insert(key.clone(), value);
        }
        values.insert("name".into(), Value::String(self.name.to_string()));
        values.insert("id".into(), Value::String(self.id.to_string()));
        Ok(values)
    }
}

async fn resolve_names<S: RegistrySource + ?Sized>(
    source: &S,
    ids: &[&RecordId],
) -> Result<HashMap<RecordId, RecordName>, RegistryError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let data = source.graphql(RECORD_NAMES_BY_ID_QUERY, json!({ "ids": ids })).await?;
    let response: CatalogSamplesResponse = serde_json::from_value(data).map_err(RegistryError::MalformedResponse)?;
    Ok(response
        .catalog_samples
        .nodes
        .into_iter()
        .map(|node| (node.id, node.name))
        .collect())
}

fn decode_cell(data: Value) -> Cell {
    match data {
        Value::Object(mut tagged) if tagged.contains_key("valid") => {
            if tagged.get("valid").and_then(Value::as_bool) == Some(false) {
                return Cell::Invalid(tagged.remove("rawValue").unwrap_or(Value::Null));
            }
            decode_value(tagged.remove("value").unwrap_or(Value::Null))
        }
        other => decode_value(other),
    }
}

fn decode_value(value: Value) -> Cell {
    if let Value::Object(object) = &value
        && object.len() == 1
        && let Some(sample_id) = object.get("sampleId")
        && let Ok(id) = serde_json::from_value::<RecordId>(sample_id.clone())
    {
        return Cell::Link(id);
    }
    Cell::Value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSource;

    fn record_response() -> Value {
        json!({
            "catalogSample": {
                "id": "101",
                "name": "DNA123/seq_abc",
                "experimentId": "567",
                "catalogSampleColumnDataBySampleId": {
                    "nodes": [
                        {"key": "concentration", "data": {"valid": true, "value": 12.5}},
                        {"key": "library", "data": {"valid": true, "value": {"sampleId": 202}}},
                        {"key": "notes", "data": {"valid": false, "rawValue": "n/a"}},
                        {"key": "lane", "data": 3}
                    ]
                }
            }
        })
    }

    #[tokio::test]
    async fn fetch_decodes_cells_and_resolves_links() {
        let source = MockSource::default()
            .with_response("catalogSample(id", record_response())
            .with_response(
                "id: {in",
                json!({"catalogSamples": {"nodes": [{"id": 202, "name": "LIB-0007"}]}}),
            );

        let record = Record::fetch(&source, &RecordId::new("101")).await.expect("record");

        assert_eq!(record.name.as_str(), "DNA123/seq_abc");
        assert_eq!(record.table_id.as_str(), "567");
        assert_eq!(record.get("concentration"), Some(&RecordValue::Value(json!(12.5))));
        assert_eq!(
            record.get("library"),
            Some(&RecordValue::Link(LinkedRecord {
                id: RecordId::new("202"),
                name: RecordName::new("LIB-0007"),
            }))
        );
        assert_eq!(record.get("notes"), Some(&RecordValue::Invalid(json!("n/a"))));
        assert_eq!(record.get("lane"), Some(&RecordValue::Value(json!(3))));
        let keys: Vec<&str> = record.values.keys().map(String::as_str).collect();
        assert_eq!(keys, ["concentration", "library", "notes", "lane"]);
    }

    #[tokio::test]
    async fn fetch_without_links_skips_name_lookup() {
        let source = MockSource::default().with_response(
            "catalogSample(id",
            json!({
                "catalogSample": {
                    "id": 5,
                    "name": "plain",
                    "experimentId": 9,
                    "catalogSampleColumnDataBySampleId": {"nodes": []}
                }
            }),
        );

        let record = Record::fetch(&source, &RecordId::new("5")).await.expect("record");
        assert!(record.values.is_empty());
        assert_eq!(source.query_count(), 1);
    }

    #[tokio::test]
    async fn fetch_missing_record_is_not_found() {
        let source = MockSource::default().with_response("catalogSample(id", json!({"catalogSample": null}));
        let error = Record::fetch(&source, &RecordId::new("404")).await.unwrap_err();
        assert!(matches!(error, RegistryError::RecordNotFound { .. }));
        assert_eq!(error.to_string(), "No record found with id: 404");
    }

    #[test]
    fn model_values_reject_invalid_cells() {
        let record = Record {
            id: RecordId::new("1"),
            name: RecordName::new("r1"),
            table_id: TableId::new("t"),
            values: IndexMap::from([("depth".to_string(), RecordValue::Invalid(json!("deep")))]),
        };
        let error = record.to_model_values().unwrap_err();
        assert!(matches!(error, RegistryError::InvalidValue { ref field, .. } if field == "depth"));
    }

    #[test]
    fn model_values_override_name_and_id_columns() {
        let record = Record {
            id: RecordId::new("1"),
            name: RecordName::new("r1"),
            table_id: TableId::new("t"),
            values: IndexMap::from([
                ("name".to_string(), RecordValue::Value(json!("column name"))),
                ("id".to_string(), RecordValue::Value(json!(99))),
            ]),
        };
        let values = record.to_model_values().unwrap();
        assert_eq!(values["name"], json!("r1"));
        assert_eq!(values["id"], json!("1"));
    }
}
