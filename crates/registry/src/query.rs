//! Bulk lookup of records by name across every Registry table.

use fglatch_types::RecordName;
use indexmap::IndexMap;
use serde_json::json;
use tracing::debug;

use crate::record::CatalogSamplesResponse;
use crate::{LookupFailure, RecordRef, RegistryError, RegistrySource};

const RECORDS_BY_NAME_QUERY: &str = r#"
query RecordsByName($sampleNames: [String!]) {
    catalogSamples(filter: {name: {in: $sampleNames}}) {
        nodes {
            id
            name
        }
    }
}
"#;

/// One or more record names to look up.
///
/// Lets [`query_records_by_name`] accept a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordNames(Vec<RecordName>);

impl RecordNames {
    pub fn as_slice(&self) -> &[RecordName] {
        &self.0
    }
}

impl From<&str> for RecordNames {
    fn from(value: &str) -> Self {
        Self(vec![value.into()])
    }
}

impl From<String> for RecordNames {
    fn from(value: String) -> Self {
        Self(vec![value.into()])
    }
}

impl From<RecordName> for RecordNames {
    fn from(value: RecordName) -> Self {
        Self(vec![value])
    }
}

impl<T: Into<RecordName>> From<Vec<T>> for RecordNames {
    fn from(value: Vec<T>) -> Self {
        Self(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RecordName> + Clone> From<&[T]> for RecordNames {
    fn from(value: &[T]) -> Self {
        Self(value.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<RecordName>, const N: usize> From<[T; N]> for RecordNames {
    fn from(value: [T; N]) -> Self {
        Self(value.into_iter().map(Into::into).collect())
    }
}

/// Fetch records by name, searching across *all* Registry tables.
///
/// Every requested name must match exactly one record. Names are only unique
/// within a table, so a name may collide across tables. All missing and
/// duplicated names are reported together in one [`RegistryError::Lookup`].
pub async fn query_records_by_name<S: RegistrySource + ?Sized>(
    source: &S,
    names: impl Into<RecordNames>,
) -> Result<IndexMap<RecordName, RecordRef>, RegistryError> {
    let names = names.into();
    let data = source
        .graphql(RECORDS_BY_NAME_QUERY, json!({ "sampleNames": names.as_slice() }))
        .await?;
    let response: CatalogSamplesResponse = serde_json::from_value(data).map_err(RegistryError::MalformedResponse)?;
    let records = response.catalog_samples.nodes;
    debug!(requested = names.as_slice().len(), matched = records.len(), "queried records by name");

    let mut name_counts: IndexMap<&RecordName, usize> = IndexMap::new();
    for record in &records {
        *name_counts.entry(&record.name).or_default() += 1;
    }

    let failures: Vec<LookupFailure> = names
        .as_slice()
        .iter()
        .filter_map(|name| match name_counts.get(name).copied().unwrap_or(0) {
            0 => Some(LookupFailure::NotFound { name: name.clone() }),
            1 => None,
            count => Some(LookupFailure::Duplicate {
                name: name.clone(),
                count,
            }),
        })
        .collect();
    if !failures.is_empty() {
        return Err(RegistryError::Lookup(failures));
    }

    Ok(records
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::testing::MockSource;

    fn source_with(nodes: Value) -> MockSource {
        MockSource::default().with_response("name: {in", json!({ "catalogSamples": { "nodes": nodes } }))
    }

    #[tokio::test]
    async fn returns_one_record_per_name() {
        let source = source_with(json!([{"id": 1, "name": "a"}, {"id": "2", "name": "b"}]));

        let records = query_records_by_name(&source, ["a", "b"]).await.expect("records");

        assert_eq!(records.len(), 2);
        assert_eq!(records["a"].id.as_str(), "1");
        assert_eq!(records["b"].id.as_str(), "2");
        assert_eq!(source.last_variables(), Some(json!({"sampleNames": ["a", "b"]})));
    }

    #[tokio::test]
    async fn missing_names_fail_the_whole_lookup() {
        let source = source_with(json!([{"id": 1, "name": "a"}]));

        let error = query_records_by_name(&source, vec!["a", "b"]).await.unwrap_err();

        match &error {
            RegistryError::Lookup(failures) => {
                assert_eq!(failures, &[LookupFailure::NotFound { name: "b".into() }]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            error.to_string(),
            "Could not find unique records for queried names\nNo record found with name: b"
        );
    }

    #[tokio::test]
    async fn duplicate_names_report_their_count() {
        let source = source_with(json!([{"id": 1, "name": "a"}, {"id": 2, "name": "a"}]));

        let error = query_records_by_name(&source, ["a"]).await.unwrap_err();

        assert!(error.to_string().contains("Duplicate record name: a (n=2)"));
    }

    #[tokio::test]
    async fn all_failures_are_reported_together() {
        let source = source_with(json!([{"id": 1, "name": "a"}, {"id": 2, "name": "a"}]));

        let error = query_records_by_name(&source, ["a", "b", "c"]).await.unwrap_err();

        assert_eq!(
            error.to_string(),
            "Could not find unique records for queried names\n\
             Duplicate record name: a (n=2)\n\
             No record found with name: b\n\
             No record found with name: c"
        );
    }

    #[tokio::test]
    async fn single_name_matches_list_of_one() {
        let single = source_with(json!([{"id": 7, "name": "a"}]));
        let listed = source_with(json!([{"id": 7, "name": "a"}]));

        let from_single = query_records_by_name(&single, "a").await.unwrap();
        let from_list = query_records_by_name(&listed, vec!["a".to_string()]).await.unwrap();

        assert_eq!(from_single, from_list);
        assert_eq!(single.last_variables(), listed.last_variables());
    }

    #[tokio::test]
    async fn malformed_responses_are_rejected() {
        let source = MockSource::default().with_response("name: {in", json!({"catalogSamples": {"edges": []}}));

        let error = query_records_by_name(&source, "a").await.unwrap_err();

        assert!(matches!(error, RegistryError::MalformedResponse(_)));
    }
}
