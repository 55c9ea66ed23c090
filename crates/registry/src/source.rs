//! The seam between the Registry helpers and the service that answers them.

use async_trait::async_trait;
use fglatch_api::LatchClient;
use fglatch_types::TableId;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::RegistryError;

const TABLE_DISPLAY_NAME_QUERY: &str = r#"
query TableDisplayName($id: BigInt!) {
    catalogExperiment(id: $id) {
        id
        displayName
        removed
    }
}
"#;

/// Operations the Registry helpers need from the Latch platform.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Display name of a table, or [`RegistryError::TableNotFound`].
    async fn table_display_name(&self, table_id: &TableId) -> Result<String, RegistryError>;

    /// Execute a GraphQL document and return its `data` payload.
    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, RegistryError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableQueryResponse {
    catalog_experiment: Option<TableNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableNode {
    display_name: String,
    #[serde(default)]
    removed: bool,
}

#[async_trait]
impl RegistrySource for LatchClient {
    async fn table_display_name(&self, table_id: &TableId) -> Result<String, RegistryError> {
        let data = self.graphql(TABLE_DISPLAY_NAME_QUERY, json!({ "id": table_id })).await?;
        let response: TableQueryResponse = serde_json::from_value(data).map_err(RegistryError::MalformedResponse)?;
        match response.catalog_experiment {
            Some(table) if !table.removed => {
                debug!(%table_id, name = %table.display_name, "resolved table display name");
                Ok(table.display_name)
            }
            _ => Err(RegistryError::TableNotFound {
                table_id: table_id.clone(),
            }),
        }
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, RegistryError> {
        Ok(self.execute_graphql(query, variables).await?)
    }
}
