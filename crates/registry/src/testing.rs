//! In-memory [`RegistrySource`] used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fglatch_api::ClientError;
use fglatch_types::TableId;
use serde_json::Value;

use crate::{RegistryError, RegistrySource};

/// Answers table lookups from a map and GraphQL documents from canned responses
/// keyed by a fragment of the query text.
#[derive(Default)]
pub struct MockSource {
    tables: HashMap<String, String>,
    responses: Vec<(&'static str, Value)>,
    queries: Mutex<Vec<(String, Value)>>,
}

impl MockSource {
    pub fn with_table(mut self, table_id: &str, name: &str) -> Self {
        self.tables.insert(table_id.to_string(), name.to_string());
        self
    }

    pub fn with_response(mut self, query_fragment: &'static str, data: Value) -> Self {
        self.responses.push((query_fragment, data));
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().expect("queries lock").len()
    }

    pub fn last_variables(&self) -> Option<Value> {
        self.queries.lock().expect("queries lock").last().map(|(_, variables)| variables.clone())
    }
}

#[async_trait]
impl RegistrySource for MockSource {
    async fn table_display_name(&self, table_id: &TableId) -> Result<String, RegistryError> {
        self.tables
            .get(table_id.as_str())
            .cloned()
            .ok_or_else(|| RegistryError::TableNotFound {
                table_id: table_id.clone(),
            })
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, RegistryError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push((query.to_string(), variables));
        self.responses
            .iter()
            .find(|(fragment, _)| query.contains(fragment))
            .map(|(_, data)| data.clone())
            .ok_or_else(|| RegistryError::Client(ClientError::GraphQl("no canned response".into())))
    }
}
