//! `RegistrySource` for `LatchClient`, against a wiremock GraphQL endpoint.

use fglatch_api::{ClientConfig, LatchClient};
use fglatch_registry::{RegistryError, RegistrySource, safe_table_name};
use fglatch_types::{LatchUserApiToken, LatchWorkspaceId, TableId};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_answering(data: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "variables": { "id": "567" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn client_for_server(server: &MockServer) -> LatchClient {
    LatchClient::with_config(
        Some(LatchUserApiToken::new("abc123")),
        Some(LatchWorkspaceId::new("1234")),
        ClientConfig {
            api_base: server.uri(),
            graphql_url: format!("{}/graphql", server.uri()),
            ..ClientConfig::default()
        },
    )
    .expect("client creation should succeed")
}

#[tokio::test]
async fn resolves_table_display_name() {
    let server = server_answering(json!({
        "catalogExperiment": { "id": "567", "displayName": "Sequencing Runs", "removed": false }
    }))
    .await;

    let name = client_for_server(&server)
        .table_display_name(&TableId::new("567"))
        .await
        .expect("table name");

    assert_eq!(name, "Sequencing Runs");
}

#[tokio::test]
async fn removed_table_is_not_found() {
    let server = server_answering(json!({
        "catalogExperiment": { "id": "567", "displayName": "Old Runs", "removed": true }
    }))
    .await;

    let error = client_for_server(&server)
        .table_display_name(&TableId::new("567"))
        .await
        .unwrap_err();

    assert!(matches!(error, RegistryError::TableNotFound { .. }));
    assert_eq!(error.to_string(), "Could not retrieve table id=567");
}

#[tokio::test]
async fn missing_table_is_not_found() {
    let server = server_answering(json!({ "catalogExperiment": null })).await;

    let client = client_for_server(&server);
    assert_eq!(safe_table_name(&client, &TableId::new("567")).await, None);
}
