//! Latch API client utilities.
//!
//! This crate provides a lightweight, rate-limited client for the Latch
//! platform. It focuses on:
//!
//! - Discovering credentials from `LATCH_API_TOKEN` or `~/.latch/token`
//! - Discovering the active workspace from `~/.latch/workspace`
//! - Validating `LATCH_API_BASE` and `LATCH_GRAPHQL_URL` for safety
//! - Throttling every outgoing request to [`LATCH_API_RATE`]
//!
//! The primary entry point is [`LatchClient`].
//!
//! # Example
//!
//! ```ignore
//! use fglatch_api::LatchClient;
//!
//! let client = LatchClient::new(None, None)?;
//! let executions = client.list_executions().await?;
//! for (id, execution) in &executions {
//!     println!("{id}\t{}\t{}", execution.status, execution.display_name);
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use fglatch_types::{LatchUserApiToken, LatchWorkspaceId, ListedExecutions};
use reqwest::{Body, Client, Method, Request, RequestBuilder, Response, Url, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub use auth::{LATCH_API_TOKEN_ENV, current_workspace, retrieve_token};
pub use error::ClientError;
pub use rate_limit::{LATCH_API_RATE, RateLimiter, RequestRate};

/// Environment variable overriding the REST API base URL.
pub const LATCH_API_BASE_ENV: &str = "LATCH_API_BASE";
/// Environment variable overriding the GraphQL endpoint.
pub const LATCH_GRAPHQL_URL_ENV: &str = "LATCH_GRAPHQL_URL";

pub const DEFAULT_API_BASE: &str = "https://nucleus.latch.bio";
pub const DEFAULT_GRAPHQL_URL: &str = "https://vacuole.latch.bio/graphql";

/// Path of the execution-listing endpoint, relative to the API base.
const GET_EXECUTIONS_PATH: &str = "/sdk/get-executions";

/// Hostnames or base domains allowed for non-local endpoints. Subdomains are also allowed.
const ALLOWED_LATCH_DOMAINS: &[&str] = &["latch.bio"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Endpoint and throttling settings for a [`LatchClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub graphql_url: String,
    pub rate: RequestRate,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            rate: LATCH_API_RATE,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Defaults, with endpoints overridden by `LATCH_API_BASE` / `LATCH_GRAPHQL_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: env::var(LATCH_API_BASE_ENV).unwrap_or(defaults.api_base),
            graphql_url: env::var(LATCH_GRAPHQL_URL_ENV).unwrap_or(defaults.graphql_url),
            ..defaults
        }
    }
}

/// Rate-limited requests to the Latch API.
///
/// The underlying HTTP client is private; every request is built as a
/// [`LatchRequest`], whose `send` waits on a limiter shared by all clones of
/// the client. The `Authorization: Bearer <token>` header is attached to
/// every request.
#[derive(Debug, Clone)]
pub struct LatchClient {
    pub api_base: String,
    pub graphql_url: String,
    pub user_agent: String,
    http: Client,
    workspace_id: LatchWorkspaceId,
    auth_header: header::HeaderValue,
    limiter: Arc<RateLimiter>,
}

impl LatchClient {
    /// Construct a client for the given token and workspace.
    ///
    /// When `token` is `None` the current user's token is read from
    /// `LATCH_API_TOKEN` or `~/.latch/token`. When `workspace_id` is `None` the
    /// active workspace is read from `~/.latch/workspace`. Either lookup fails
    /// with a configuration error if nothing is found.
    pub fn new(token: Option<LatchUserApiToken>, workspace_id: Option<LatchWorkspaceId>) -> Result<Self, ClientError> {
        Self::with_config(token, workspace_id, ClientConfig::from_env())
    }

    pub fn with_config(
        token: Option<LatchUserApiToken>,
        workspace_id: Option<LatchWorkspaceId>,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let token = match token {
            Some(token) => token,
            None => retrieve_token()?,
        };
        let workspace_id = match workspace_id {
            Some(workspace_id) => workspace_id,
            None => current_workspace()?,
        };

        validate_base_url(&config.api_base)?;
        validate_base_url(&config.graphql_url)?;

        let mut auth_header = header::HeaderValue::from_str(&format!("Bearer {}", token.expose()))?;
        auth_header.set_sensitive(true);

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::AUTHORIZATION, auth_header.clone());
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()?;

        debug!(workspace = %workspace_id, api_base = %config.api_base, "created Latch client");
        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            graphql_url: config.graphql_url,
            http,
            user_agent: format!("fglatch/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            workspace_id,
            auth_header,
            limiter: Arc::new(RateLimiter::new(config.rate)),
        })
    }

    pub fn workspace_id(&self) -> &LatchWorkspaceId {
        &self.workspace_id
    }

    /// The `Authorization` header value sent with every request.
    pub fn auth_header(&self) -> &header::HeaderValue {
        &self.auth_header
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Build a request for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> LatchRequest {
        self.request_url(method, &format!("{}{}", self.api_base, path))
    }

    fn request_url(&self, method: Method, url: &str) -> LatchRequest {
        debug!(%url, "building request");
        LatchRequest {
            builder: self.http.request(method, url).header(header::USER_AGENT, &self.user_agent),
            limiter: Arc::clone(&self.limiter),
        }
    }

    /// List the executions in this client's workspace.
    pub async fn list_executions(&self) -> Result<ListedExecutions, ClientError> {
        let text = self
            .request(Method::POST, GET_EXECUTIONS_PATH)
            .json(&GetExecutionsRequest {
                ws_account_id: &self.workspace_id,
            })
            .send()
            .await?
            .text()
            .await?;
        let executions: ListedExecutions = serde_json::from_str(&text)?;
        debug!(count = executions.len(), "listed executions");
        Ok(executions)
    }

    /// Execute a GraphQL document and return its `data` payload.
    ///
    /// A response carrying a non-empty `errors` array is an error even when
    /// partial data is present.
    pub async fn execute_graphql(&self, query: &str, variables: Value) -> Result<Value, ClientError> {
        let text = self
            .request_url(Method::POST, &self.graphql_url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .text()
            .await?;
        let response: GraphQlResponse = serde_json::from_str(&text)?;
        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|error| error.message).collect();
            return Err(ClientError::GraphQl(messages.join("; ")));
        }
        Ok(response.data.unwrap_or(Value::Null))
    }
}

/// A request to the Latch API that has not been sent yet.
///
/// Sending waits for a slot on the owning client's rate limiter, so every
/// request made through a [`LatchClient`] is throttled.
#[derive(Debug)]
#[must_use = "a request does nothing until it is sent"]
pub struct LatchRequest {
    builder: RequestBuilder,
    limiter: Arc<RateLimiter>,
}

impl LatchRequest {
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Self {
        Self {
            builder: self.builder.json(body),
            limiter: self.limiter,
        }
    }

    pub fn body(self, body: impl Into<Body>) -> Self {
        Self {
            builder: self.builder.body(body),
            limiter: self.limiter,
        }
    }

    /// Build the request without sending it.
    pub fn build(self) -> Result<Request, ClientError> {
        Ok(self.builder.build()?)
    }

    /// Wait for a rate-limit slot, send the request and reject non-success statuses.
    pub async fn send(self) -> Result<Response, ClientError> {
        self.limiter.acquire().await;
        let response = self.builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response)
    }
}

#[derive(Serialize)]
struct GetExecutionsRequest<'a> {
    ws_account_id: &'a LatchWorkspaceId,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be `latch.bio` or a subdomain
pub fn validate_base_url(base: &str) -> Result<(), ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed_base_url = Url::parse(base).map_err(|error| invalid(error.to_string()))?;
    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| invalid("URL must include a host".into()))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(invalid(format!(
            "must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        )));
    }

    let is_allowed_domain = ALLOWED_LATCH_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{}", allowed_domain))
    });
    if !is_allowed_domain {
        return Err(invalid(format!(
            "host '{}' is not allowed; must be one of {:?} or a subdomain, or localhost",
            host_name, ALLOWED_LATCH_DOMAINS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LatchClient {
        LatchClient::with_config(
            Some(LatchUserApiToken::new("abc123")),
            Some(LatchWorkspaceId::new("1234")),
            ClientConfig::default(),
        )
        .expect("client")
    }

    #[test]
    fn accepts_latch_hosts_and_localhost() {
        assert!(validate_base_url("https://nucleus.latch.bio").is_ok());
        assert!(validate_base_url("https://latch.bio/api").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(validate_base_url("http://127.0.0.1").is_ok());
    }

    #[test]
    fn rejects_plain_http_and_foreign_hosts() {
        assert!(matches!(
            validate_base_url("http://nucleus.latch.bio"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(validate_base_url("https://latch.bio.example.com").is_err());
        assert!(validate_base_url("https://notlatch.bio").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn auth_header_is_bearer_token() {
        let client = client();
        assert_eq!(client.auth_header().to_str().unwrap(), "Bearer abc123");
        assert!(client.auth_header().is_sensitive());
        assert_eq!(client.workspace_id().as_str(), "1234");
    }

    #[test]
    fn requests_target_the_api_base() {
        let client = client();
        let request = client.request(Method::POST, GET_EXECUTIONS_PATH).build().unwrap();
        assert_eq!(request.url().as_str(), "https://nucleus.latch.bio/sdk/get-executions");
        assert!(request.headers().get(header::USER_AGENT).is_some());
    }

    #[test]
    fn rejects_unsafe_configured_endpoints() {
        let config = ClientConfig {
            graphql_url: "http://vacuole.example.com/graphql".into(),
            ..ClientConfig::default()
        };
        let result = LatchClient::with_config(Some("abc".into()), Some("1".into()), config);
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn config_reads_endpoint_overrides() {
        temp_env::with_vars(
            [
                (LATCH_API_BASE_ENV, Some("http://localhost:9000")),
                (LATCH_GRAPHQL_URL_ENV, None),
            ],
            || {
                let config = ClientConfig::from_env();
                assert_eq!(config.api_base, "http://localhost:9000");
                assert_eq!(config.graphql_url, DEFAULT_GRAPHQL_URL);
                assert_eq!(config.rate, LATCH_API_RATE);
            },
        );
    }
}
