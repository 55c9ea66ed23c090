use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`crate::LatchClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// No token in the environment or in the Latch config directory.
    #[error("no Latch API token found in LATCH_API_TOKEN or {}; run `latch login` first", path.display())]
    MissingToken { path: PathBuf },

    /// No active workspace configured.
    #[error("no active Latch workspace found at {}; select one with `latch workspace`", path.display())]
    MissingWorkspace { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
