//! Credential and workspace discovery.
//!
//! Resolution order for the API token:
//! - `LATCH_API_TOKEN` environment variable
//! - `~/.latch/token`, written by `latch login`
//!
//! The active workspace is read from `~/.latch/workspace`, which older Latch
//! CLIs write as a bare ID and newer ones as `{"workspace_id": .., "name": ..}`.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use fglatch_types::{LatchUserApiToken, LatchWorkspaceId};
use fglatch_util::{token_path, workspace_path};
use serde::Deserialize;
use tracing::debug;

use crate::ClientError;

/// Environment variable consulted before `~/.latch/token`.
pub const LATCH_API_TOKEN_ENV: &str = "LATCH_API_TOKEN";

/// Resolve the current user's API token from the environment or `~/.latch/token`.
pub fn retrieve_token() -> Result<LatchUserApiToken, ClientError> {
    if let Ok(token) = env::var(LATCH_API_TOKEN_ENV)
        && !token.trim().is_empty()
    {
        debug!("using API token from {LATCH_API_TOKEN_ENV}");
        return Ok(LatchUserApiToken::new(token));
    }

    let path = token_path();
    match read_token_file(&path)? {
        Some(token) => Ok(token),
        None => Err(ClientError::MissingToken { path }),
    }
}

/// Read a token file, returning `None` when it is absent or blank.
pub fn read_token_file(path: &Path) -> Result<Option<LatchUserApiToken>, ClientError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(ClientError::Io { path: path.to_path_buf(), source: error }),
    };
    let token = LatchUserApiToken::new(content);
    Ok((!token.is_empty()).then_some(token))
}

/// Resolve the active workspace from `~/.latch/workspace`.
pub fn current_workspace() -> Result<LatchWorkspaceId, ClientError> {
    let path = workspace_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => return Err(ClientError::MissingWorkspace { path }),
        Err(error) => return Err(ClientError::Io { path, source: error }),
    };
    parse_workspace(&content).ok_or(ClientError::MissingWorkspace { path })
}

#[derive(Deserialize)]
struct WorkspaceFile {
    workspace_id: LatchWorkspaceId,
}

/// Parse the content of a workspace file in either of its two formats.
pub fn parse_workspace(content: &str) -> Option<LatchWorkspaceId> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        return serde_json::from_str::<WorkspaceFile>(trimmed)
            .ok()
            .map(|file| file.workspace_id)
            .filter(|id| !id.as_str().trim().is_empty());
    }
    Some(LatchWorkspaceId::new(trimmed))
}
