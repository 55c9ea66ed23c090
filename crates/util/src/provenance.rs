//! Provenance of the code currently executing inside a Latch workflow.

use std::env::{self, VarError};

use fglatch_types::WorkflowVersion;
use thiserror::Error;
use tracing::debug;

/// Set by Latch on every task container; holds the registered workflow version.
pub const WORKFLOW_VERSION_ENV: &str = "FLYTE_INTERNAL_TASK_VERSION";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvenanceError {
    #[error(
        "The environment variable FLYTE_INTERNAL_TASK_VERSION is unset. Are you sure the code is running inside a Latch workflow?"
    )]
    NotInWorkflow,

    #[error("The environment variable FLYTE_INTERNAL_TASK_VERSION is not valid unicode: {raw}")]
    NotUnicode { raw: String },
}

/// Retrieve the version of the workflow this process is running under.
///
/// # Errors
///
/// Returns [`ProvenanceError::NotInWorkflow`] when `FLYTE_INTERNAL_TASK_VERSION`
/// is unset, i.e. the code is not running inside a Latch execution.
/// Returns [`ProvenanceError::NotUnicode`] when it is set but not valid unicode.
pub fn workflow_version() -> Result<WorkflowVersion, ProvenanceError> {
    let version = env::var(WORKFLOW_VERSION_ENV).map_err(|error| match error {
        VarError::NotPresent => ProvenanceError::NotInWorkflow,
        VarError::NotUnicode(raw) => ProvenanceError::NotUnicode {
            raw: raw.to_string_lossy().into_owned(),
        },
    })?;
    debug!(%version, "resolved workflow version");
    Ok(WorkflowVersion::new(version))
}
