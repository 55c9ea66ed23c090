//! Workflow execution models returned by the `get-executions` endpoint.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ExecutionDisplayName, ExecutionId, ExecutionIdAsString, LatchTimestamp, S3Uri, WorkflowId, WorkflowName,
    WorkflowVersion,
};

/// The status of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Aborted,
    Aborting,
    Failed,
    Queued,
    Succeeded,
    Running,
    Undefined,
}

impl ExecutionStatus {
    pub const ALL: [ExecutionStatus; 7] = [
        Self::Aborted,
        Self::Aborting,
        Self::Failed,
        Self::Queued,
        Self::Succeeded,
        Self::Running,
        Self::Undefined,
    ];

    /// True if the execution is in a terminal state (succeeded, aborted or failed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Aborted | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aborted => "ABORTED",
            Self::Aborting => "ABORTING",
            Self::Failed => "FAILED",
            Self::Queued => "QUEUED",
            Self::Succeeded => "SUCCEEDED",
            Self::Running => "RUNNING",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown execution status '{0}'")]
pub struct ParseExecutionStatusError(pub String);

impl FromStr for ExecutionStatus {
    type Err = ParseExecutionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseExecutionStatusError(s.to_string()))
    }
}

/// Execution metadata retrieved from the `get-executions` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub display_name: ExecutionDisplayName,
    pub id: ExecutionId,
    #[serde(default)]
    pub inputs_url: Option<S3Uri>,
    #[serde(default)]
    pub resolution_time: Option<LatchTimestamp>,
    #[serde(default)]
    pub start_time: Option<LatchTimestamp>,
    pub status: ExecutionStatus,
    pub workflow_id: WorkflowId,
    pub workflow_name: WorkflowName,
    pub workflow_version: WorkflowVersion,
}

/// The response of a POST request to the `get-executions` endpoint.
///
/// Executions are keyed by their ID (as a string) and kept in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListedExecutions(IndexMap<ExecutionIdAsString, Execution>);

impl ListedExecutions {
    pub fn get(&self, key: &str) -> Option<&Execution> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ExecutionIdAsString> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Execution> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, ExecutionIdAsString, Execution> {
        self.0.iter()
    }

    /// Executions that have not yet reached a terminal state.
    pub fn active(&self) -> impl Iterator<Item = &Execution> {
        self.values().filter(|execution| !execution.status.is_terminal())
    }
}

impl From<IndexMap<ExecutionIdAsString, Execution>> for ListedExecutions {
    fn from(value: IndexMap<ExecutionIdAsString, Execution>) -> Self {
        Self(value)
    }
}

impl FromIterator<Execution> for ListedExecutions {
    fn from_iter<T: IntoIterator<Item = Execution>>(iter: T) -> Self {
        Self(iter.into_iter().map(|execution| (execution.id.into(), execution)).collect())
    }
}

impl<'a> IntoIterator for &'a ListedExecutions {
    type Item = (&'a ExecutionIdAsString, &'a Execution);
    type IntoIter = indexmap::map::Iter<'a, ExecutionIdAsString, Execution>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ListedExecutions {
    type Item = (ExecutionIdAsString, Execution);
    type IntoIter = indexmap::map::IntoIter<ExecutionIdAsString, Execution>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
