//! Shared type definitions for the fglatch crates.
//!
//! This crate holds the identifier newtypes used across the workspace and the
//! execution models decoded from the Latch API.

pub mod execution;
pub mod ids;

pub use execution::{Execution, ExecutionStatus, ListedExecutions, ParseExecutionStatusError};
pub use ids::{
    ExecutionDisplayName, ExecutionId, ExecutionIdAsString, LatchTimestamp, LatchUserApiToken, LatchWorkspaceId,
    ParseIdError, RecordId, RecordName, S3Uri, TableId, WireId, WorkflowId, WorkflowName, WorkflowVersion,
};
