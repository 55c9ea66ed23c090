//! Strongly-typed identifiers for Latch executions, workflows and Registry records.
//!
//! The Latch APIs are inconsistent about whether identifiers are sent as JSON
//! numbers or strings, so every identifier here deserializes from either form.
//!
//! ```ignore
//! use fglatch_types::{RecordId, TableId};
//!
//! let table: TableId = "11839".into();
//! let record: RecordId = serde_json::from_str("42")?;
//! ```

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An identifier as it appears on the wire: either a string or an integer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(u64),
}

impl From<WireId> for String {
    fn from(value: WireId) -> Self {
        match value {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

/// Error returned when a numeric identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a numeric identifier, got '{0}'")]
pub struct ParseIdError(pub String);

impl TryFrom<WireId> for u64 {
    type Error = ParseIdError;

    fn try_from(value: WireId) -> Result<Self, Self::Error> {
        match value {
            WireId::Number(number) => Ok(number),
            WireId::Text(text) => text.trim().parse().map_err(|_| ParseIdError(text)),
        }
    }
}

/// Generates a string newtype that serializes as a plain string and accepts
/// integers when deserializing.
macro_rules! string_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(from = "WireId", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<WireId> for $name {
            fn from(value: WireId) -> Self {
                Self(value.into())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Generates a numeric newtype that accepts either an integer or a numeric
/// string when deserializing.
macro_rules! numeric_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "WireId", into = "u64")]
        pub struct $name(pub u64);

        impl TryFrom<WireId> for $name {
            type Error = ParseIdError;

            fn try_from(value: WireId) -> Result<Self, Self::Error> {
                u64::try_from(value).map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id_type!(ExecutionId, "Numeric ID of a workflow execution.");
numeric_id_type!(WorkflowId, "Numeric ID of a registered workflow.");

string_id_type!(
    ExecutionIdAsString,
    "An execution ID in the string form used as a key by the `get-executions` endpoint."
);
string_id_type!(ExecutionDisplayName, "Human-readable name of an execution.");
string_id_type!(WorkflowName, "Name of a registered workflow (e.g. \"wf.__init__.my_workflow\").");
string_id_type!(WorkflowVersion, "Version string of a registered workflow.");
string_id_type!(S3Uri, "An S3 URI, e.g. \"s3://bucket/prefix/key\".");
string_id_type!(LatchWorkspaceId, "A Latch workspace ID, e.g. \"1234\".");
string_id_type!(TableId, "ID of a Latch Registry table.");
string_id_type!(RecordId, "ID of a Latch Registry record.");
string_id_type!(RecordName, "A record's `Name` (primary key) within its Registry table.");
string_id_type!(LatchTimestamp, "A timestamp as reported by the Latch API (RFC 3339).");

impl LatchTimestamp {
    /// Parse the timestamp, keeping the offset reported by the API.
    pub fn parse(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(self.as_str())
    }
}

impl From<ExecutionId> for ExecutionIdAsString {
    fn from(value: ExecutionId) -> Self {
        Self(value.to_string())
    }
}

/// A Latch user API token.
///
/// The token is redacted from `Debug` output so clients can be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct LatchUserApiToken(String);

impl LatchUserApiToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for LatchUserApiToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LatchUserApiToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for LatchUserApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LatchUserApiToken(<redacted>)")
    }
}
