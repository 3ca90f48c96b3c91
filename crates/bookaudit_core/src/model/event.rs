//! Audit event model.
//!
//! # Invariants
//! - `timestamp` comes from the storage clock, never from the caller.
//! - `object_id` is present only for operations on a single record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Object type tag for author operations.
pub const OBJECT_AUTHORS: &str = "authors";
/// Object type tag for book operations.
pub const OBJECT_BOOKS: &str = "books";
/// Object type tag for authorization checks.
pub const OBJECT_AUTH: &str = "auth";

/// Kind of access recorded by an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    /// Stable value stored in `events.operation`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CREATE" => Some(Self::Create),
            "READ" => Some(Self::Read),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(rename = "when")]
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub operation: Operation,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(rename = "id")]
    pub object_id: Option<i64>,
}
