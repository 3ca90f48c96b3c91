//! Repository error taxonomy.

use crate::model::ValidationError;
use rusqlite::ErrorCode;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of a repository, audit or transaction operation.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The target row was absent when rows-affected or the scan was evaluated.
    #[error("{object_type} not found: {id}")]
    NotFound { object_type: &'static str, id: i64 },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The operation exists in the interface but has no behavior yet.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
    /// Storage I/O failed; `context` names the statement or phase.
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    /// Rolling back after `original` failed as well.
    #[error("{original}; rollback failed: {source}")]
    Rollback {
        original: Box<RepoError>,
        #[source]
        source: rusqlite::Error,
    },
}

impl RepoError {
    /// Returns the error that caused the transaction to end, looking
    /// through rollback failures.
    pub fn root(&self) -> &RepoError {
        match self {
            Self::Rollback { original, .. } => original.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound { .. })
    }

    /// True when the statement was aborted through an interrupt handle.
    pub fn is_interrupted(&self) -> bool {
        match self.root() {
            Self::Storage { source, .. } => {
                source.sqlite_error_code() == Some(ErrorCode::OperationInterrupted)
            }
            _ => false,
        }
    }
}

/// Attaches the failing statement or phase to a storage error.
pub(crate) trait StorageContext<T> {
    fn context(self, context: &'static str) -> RepoResult<T>;
}

impl<T> StorageContext<T> for rusqlite::Result<T> {
    fn context(self, context: &'static str) -> RepoResult<T> {
        self.map_err(|source| RepoError::Storage { context, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_looks_through_rollback_failures() {
        let err = RepoError::Rollback {
            original: Box::new(RepoError::NotFound {
                object_type: "authors",
                id: 7,
            }),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("authors not found: 7"));
    }

    #[test]
    fn storage_context_names_the_phase() {
        let result: rusqlite::Result<()> = Err(rusqlite::Error::QueryReturnedNoRows);
        let err = result.context("select authors").unwrap_err();
        assert!(err.to_string().starts_with("select authors: "));
        assert!(!err.is_interrupted());
    }
}
