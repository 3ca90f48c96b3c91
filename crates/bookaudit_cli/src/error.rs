//! CLI error type and its mapping to process exit codes.

use bookaudit_core::{AuthError, ConfigError, DbError, RepoError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Process exit codes, one per error class.
pub mod exit {
    pub const INTERNAL: i32 = 1;
    pub const INVALID_INPUT: i32 = 2;
    pub const UNAUTHORIZED: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const NOT_IMPLEMENTED: i32 = 5;
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}. Check the BOOKAUDIT_* environment variables and flags.")]
    Config(#[from] ConfigError),

    #[error("failed to open database: {0}")]
    Db(#[from] DbError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Repo(#[from] RepoError),

    /// An audited command ran without a caller identity.
    #[error("no caller identity: pass --user or set BOOKAUDIT_USER")]
    MissingUser,

    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::MissingUser => exit::INVALID_INPUT,
            Self::Auth(AuthError::Unauthorized(_)) => exit::UNAUTHORIZED,
            Self::Auth(AuthError::Internal(err)) | Self::Repo(err) => repo_exit_code(err),
            Self::Db(_) | Self::Output(_) | Self::Io(_) => exit::INTERNAL,
        }
    }
}

fn repo_exit_code(err: &RepoError) -> i32 {
    match err.root() {
        RepoError::NotFound { .. } => exit::NOT_FOUND,
        RepoError::Validation(_) => exit::INVALID_INPUT,
        RepoError::NotImplemented(_) => exit::NOT_IMPLEMENTED,
        _ => exit::INTERNAL,
    }
}
