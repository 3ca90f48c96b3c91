//! Audited data access for an author/book catalogue.
//! Every operation on business data is gated by [`authorize`] and leaves one
//! audit event committed atomically with its effect.

pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tx;

pub use audit::{after, before, Filter, Predicate, WhereClause};
pub use auth::{authorize, list_users, register_user, AuditSession, AuthError};
pub use config::{ConfigError, StoreConfig};
pub use db::{open_db, open_db_in_memory, open_db_with_config, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogTarget,
    LoggingError,
};
pub use model::author::{Author, AuthorId, AuthorPatch};
pub use model::book::{Book, BookId, BookPatch};
pub use model::event::{AuditEvent, Operation, OBJECT_AUTH, OBJECT_AUTHORS, OBJECT_BOOKS};
pub use model::{ValidationError, UNSET_DATE};
pub use repo::author_repo::AuthorRepository;
pub use repo::book_repo::BookRepository;
pub use repo::error::{RepoError, RepoResult};
pub use service::author_service::AuthorService;
pub use service::book_service::BookService;
pub use tx::{run_in_transaction, TxAction};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
