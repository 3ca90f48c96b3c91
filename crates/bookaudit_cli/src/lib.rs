//! bookaudit CLI library
//!
//! Command-line front end over the audited catalogue:
//!
//! - **Setup**: create or migrate the database (`bookaudit init`)
//! - **Allow-list**: register and list callers (`bookaudit user add/list`)
//! - **Authors and books**: audited CRUD (`bookaudit author ...`, `bookaudit book ...`)
//! - **Audit log**: filtered event listing (`bookaudit events`)
//!
//! Every command prints JSON on stdout. Failures print one line on stderr and
//! exit with the code of their error class (see [`error::exit`]).

pub mod commands;
pub mod error;

pub use error::{CliError, Result};

use bookaudit_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use bookaudit_core::{Operation, StoreConfig};
use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the caller identity.
pub const ENV_USER: &str = "BOOKAUDIT_USER";

/// bookaudit - audited author and book catalogue
#[derive(Parser, Debug)]
#[command(name = "bookaudit")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file
    #[arg(long, env = ENV_DB_PATH, global = true)]
    pub db: Option<PathBuf>,

    /// Caller identity checked against the allow-list
    #[arg(short, long, env = ENV_USER, global = true)]
    pub user: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = ENV_LOG_LEVEL, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    #[arg(long, env = ENV_LOG_DIR, global = true)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Builds the store configuration from the environment, then applies
    /// explicit flags on top.
    pub fn store_config(&self) -> Result<StoreConfig> {
        let mut config = StoreConfig::from_env()?;
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and apply migrations
    Init,

    /// Manage the caller allow-list
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Audited author operations
    Author {
        #[command(subcommand)]
        command: AuthorCommand,
    },

    /// Audited book operations
    Book {
        #[command(subcommand)]
        command: BookCommand,
    },

    /// List audit events
    Events {
        /// Only events strictly after this RFC 3339 instant
        #[arg(long)]
        after: Option<DateTime<FixedOffset>>,

        /// Only events strictly before this RFC 3339 instant
        #[arg(long)]
        before: Option<DateTime<FixedOffset>>,

        /// Only events recorded for this caller
        #[arg(long = "by")]
        by_user: Option<String>,

        /// Only events of this operation (create, read, update, delete)
        #[arg(long, value_parser = parse_operation)]
        operation: Option<Operation>,

        /// Only events on this object type (authors, books, auth)
        #[arg(long = "type")]
        object_type: Option<String>,
    },
}

/// Allow-list subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a caller name
    Add { name: String },

    /// List registered callers
    List,
}

/// Author subcommands
#[derive(Subcommand, Debug)]
pub enum AuthorCommand {
    /// Create an author
    Add {
        #[arg(long)]
        name: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,
    },

    /// Show one author
    Get { id: i64 },

    /// List all authors
    List,

    /// Change the given fields of an author
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<NaiveDate>,
    },

    /// Delete an author and their books
    Delete { id: i64 },
}

/// Book subcommands
#[derive(Subcommand, Debug)]
pub enum BookCommand {
    /// Create a book under an author
    Add {
        #[arg(long)]
        author: i64,

        #[arg(long)]
        title: String,

        /// Publication date (YYYY-MM-DD)
        #[arg(long)]
        published: NaiveDate,
    },

    /// Show one book
    Get { author: i64, id: i64 },

    /// List all books
    List,

    /// Change the given fields of a book
    Update {
        author: i64,
        id: i64,

        #[arg(long)]
        title: Option<String>,

        /// Publication date (YYYY-MM-DD)
        #[arg(long)]
        published: Option<NaiveDate>,
    },

    /// Delete a book
    Delete { author: i64, id: i64 },
}

fn parse_operation(value: &str) -> std::result::Result<Operation, String> {
    Operation::parse(&value.to_ascii_uppercase())
        .ok_or_else(|| format!("unknown operation `{value}`; expected create|read|update|delete"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_author_update() {
        let cli = Cli::try_parse_from([
            "bookaudit",
            "--user",
            "bill",
            "author",
            "update",
            "3",
            "--dob",
            "1882-01-25",
        ])
        .unwrap();

        assert_eq!(cli.user.as_deref(), Some("bill"));
        match cli.command {
            Commands::Author {
                command: AuthorCommand::Update { id, name, dob },
            } => {
                assert_eq!(id, 3);
                assert!(name.is_none());
                assert_eq!(dob, NaiveDate::from_ymd_opt(1882, 1, 25));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_event_filters() {
        let cli = Cli::try_parse_from([
            "bookaudit",
            "events",
            "--after",
            "2024-01-01T00:00:00+02:00",
            "--operation",
            "delete",
        ])
        .unwrap();

        match cli.command {
            Commands::Events {
                after, operation, ..
            } => {
                assert_eq!(after.unwrap().timestamp(), 1_704_060_000);
                assert_eq!(operation, Some(Operation::Delete));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_dates_and_operations() {
        assert!(Cli::try_parse_from([
            "bookaudit", "author", "add", "--name", "Homer", "--dob", "yesterday",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["bookaudit", "events", "--operation", "patch"]).is_err());
    }
}
